//! Authentication module for schedauth.
//!
//! This module provides password schemes and lazy hash migration, the
//! authorizer that establishes user sessions, and persistent login cookies.

mod authorizer;
mod migration;
mod password;
mod session;
mod token;

#[cfg(test)]
pub(crate) mod test_support;

pub use authorizer::Authorizer;
pub use migration::{MigratedPassword, PasswordMigration, VerifiedBy};
pub use password::{
    generate_salt, validate_password, Argon2Scheme, LegacyDigest, PasswordError, PasswordScheme,
    MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
pub use session::{LoginPage, MemorySessionSink, SessionSink, UserSession, USER_SESSION_KEY};
pub use token::{CookieSigner, LoginCookie, PersistentCookie, PERSIST_LOGIN_COOKIE};
