//! schedauth - authentication and session identity for a resource scheduler.
//!
//! Password checks with lazy migration of legacy hashes, session
//! establishment, signed persistent-login cookies, and the schedule
//! resource filter.

pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod logging;
pub mod schedule;

pub use auth::{
    generate_salt, validate_password, Argon2Scheme, Authorizer, CookieSigner, LegacyDigest,
    LoginCookie, LoginPage, MemorySessionSink, MigratedPassword, PasswordError,
    PasswordMigration, PasswordScheme, PersistentCookie, SessionSink, UserSession, VerifiedBy,
};
pub use config::Config;
pub use datetime::{Clock, LoginTime, ManualClock, SystemClock};
pub use db::{CredentialRecord, CredentialRepository, CredentialStore, Database, NewCredential};
pub use error::{Result, SchedAuthError};
pub use schedule::{
    AttributeService, AttributeValue, BookableResource, ResourceRepository,
    ScheduleResourceFilter, SqlAttributeService, SqlResourceRepository,
};
