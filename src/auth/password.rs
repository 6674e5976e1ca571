//! Password hashing schemes for schedauth.
//!
//! Two schemes coexist while accounts are migrated:
//! - [`Argon2Scheme`]: the current scheme (Argon2id, PHC strings).
//! - [`LegacyDigest`]: the superseded scheme (unsalted SHA-256 hex digest),
//!   kept only so that old hashes can still be verified once.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::PasswordConfig;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,

    /// Argon2 parameters are out of range.
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),
}

/// A password hashing scheme.
pub trait PasswordScheme {
    /// Hash `plaintext` for storage, using the per-user `salt`.
    fn hash(&self, plaintext: &str, salt: &str) -> Result<String, PasswordError>;

    /// Check `plaintext` against a stored hash.
    fn verify(&self, plaintext: &str, stored: &str, salt: &str) -> bool;
}

/// Current scheme: Argon2id.
///
/// The Argon2 salt is derived from the per-user salt, so hashing the same
/// plaintext for the same user always yields the same PHC string.
#[derive(Debug, Clone)]
pub struct Argon2Scheme {
    params: Params,
}

impl Argon2Scheme {
    /// Create the scheme with the configured cost parameters.
    pub fn new(config: &PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            self.params.clone(),
        )
    }

    fn derive_salt(salt: &str) -> Result<SaltString, PasswordError> {
        let digest = Sha256::digest(salt.as_bytes());
        SaltString::encode_b64(&digest[..16]).map_err(|e| PasswordError::HashError(e.to_string()))
    }
}

impl PasswordScheme for Argon2Scheme {
    fn hash(&self, plaintext: &str, salt: &str) -> Result<String, PasswordError> {
        let salt = Self::derive_salt(salt)?;
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, stored: &str, _salt: &str) -> bool {
        // Parameters and salt are read from the PHC string itself
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// Legacy scheme: lowercase hex SHA-256 of the plaintext, no salt.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyDigest;

impl LegacyDigest {
    /// Compute the legacy digest of a plaintext password.
    pub fn digest(plaintext: &str) -> String {
        hex::encode(Sha256::digest(plaintext.as_bytes()))
    }
}

impl PasswordScheme for LegacyDigest {
    fn hash(&self, plaintext: &str, _salt: &str) -> Result<String, PasswordError> {
        Ok(Self::digest(plaintext))
    }

    fn verify(&self, plaintext: &str, stored: &str, _salt: &str) -> bool {
        !stored.is_empty() && Self::digest(plaintext).eq_ignore_ascii_case(stored.trim())
    }
}

/// Generate a random per-user salt.
pub fn generate_salt() -> String {
    SaltString::generate(&mut OsRng).as_str().to_string()
}

/// Validate password requirements.
///
/// Checks:
/// - Minimum length: 8 characters
/// - Maximum length: 128 characters
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}
