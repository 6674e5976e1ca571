//! Configuration module for schedauth.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, SchedAuthError};

/// Minimum length of the persistent login cookie secret in bytes.
pub const MIN_COOKIE_SECRET_LENGTH: usize = 32;

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/schedauth.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/schedauth.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Administrator email address. A user logging in with this exact email
    /// is granted admin rights regardless of role assignments.
    /// Empty means no such address is configured.
    #[serde(default)]
    pub admin_email: String,
    /// Whether "remember me" persistent login cookies are issued and accepted.
    #[serde(default = "default_persistent_login")]
    pub persistent_login: bool,
    /// Secret key used to sign persistent login cookies.
    #[serde(default)]
    pub cookie_secret: String,
    /// Lifetime of a persistent login cookie in days.
    #[serde(default = "default_cookie_lifetime_days")]
    pub cookie_lifetime_days: u32,
}

fn default_persistent_login() -> bool {
    true
}

fn default_cookie_lifetime_days() -> u32 {
    30
}

impl AuthConfig {
    /// The configured administrator email, if any.
    pub fn admin_email(&self) -> Option<&str> {
        let email = self.admin_email.trim();
        if email.is_empty() {
            None
        } else {
            Some(email)
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_email: String::new(),
            persistent_login: default_persistent_login(),
            cookie_secret: String::new(),
            cookie_lifetime_days: default_cookie_lifetime_days(),
        }
    }
}

/// Argon2 cost parameters for the current password scheme.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Time cost (iterations).
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    65536 // 64 MB
}

fn default_iterations() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    4
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Password hashing configuration.
    #[serde(default)]
    pub password: PasswordConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(SchedAuthError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| SchedAuthError::Config(format!("parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `SCHEDAUTH_COOKIE_SECRET`: Override the cookie signing secret
    /// - `SCHEDAUTH_ADMIN_EMAIL`: Override the administrator email
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("SCHEDAUTH_COOKIE_SECRET") {
            if !secret.is_empty() {
                self.auth.cookie_secret = secret;
            }
        }
        if let Ok(email) = std::env::var("SCHEDAUTH_ADMIN_EMAIL") {
            if !email.is_empty() {
                self.auth.admin_email = email;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - Persistent login is enabled but the cookie secret is shorter than
    ///   [`MIN_COOKIE_SECRET_LENGTH`] bytes
    /// - Any Argon2 cost parameter is zero or Argon2 rejects the combination
    pub fn validate(&self) -> Result<()> {
        if self.auth.persistent_login && self.auth.cookie_secret.len() < MIN_COOKIE_SECRET_LENGTH {
            return Err(SchedAuthError::Config(format!(
                "persistent login is enabled but cookie_secret is shorter than \
                 {MIN_COOKIE_SECRET_LENGTH} bytes. Set it in config.toml or via \
                 SCHEDAUTH_COOKIE_SECRET environment variable."
            )));
        }
        if self.password.memory_kib == 0
            || self.password.iterations == 0
            || self.password.parallelism == 0
        {
            return Err(SchedAuthError::Config(
                "password cost parameters must be non-zero".to_string(),
            ));
        }
        crate::auth::Argon2Scheme::new(&self.password)
            .map_err(|e| SchedAuthError::Config(format!("password settings: {e}")))?;
        Ok(())
    }
}
