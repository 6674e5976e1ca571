//! Test helpers for integration tests.
//!
//! Provides a file-backed test database and seeding helpers. Exact write
//! counts are checked by the unit tests next to the authorizer.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use schedauth::config::{AuthConfig, PasswordConfig};
use schedauth::{
    Argon2Scheme, CredentialRecord, CredentialRepository, Database, LegacyDigest, NewCredential,
    PasswordScheme,
};

/// Cookie signing key used by all tests.
pub const TEST_SECRET: &str = "integration-test-secret-0123456789";

/// Administrator email used by all tests.
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Database in a temporary directory, removed on drop.
pub struct TestDb {
    db: Database,
    dir: TempDir,
}

impl TestDb {
    /// Create a fresh database file.
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("schedauth.db")).await.unwrap();
        Self { db, dir }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Open a second handle on the same file.
    pub async fn reopen(&self) -> Database {
        Database::open(self.dir.path().join("schedauth.db"))
            .await
            .unwrap()
    }
}

/// Argon2 costs low enough for fast tests.
pub fn light_password_config() -> PasswordConfig {
    PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

/// Auth settings with the test secret and admin email.
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        admin_email: ADMIN_EMAIL.to_string(),
        cookie_secret: TEST_SECRET.to_string(),
        ..AuthConfig::default()
    }
}

/// Fixed starting point for the manual clock.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 9, 30, 0).unwrap()
}

/// Create a user whose password is stored under the current scheme.
pub async fn create_current_user(
    db: &Database,
    username: &str,
    email: &str,
    password: &str,
) -> CredentialRecord {
    let salt = schedauth::generate_salt();
    let scheme = Argon2Scheme::new(&light_password_config()).unwrap();
    let new = NewCredential::new(username, email, &salt)
        .with_name("Test", username)
        .with_password_hash(scheme.hash(password, &salt).unwrap());
    CredentialRepository::new(db.pool()).create(&new).await.unwrap()
}

/// Create a user with only a legacy hash.
pub async fn create_legacy_user(
    db: &Database,
    username: &str,
    email: &str,
    password: &str,
    salt: &str,
) -> CredentialRecord {
    let new = NewCredential::new(username, email, salt)
        .with_name("Legacy", username)
        .with_legacy_hash(LegacyDigest::digest(password));
    CredentialRepository::new(db.pool()).create(&new).await.unwrap()
}
