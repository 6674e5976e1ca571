//! Lazy password hash migration.
//!
//! Accounts imported from the legacy scheme keep their old hash until the
//! user next logs in. A successful legacy verification re-hashes the submitted
//! plaintext under the current scheme and stores it, clearing the old hash.

use std::fmt;

use tracing::{debug, info};

use super::password::{validate_password, Argon2Scheme, LegacyDigest, PasswordError, PasswordScheme};
use crate::config::PasswordConfig;
use crate::db::CredentialStore;
use crate::Result;

/// Which stored hash accepted the submitted password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifiedBy {
    /// The current-scheme hash matched.
    Current,
    /// The legacy hash matched; the account needs migrating.
    Legacy,
}

/// Password migration engine.
///
/// Constructed once and shared by the authorizer for every attempt.
#[derive(Debug, Clone)]
pub struct PasswordMigration {
    current: Argon2Scheme,
    legacy: LegacyDigest,
}

impl PasswordMigration {
    /// Create an engine around the current scheme.
    pub fn new(current: Argon2Scheme) -> Self {
        Self {
            current,
            legacy: LegacyDigest,
        }
    }

    /// Create an engine with Argon2 costs from the configuration.
    pub fn from_config(config: &PasswordConfig) -> std::result::Result<Self, PasswordError> {
        Ok(Self::new(Argon2Scheme::new(config)?))
    }

    /// Wrap a submitted password together with the stored hashes.
    ///
    /// Nothing is verified or written yet.
    pub fn create<'a>(
        &'a self,
        plaintext: &'a str,
        legacy_hash: Option<&'a str>,
        current_hash: Option<&'a str>,
    ) -> MigratedPassword<'a> {
        MigratedPassword {
            engine: self,
            plaintext,
            legacy_hash: legacy_hash.filter(|h| !h.is_empty()),
            current_hash: current_hash.filter(|h| !h.is_empty()),
            salt: None,
            verified: None,
        }
    }

    /// Hash a new password under the current scheme after checking the
    /// length policy.
    pub fn encrypt(&self, plaintext: &str, salt: &str) -> std::result::Result<String, PasswordError> {
        validate_password(plaintext)?;
        self.current.hash(plaintext, salt)
    }
}

/// A submitted password paired with the stored hashes of one account.
pub struct MigratedPassword<'a> {
    engine: &'a PasswordMigration,
    plaintext: &'a str,
    legacy_hash: Option<&'a str>,
    current_hash: Option<&'a str>,
    salt: Option<&'a str>,
    verified: Option<VerifiedBy>,
}

impl<'a> MigratedPassword<'a> {
    /// Verify the password: the current hash first, then the legacy hash.
    pub fn validate(&mut self, salt: &'a str) -> bool {
        self.salt = Some(salt);

        if let Some(hash) = self.current_hash {
            if self.engine.current.verify(self.plaintext, hash, salt) {
                self.verified = Some(VerifiedBy::Current);
                return true;
            }
        }

        if let Some(hash) = self.legacy_hash {
            if self.engine.legacy.verify(self.plaintext, hash, salt) {
                self.verified = Some(VerifiedBy::Legacy);
                return true;
            }
        }

        self.verified = None;
        false
    }

    /// The path that accepted the password on the last `validate` call.
    pub fn verified_by(&self) -> Option<VerifiedBy> {
        self.verified
    }

    /// Store a current-scheme hash if the legacy hash was the one that matched.
    ///
    /// Returns whether a write happened. Calling it again rewrites the same
    /// hash.
    pub async fn migrate<S: CredentialStore>(&self, user_id: i64, store: &S) -> Result<bool> {
        let (Some(VerifiedBy::Legacy), Some(salt)) = (self.verified, self.salt) else {
            debug!(user_id, "No password migration needed");
            return Ok(false);
        };

        let new_hash = self.engine.current.hash(self.plaintext, salt)?;
        store.update_password_hash(user_id, &new_hash).await?;

        info!(user_id, "Migrated legacy password hash");
        Ok(true)
    }
}

impl fmt::Debug for MigratedPassword<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigratedPassword")
            .field("has_legacy_hash", &self.legacy_hash.is_some())
            .field("has_current_hash", &self.current_hash.is_some())
            .field("verified", &self.verified)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{light_password_config, CountingStore};
    use crate::db::{CredentialRepository, NewCredential};
    use crate::Database;

    fn engine() -> PasswordMigration {
        PasswordMigration::from_config(&light_password_config()).unwrap()
    }

    #[test]
    fn test_validate_current_hash() {
        let engine = engine();
        let hash = engine.encrypt("current_pw", "salt").unwrap();

        let mut password = engine.create("current_pw", None, Some(&hash));
        assert!(password.validate("salt"));
        assert_eq!(password.verified_by(), Some(VerifiedBy::Current));
    }

    #[test]
    fn test_validate_legacy_hash() {
        let engine = engine();
        let legacy = LegacyDigest::digest("old_pw");

        let mut password = engine.create("old_pw", Some(&legacy), None);
        assert!(password.validate("salt"));
        assert_eq!(password.verified_by(), Some(VerifiedBy::Legacy));
    }

    #[test]
    fn test_validate_falls_back_to_legacy_when_current_fails() {
        let engine = engine();
        let current = engine.encrypt("something_else", "salt").unwrap();
        let legacy = LegacyDigest::digest("old_pw");

        let mut password = engine.create("old_pw", Some(&legacy), Some(&current));
        assert!(password.validate("salt"));
        assert_eq!(password.verified_by(), Some(VerifiedBy::Legacy));
    }

    #[test]
    fn test_validate_wrong_password() {
        let engine = engine();
        let current = engine.encrypt("right_password", "salt").unwrap();
        let legacy = LegacyDigest::digest("right_password");

        let mut password = engine.create("wrong_password", Some(&legacy), Some(&current));
        assert!(!password.validate("salt"));
        assert_eq!(password.verified_by(), None);
    }

    #[test]
    fn test_validate_no_hashes() {
        let engine = engine();
        let mut password = engine.create("anything", None, Some(""));
        assert!(!password.validate("salt"));
    }

    #[test]
    fn test_encrypt_enforces_length() {
        let engine = engine();
        assert!(matches!(
            engine.encrypt("short", "salt"),
            Err(PasswordError::TooShort)
        ));
    }

    #[test]
    fn test_debug_hides_plaintext() {
        let engine = engine();
        let password = engine.create("super_secret", None, None);
        assert!(!format!("{password:?}").contains("super_secret"));
    }

    #[tokio::test]
    async fn test_migrate_after_legacy_writes_once() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = CredentialRepository::new(db.pool());
        let user = repo
            .create(&NewCredential::new("u1", "u1@example.com", "s").with_legacy_hash(LegacyDigest::digest("pw")))
            .await
            .unwrap();
        let store = CountingStore::new(repo);
        let engine = engine();

        let mut password = engine.create("pw", user.legacy_password_hash.as_deref(), None);
        assert!(password.validate(&user.salt));
        assert!(password.migrate(user.user_id, &store).await.unwrap());
        assert_eq!(store.password_writes(), 1);

        let migrated = store.inner().lookup_by_user_id(user.user_id).await.unwrap().unwrap();
        let new_hash = migrated.password_hash.clone().unwrap();
        assert!(new_hash.starts_with("$argon2id$"));
        assert_eq!(migrated.legacy_password_hash, None);

        // Migrating again writes the identical hash
        assert!(password.migrate(user.user_id, &store).await.unwrap());
        let again = store.inner().lookup_by_user_id(user.user_id).await.unwrap().unwrap();
        assert_eq!(again.password_hash, Some(new_hash));
    }

    #[tokio::test]
    async fn test_migrate_after_current_is_noop() {
        let db = Database::open_in_memory().await.unwrap();
        let store = CountingStore::new(CredentialRepository::new(db.pool()));
        let engine = engine();
        let hash = engine.encrypt("current_pw", "s").unwrap();

        let mut password = engine.create("current_pw", None, Some(&hash));
        assert!(password.validate("s"));
        assert!(!password.migrate(1, &store).await.unwrap());
        assert_eq!(store.password_writes(), 0);
    }

    #[tokio::test]
    async fn test_migrate_without_validation_is_noop() {
        let db = Database::open_in_memory().await.unwrap();
        let store = CountingStore::new(CredentialRepository::new(db.pool()));
        let engine = engine();
        let legacy = LegacyDigest::digest("pw");

        let password = engine.create("pw", Some(&legacy), None);
        assert!(!password.migrate(1, &store).await.unwrap());
        assert_eq!(store.password_writes(), 0);
    }
}
