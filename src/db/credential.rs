//! Credential records for schedauth.
//!
//! Rows are decoded once at the store boundary into typed records; nothing
//! above the repository reads columns by name.

use crate::datetime::LoginTime;
use crate::SchedAuthError;

/// Stored login data for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Unique user ID.
    pub user_id: i64,
    /// Login username.
    pub username: String,
    /// Email address (also accepted as a login name).
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// IANA timezone name.
    pub timezone: String,
    /// Page shown after login.
    pub homepage_id: i64,
    /// Hash under the current scheme, if the user has been migrated.
    pub password_hash: Option<String>,
    /// Hash under the legacy scheme, cleared once migrated.
    pub legacy_password_hash: Option<String>,
    /// Per-user salt.
    pub salt: String,
    /// Last successful login.
    pub last_login: Option<LoginTime>,
}

/// Raw `users` row as returned by sqlx.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CredentialRow {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub fname: String,
    pub lname: String,
    pub timezone: String,
    pub homepage_id: i64,
    pub password: Option<String>,
    pub legacy_password: Option<String>,
    pub salt: String,
    pub last_login: Option<String>,
}

impl TryFrom<CredentialRow> for CredentialRecord {
    type Error = SchedAuthError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        let last_login = match row.last_login.as_deref() {
            None => None,
            Some(raw) => Some(LoginTime::parse_db(raw).ok_or_else(|| {
                SchedAuthError::Validation(format!(
                    "invalid last_login for user {}: {raw}",
                    row.user_id
                ))
            })?),
        };

        Ok(Self {
            user_id: row.user_id,
            username: row.username,
            email: row.email,
            first_name: row.fname,
            last_name: row.lname,
            timezone: row.timezone,
            homepage_id: row.homepage_id,
            password_hash: row.password.filter(|h| !h.is_empty()),
            legacy_password_hash: row.legacy_password.filter(|h| !h.is_empty()),
            salt: row.salt,
            last_login,
        })
    }
}

/// A role assigned to a user.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RoleRow {
    /// Role ID.
    pub role_id: i64,
    /// Role name.
    pub name: String,
    /// Admin level; any non-zero value grants admin rights.
    pub role_level: i64,
}

impl RoleRow {
    /// Whether this role grants admin rights.
    pub fn is_admin_level(&self) -> bool {
        self.role_level != 0
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewCredential {
    /// Login username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// IANA timezone name.
    pub timezone: String,
    /// Page shown after login.
    pub homepage_id: i64,
    /// Hash under the current scheme (pre-hashed).
    pub password_hash: Option<String>,
    /// Hash under the legacy scheme (imported accounts).
    pub legacy_password_hash: Option<String>,
    /// Per-user salt.
    pub salt: String,
}

impl NewCredential {
    /// Create a new credential with minimal required fields.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        salt: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            timezone: "UTC".to_string(),
            homepage_id: 1,
            password_hash: None,
            legacy_password_hash: None,
            salt: salt.into(),
        }
    }

    /// Set first and last name.
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    /// Set the timezone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Set the homepage.
    pub fn with_homepage(mut self, homepage_id: i64) -> Self {
        self.homepage_id = homepage_id;
        self
    }

    /// Set the current-scheme hash.
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    /// Set the legacy-scheme hash.
    pub fn with_legacy_hash(mut self, hash: impl Into<String>) -> Self {
        self.legacy_password_hash = Some(hash.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(last_login: Option<&str>) -> CredentialRow {
        CredentialRow {
            user_id: 7,
            username: "u1".to_string(),
            email: "u1@example.com".to_string(),
            fname: "Una".to_string(),
            lname: "One".to_string(),
            timezone: "Europe/Paris".to_string(),
            homepage_id: 2,
            password: Some(String::new()),
            legacy_password: Some("abc".to_string()),
            salt: "s".to_string(),
            last_login: last_login.map(str::to_string),
        }
    }

    #[test]
    fn test_record_from_row() {
        let record = CredentialRecord::try_from(row(Some("2024-05-01 08:00:00.250000"))).unwrap();

        assert_eq!(record.user_id, 7);
        assert_eq!(record.first_name, "Una");
        assert_eq!(record.last_name, "One");
        assert_eq!(record.password_hash, None);
        assert_eq!(record.legacy_password_hash.as_deref(), Some("abc"));
        assert_eq!(
            record.last_login.unwrap().to_db_string(),
            "2024-05-01 08:00:00.250000"
        );
    }

    #[test]
    fn test_record_never_logged_in() {
        let record = CredentialRecord::try_from(row(None)).unwrap();
        assert!(record.last_login.is_none());
    }

    #[test]
    fn test_record_invalid_last_login() {
        let result = CredentialRecord::try_from(row(Some("not a date")));
        assert!(matches!(result, Err(SchedAuthError::Validation(_))));
    }

    #[test]
    fn test_role_admin_level() {
        let admin = RoleRow {
            role_id: 1,
            name: "Application Admin".to_string(),
            role_level: 2,
        };
        let member = RoleRow {
            role_id: 2,
            name: "Member".to_string(),
            role_level: 0,
        };
        assert!(admin.is_admin_level());
        assert!(!member.is_admin_level());
    }

    #[test]
    fn test_new_credential_builder() {
        let new = NewCredential::new("bob", "bob@example.com", "pepper")
            .with_name("Bob", "Builder")
            .with_timezone("Asia/Tokyo")
            .with_homepage(3)
            .with_legacy_hash("deadbeef");

        assert_eq!(new.first_name, "Bob");
        assert_eq!(new.timezone, "Asia/Tokyo");
        assert_eq!(new.homepage_id, 3);
        assert_eq!(new.password_hash, None);
        assert_eq!(new.legacy_password_hash.as_deref(), Some("deadbeef"));
    }
}
