//! Credential repository for schedauth.
//!
//! SQLite implementation of [`CredentialStore`] plus the seeding operations
//! (user creation, roles) used by administration tools and tests.

use super::credential::{CredentialRecord, CredentialRow, NewCredential, RoleRow};
use super::repository_traits::CredentialStore;
use super::DbPool;
use crate::datetime::LoginTime;
use crate::{Result, SchedAuthError};

const CREDENTIAL_COLUMNS: &str = "user_id, username, email, fname, lname, timezone, homepage_id,
     password, legacy_password, salt, last_login";

/// Repository for user credentials and roles.
pub struct CredentialRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> CredentialRepository<'a> {
    /// Create a new repository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// Returns the created record with the assigned ID. A username or email
    /// already used by another account as either one is rejected, so a login
    /// name always resolves to a single account.
    pub async fn create(&self, new: &NewCredential) -> Result<CredentialRecord> {
        let taken: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users
             WHERE username = ? COLLATE NOCASE OR email = ? COLLATE NOCASE
                OR username = ? COLLATE NOCASE OR email = ? COLLATE NOCASE",
        )
        .bind(&new.username)
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.email)
        .fetch_one(self.pool)
        .await?;
        if taken > 0 {
            return Err(SchedAuthError::Validation(format!(
                "username or email already in use: {}",
                new.username
            )));
        }

        let user_id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, email, fname, lname, timezone, homepage_id,
                                password, legacy_password, salt)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING user_id",
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.timezone)
        .bind(new.homepage_id)
        .bind(&new.password_hash)
        .bind(&new.legacy_password_hash)
        .bind(&new.salt)
        .fetch_one(self.pool)
        .await?;

        self.lookup_by_user_id(user_id)
            .await?
            .ok_or_else(|| SchedAuthError::NotFound("user".to_string()))
    }

    /// Create a role. Any non-zero `role_level` grants admin rights.
    pub async fn create_role(&self, name: &str, role_level: i64) -> Result<RoleRow> {
        let role = sqlx::query_as::<_, RoleRow>(
            "INSERT INTO roles (name, role_level) VALUES (?, ?)
             RETURNING role_id, name, role_level",
        )
        .bind(name)
        .bind(role_level)
        .fetch_one(self.pool)
        .await?;
        Ok(role)
    }

    /// Assign a role to a user.
    pub async fn assign_role(&self, user_id: i64, role_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(role_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

impl CredentialStore for CredentialRepository<'_> {
    async fn lookup_by_username(&self, username: &str) -> Result<Option<CredentialRecord>> {
        let sql = format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM users
             WHERE username = ? COLLATE NOCASE OR email = ? COLLATE NOCASE
             ORDER BY CASE WHEN username = ? COLLATE NOCASE THEN 0 ELSE 1 END, user_id
             LIMIT 1"
        );
        let row = sqlx::query_as::<_, CredentialRow>(&sql)
            .bind(username)
            .bind(username)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;
        row.map(CredentialRecord::try_from).transpose()
    }

    async fn lookup_by_user_id(&self, user_id: i64) -> Result<Option<CredentialRecord>> {
        let sql = format!("SELECT {CREDENTIAL_COLUMNS} FROM users WHERE user_id = ?");
        let row = sqlx::query_as::<_, CredentialRow>(&sql)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        row.map(CredentialRecord::try_from).transpose()
    }

    async fn list_roles(&self, user_id: i64) -> Result<Vec<RoleRow>> {
        let roles = sqlx::query_as::<_, RoleRow>(
            "SELECT r.role_id, r.name, r.role_level
             FROM user_roles ur
             JOIN roles r ON r.role_id = ur.role_id
             WHERE ur.user_id = ?
             ORDER BY r.role_id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(roles)
    }

    async fn update_last_login(&self, user_id: i64, login_time: LoginTime) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE user_id = ?")
            .bind(login_time.to_db_string())
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn update_password_hash(&self, user_id: i64, new_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password = ?, legacy_password = NULL WHERE user_id = ?")
            .bind(new_hash)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
