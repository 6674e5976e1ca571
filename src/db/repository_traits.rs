//! Credential store trait for schedauth.
//!
//! The authorizer and the password migration engine only see this trait, so
//! any backend (or a test double) can stand in for the SQLite repository.

use crate::datetime::LoginTime;
use crate::db::{CredentialRecord, RoleRow};
use crate::Result;

/// Lookups and writes the authorizer needs against the user store.
///
/// Unknown users are `Ok(None)` / empty, never errors. Errors mean the store
/// itself failed.
#[allow(async_fn_in_trait)]
pub trait CredentialStore {
    /// Find a user by username or email (case-insensitive).
    async fn lookup_by_username(&self, username: &str) -> Result<Option<CredentialRecord>>;

    /// Find a user by ID.
    async fn lookup_by_user_id(&self, user_id: i64) -> Result<Option<CredentialRecord>>;

    /// List all roles assigned to a user.
    async fn list_roles(&self, user_id: i64) -> Result<Vec<RoleRow>>;

    /// Record a successful login.
    async fn update_last_login(&self, user_id: i64, login_time: LoginTime) -> Result<()>;

    /// Store a hash under the current scheme and clear the legacy hash.
    async fn update_password_hash(&self, user_id: i64, new_hash: &str) -> Result<()>;
}
