//! Shared helpers for auth unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::PasswordConfig;
use crate::datetime::LoginTime;
use crate::db::{CredentialRecord, CredentialStore, RoleRow};
use crate::Result;

/// Argon2 costs low enough for fast tests.
pub fn light_password_config() -> PasswordConfig {
    PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

/// Store wrapper counting write calls.
pub struct CountingStore<S> {
    inner: S,
    password_writes: AtomicUsize,
    login_writes: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            password_writes: AtomicUsize::new(0),
            login_writes: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn password_writes(&self) -> usize {
        self.password_writes.load(Ordering::SeqCst)
    }

    pub fn login_writes(&self) -> usize {
        self.login_writes.load(Ordering::SeqCst)
    }
}

impl<S: CredentialStore> CredentialStore for CountingStore<S> {
    async fn lookup_by_username(&self, username: &str) -> Result<Option<CredentialRecord>> {
        self.inner.lookup_by_username(username).await
    }

    async fn lookup_by_user_id(&self, user_id: i64) -> Result<Option<CredentialRecord>> {
        self.inner.lookup_by_user_id(user_id).await
    }

    async fn list_roles(&self, user_id: i64) -> Result<Vec<RoleRow>> {
        self.inner.list_roles(user_id).await
    }

    async fn update_last_login(&self, user_id: i64, login_time: LoginTime) -> Result<()> {
        self.login_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update_last_login(user_id, login_time).await
    }

    async fn update_password_hash(&self, user_id: i64, new_hash: &str) -> Result<()> {
        self.password_writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update_password_hash(user_id, new_hash).await
    }
}
