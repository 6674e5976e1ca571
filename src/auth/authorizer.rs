//! Login orchestration.
//!
//! [`Authorizer::validate`] only checks credentials. [`Authorizer::login`]
//! establishes the session and trusts its caller: it must only be reached
//! after a successful `validate`, or through [`Authorizer::cookie_login`],
//! which performs its own check against the stored login epoch.

use tracing::{debug, info};

use super::migration::PasswordMigration;
use super::session::{LoginPage, SessionSink, UserSession, USER_SESSION_KEY};
use super::token::{CookieSigner, LoginCookie, PersistentCookie, PERSIST_LOGIN_COOKIE};
use crate::config::AuthConfig;
use crate::datetime::{Clock, LoginTime, SystemClock};
use crate::db::{CredentialRecord, CredentialStore};
use crate::Result;

/// Authenticates users and establishes their sessions.
pub struct Authorizer<S, K, C = SystemClock> {
    store: S,
    sink: K,
    migration: PasswordMigration,
    signer: CookieSigner,
    admin_email: Option<String>,
    persistent_login: bool,
    cookie_lifetime: chrono::Duration,
    clock: C,
}

impl<S, K> Authorizer<S, K, SystemClock> {
    /// Create an authorizer using the system clock.
    pub fn new(
        store: S,
        sink: K,
        migration: PasswordMigration,
        signer: CookieSigner,
        config: &AuthConfig,
    ) -> Self {
        Self {
            store,
            sink,
            migration,
            signer,
            admin_email: config.admin_email().map(str::to_string),
            persistent_login: config.persistent_login,
            cookie_lifetime: chrono::Duration::days(i64::from(config.cookie_lifetime_days)),
            clock: SystemClock,
        }
    }
}

impl<S, K, C> Authorizer<S, K, C> {
    /// Replace the clock used for login timestamps.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Authorizer<S, K, C2> {
        Authorizer {
            store: self.store,
            sink: self.sink,
            migration: self.migration,
            signer: self.signer,
            admin_email: self.admin_email,
            persistent_login: self.persistent_login,
            cookie_lifetime: self.cookie_lifetime,
            clock,
        }
    }

    /// The credential store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The session sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Always `false`: a failed login never reveals whether the username exists.
    pub fn are_credentials_known(&self) -> bool {
        false
    }

    /// Tell the login page to show the generic failure message.
    pub fn handle_login_failure(&self, page: &mut impl LoginPage) {
        page.set_show_login_error();
    }
}

impl<S, K, C> Authorizer<S, K, C>
where
    S: CredentialStore,
    K: SessionSink,
    C: Clock,
{
    /// Check a username (or email) and password.
    ///
    /// A successful check against a legacy hash migrates the stored hash.
    /// Unknown users and wrong passwords both yield `false`.
    pub async fn validate(&self, username: &str, password: &str) -> Result<bool> {
        debug!(username = %username, "Trying to log in");

        let Some(record) = self.store.lookup_by_username(username).await? else {
            debug!(username = %username, "Login rejected");
            return Ok(false);
        };

        let mut submitted = self.migration.create(
            password,
            record.legacy_password_hash.as_deref(),
            record.password_hash.as_deref(),
        );

        if !submitted.validate(&record.salt) {
            debug!(user_id = record.user_id, "Login rejected");
            return Ok(false);
        }

        submitted.migrate(record.user_id, &self.store).await?;
        Ok(true)
    }

    /// Establish a session for `username` (or email).
    ///
    /// Does not check a password. Returns `None` without side effects if the
    /// user does not exist.
    pub async fn login(&self, username: &str, persist: bool) -> Result<Option<UserSession>> {
        let Some(record) = self.store.lookup_by_username(username).await? else {
            debug!(username = %username, "Login skipped for unknown user");
            return Ok(None);
        };

        self.login_record(&record, persist).await.map(Some)
    }

    /// Log in from a persistent login cookie value.
    ///
    /// Returns `false` for malformed, forged or stale cookies; no session is
    /// created in that case. A successful cookie login starts a new login
    /// epoch and issues a fresh cookie.
    pub async fn cookie_login(&self, cookie_value: &str) -> Result<bool> {
        if !self.persistent_login {
            return Ok(false);
        }

        let Some(cookie) = self.signer.decode(cookie_value) else {
            debug!("Rejected malformed login cookie");
            return Ok(false);
        };

        let Some(record) = self.validate_cookie(&cookie).await? else {
            debug!(user_id = cookie.user_id, "Rejected stale login cookie");
            return Ok(false);
        };

        // Session comes from the record the cookie was checked against
        self.login_record(&record, true).await?;
        Ok(true)
    }

    async fn login_record(&self, record: &CredentialRecord, persist: bool) -> Result<UserSession> {
        let login_time = self.clock.now();
        let is_admin_role = self.is_admin_role(record.user_id).await?;

        self.store
            .update_last_login(record.user_id, login_time)
            .await?;

        let session = self.set_user_session(record, is_admin_role);

        if persist && self.persistent_login {
            self.set_login_cookie(record.user_id, login_time);
        }

        info!(
            user_id = record.user_id,
            is_admin = session.is_admin,
            persist,
            "User logged in"
        );
        Ok(session)
    }

    async fn is_admin_role(&self, user_id: i64) -> Result<bool> {
        let roles = self.store.list_roles(user_id).await?;
        Ok(roles.iter().any(|role| role.is_admin_level()))
    }

    fn set_user_session(&self, record: &CredentialRecord, is_admin_role: bool) -> UserSession {
        let is_admin_email = self.admin_email.as_deref() == Some(record.email.as_str());
        let session = UserSession::from_record(record, is_admin_role || is_admin_email);
        self.sink.set_session(USER_SESSION_KEY, session.clone());
        session
    }

    fn set_login_cookie(&self, user_id: i64, login_time: LoginTime) {
        let token = LoginCookie::new(user_id, login_time);
        self.sink.set_persistent_cookie(PersistentCookie {
            name: PERSIST_LOGIN_COOKIE.to_string(),
            value: self.signer.encode(&token),
            token,
            expires_at: login_time.as_datetime() + self.cookie_lifetime,
        });
    }

    /// The cookie's user if the cookie belongs to the current login epoch.
    async fn validate_cookie(&self, cookie: &LoginCookie) -> Result<Option<CredentialRecord>> {
        let record = self.store.lookup_by_user_id(cookie.user_id).await?;
        Ok(record.filter(|r| r.last_login == Some(cookie.last_login)))
    }
}
