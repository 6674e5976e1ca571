//! User sessions and the boundary to session storage.
//!
//! Storing sessions and writing cookies to the client are the host
//! application's business; the authorizer only talks to a [`SessionSink`].

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono_tz::Tz;

use super::token::PersistentCookie;
use crate::db::CredentialRecord;

/// Session key under which the logged-in user is stored.
pub const USER_SESSION_KEY: &str = "user_session";

/// Identity snapshot of a logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    /// User ID.
    pub user_id: i64,
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
    /// Whether the user has administrator rights.
    pub is_admin: bool,
}

impl UserSession {
    /// Build a session from a credential record.
    pub fn from_record(record: &CredentialRecord, is_admin: bool) -> Self {
        Self {
            user_id: record.user_id,
            email: record.email.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            timezone: record.timezone.clone(),
            homepage_id: record.homepage_id,
            is_admin,
        }
    }

    /// Display name ("First Last").
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// The user's timezone, or UTC if the stored name is unknown.
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(Tz::UTC)
    }
}

/// Where established sessions and persistent login cookies go.
pub trait SessionSink {
    /// Store a session value.
    fn set_session(&self, key: &str, session: UserSession);

    /// Send a persistent login cookie to the client.
    fn set_persistent_cookie(&self, cookie: PersistentCookie);
}

impl<T: SessionSink + ?Sized> SessionSink for &T {
    fn set_session(&self, key: &str, session: UserSession) {
        (**self).set_session(key, session)
    }

    fn set_persistent_cookie(&self, cookie: PersistentCookie) {
        (**self).set_persistent_cookie(cookie)
    }
}

/// Presentation hook for failed logins.
pub trait LoginPage {
    /// Show the generic "login failed" message.
    fn set_show_login_error(&mut self);
}

/// In-process session sink.
///
/// Keeps sessions in a map and remembers the last cookie sent.
#[derive(Debug, Default)]
pub struct MemorySessionSink {
    sessions: Mutex<HashMap<String, UserSession>>,
    cookie: Mutex<Option<PersistentCookie>>,
}

impl MemorySessionSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a stored session.
    pub fn session(&self, key: &str) -> Option<UserSession> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// The logged-in user, if any.
    pub fn user_session(&self) -> Option<UserSession> {
        self.session(USER_SESSION_KEY)
    }

    /// The last persistent login cookie sent.
    pub fn persistent_cookie(&self) -> Option<PersistentCookie> {
        self.cookie
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop all sessions and the remembered cookie (logout).
    pub fn clear(&self) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        *self.cookie.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl SessionSink for MemorySessionSink {
    fn set_session(&self, key: &str, session: UserSession) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), session);
    }

    fn set_persistent_cookie(&self, cookie: PersistentCookie) {
        *self.cookie.lock().unwrap_or_else(PoisonError::into_inner) = Some(cookie);
    }
}
