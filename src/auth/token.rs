//! Persistent login ("remember me") cookies.
//!
//! A cookie carries the user ID and the last-login time of the login that
//! issued it, signed with HMAC-SHA256:
//!
//! ```text
//! {user_id}.{last_login_micros}.{hex(hmac(user_id "." last_login_micros))}
//! ```
//!
//! The signature only proves the value was issued by this server. Whether it
//! still grants access is decided by the authorizer, which compares the
//! embedded last-login time with the one currently stored for the user.

use std::fmt;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::AuthConfig;
use crate::datetime::LoginTime;
use crate::{Result, SchedAuthError};

type HmacSha256 = Hmac<Sha256>;

/// Name of the persistent login cookie.
pub const PERSIST_LOGIN_COOKIE: &str = "persist_login";

/// Identity embedded in a persistent login cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginCookie {
    /// User the cookie was issued to.
    pub user_id: i64,
    /// Last-login time at the moment of issue.
    pub last_login: LoginTime,
}

impl LoginCookie {
    /// Create a cookie payload.
    pub fn new(user_id: i64, last_login: LoginTime) -> Self {
        Self {
            user_id,
            last_login,
        }
    }

    fn payload(&self) -> String {
        format!("{}.{}", self.user_id, self.last_login.as_micros())
    }
}

/// A cookie ready to be handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentCookie {
    /// Cookie name.
    pub name: String,
    /// Signed, opaque cookie value.
    pub value: String,
    /// Decoded identity.
    pub token: LoginCookie,
    /// When the browser should discard the cookie.
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies persistent login cookie values.
#[derive(Clone)]
pub struct CookieSigner {
    key: HmacSha256,
}

impl CookieSigner {
    /// Create a signer from a secret key.
    pub fn new(secret: &[u8]) -> Result<Self> {
        if secret.is_empty() {
            return Err(SchedAuthError::Config("cookie secret is empty".to_string()));
        }
        let key = HmacSha256::new_from_slice(secret)
            .map_err(|e| SchedAuthError::Config(format!("invalid cookie secret: {e}")))?;
        Ok(Self { key })
    }

    /// Create a signer from the configured cookie secret.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Self::new(config.cookie_secret.as_bytes())
    }

    /// Serialize and sign a cookie.
    pub fn encode(&self, cookie: &LoginCookie) -> String {
        let payload = cookie.payload();
        let mut mac = self.key.clone();
        mac.update(payload.as_bytes());
        format!("{payload}.{}", hex::encode(mac.finalize().into_bytes()))
    }

    /// Parse and verify a cookie value.
    ///
    /// Returns `None` for anything malformed or not signed with this key.
    pub fn decode(&self, raw: &str) -> Option<LoginCookie> {
        let mut parts = raw.trim().split('.');
        let (user_id, micros, signature) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let signature = hex::decode(signature).ok()?;
        let mut mac = self.key.clone();
        mac.update(user_id.as_bytes());
        mac.update(b".");
        mac.update(micros.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let user_id: i64 = user_id.parse().ok()?;
        if user_id <= 0 {
            return None;
        }
        let last_login = LoginTime::from_micros(micros.parse().ok()?)?;

        Some(LoginCookie::new(user_id, last_login))
    }
}

impl fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieSigner").finish_non_exhaustive()
    }
}
