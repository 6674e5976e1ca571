//! Login timestamps and clocks for schedauth.
//!
//! Last-login values are compared by exact equality when a persistent login
//! cookie is checked, so every [`LoginTime`] is truncated to microseconds:
//! the same precision it is stored and transmitted with.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, NaiveDateTime, Utc};

/// Storage format of a login time (SQLite compatible, microsecond precision).
const DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A UTC instant with microsecond precision marking a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoginTime(DateTime<Utc>);

impl LoginTime {
    /// Create a login time from a UTC datetime, dropping sub-microsecond digits.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(DateTime::from_timestamp_micros(dt.timestamp_micros()).unwrap_or(dt))
    }

    /// The current time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Create a login time from microseconds since the Unix epoch.
    pub fn from_micros(micros: i64) -> Option<Self> {
        DateTime::from_timestamp_micros(micros).map(Self)
    }

    /// Microseconds since the Unix epoch.
    pub fn as_micros(&self) -> i64 {
        self.0.timestamp_micros()
    }

    /// The underlying UTC datetime.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Format for storage (`YYYY-MM-DD HH:MM:SS.ffffff`).
    pub fn to_db_string(&self) -> String {
        self.0.format(DB_FORMAT).to_string()
    }

    /// Parse a stored login time.
    ///
    /// Accepts the storage format (with or without a fractional part, as
    /// written by SQLite's `datetime('now')`) and RFC3339.
    pub fn parse_db(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
            return Some(Self::from_datetime(naive.and_utc()));
        }
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Self::from_datetime(dt.with_timezone(&Utc)))
    }
}

impl fmt::Display for LoginTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

impl From<DateTime<Utc>> for LoginTime {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

/// Source of login timestamps.
pub trait Clock {
    /// The current time.
    fn now(&self) -> LoginTime;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> LoginTime {
        LoginTime::now()
    }
}

/// Manually driven clock.
///
/// Clones share the same time, so a caller can keep a handle and advance the
/// clock owned by an [`Authorizer`](crate::auth::Authorizer).
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock stopped at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += by;
    }

    /// Set the clock to an absolute time.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> LoginTime {
        LoginTime::from_datetime(*self.current.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncates_to_micros() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(1_234_567);
        let t = LoginTime::from_datetime(dt);
        assert_eq!(t.as_datetime().timestamp_subsec_nanos(), 1_234_000);
    }

    #[test]
    fn test_db_string_roundtrip_is_exact() {
        let t = LoginTime::now();
        let parsed = LoginTime::parse_db(&t.to_db_string()).unwrap();
        assert_eq!(parsed, t);
    }

    #[test]
    fn test_parse_sqlite_datetime_without_fraction() {
        let t = LoginTime::parse_db("2024-01-15 10:30:00").unwrap();
        assert_eq!(
            t.as_datetime(),
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
        );
        assert_eq!(t.to_db_string(), "2024-01-15 10:30:00.000000");
    }

    #[test]
    fn test_parse_rfc3339() {
        let t = LoginTime::parse_db("2024-01-15T19:30:00+09:00").unwrap();
        assert_eq!(
            t.as_datetime(),
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(LoginTime::parse_db("yesterday").is_none());
        assert!(LoginTime::parse_db("").is_none());
    }

    #[test]
    fn test_micros_roundtrip() {
        let t = LoginTime::now();
        assert_eq!(LoginTime::from_micros(t.as_micros()), Some(t));
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let handle = clock.clone();

        handle.advance(chrono::Duration::seconds(90));
        assert_eq!(
            clock.now().as_datetime(),
            start + chrono::Duration::seconds(90)
        );

        handle.set(start);
        assert_eq!(clock.now().as_datetime(), start);
    }
}
