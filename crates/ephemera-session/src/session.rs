//! Session entries held by the store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Opaque per-session payload.
///
/// The store never inspects it; callers always receive their own copy.
pub type SessionData = serde_json::Map<String, serde_json::Value>;

/// Entry stored in the session map.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    /// Current payload.
    pub data: SessionData,

    /// Monotonic time of creation or of the last update. Drives expiry.
    pub last_touched: Instant,

    /// Wall-clock creation time, for introspection only.
    pub created_at: DateTime<Utc>,

    /// Wall-clock time of the last update, for introspection only.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session touched at `now`.
    pub fn new(now: Instant) -> Self {
        let wall = Utc::now();
        Self {
            data: SessionData::new(),
            last_touched: now,
            created_at: wall,
            updated_at: wall,
        }
    }

    /// Replace the payload wholesale and renew the session.
    pub fn replace(&mut self, data: SessionData, now: Instant) {
        self.data = data;
        // Instant is monotonic, but guard against a caller-supplied `now`
        // older than the one already recorded.
        self.last_touched = self.last_touched.max(now);
        self.updated_at = Utc::now();
    }

    /// Time elapsed since the last touch.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_touched)
    }

    /// Whether the session has been idle for strictly longer than `timeout`.
    pub fn is_expired(&self, timeout: Duration, now: Instant) -> bool {
        self.idle_for(now) > timeout
    }
}

/// Point-in-time metadata about a session.
///
/// Reading it does not renew the session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the session data was last replaced (creation time if never).
    pub updated_at: DateTime<Utc>,

    /// How long the session has gone without an update.
    pub idle_for: Duration,

    /// Time left before the session becomes eligible for reclamation.
    /// Zero once the idle timeout has passed.
    pub expires_in: Duration,

    /// Number of top-level keys in the payload.
    pub keys: usize,
}

impl SessionInfo {
    pub(crate) fn snapshot(session: &Session, timeout: Duration, now: Instant) -> Self {
        let idle_for = session.idle_for(now);
        Self {
            created_at: session.created_at,
            updated_at: session.updated_at,
            idle_for,
            expires_in: timeout.saturating_sub(idle_for),
            keys: session.data.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_session_is_empty() {
        let now = Instant::now();
        let session = Session::new(now);
        assert!(session.data.is_empty());
        assert_eq!(session.last_touched, now);
        assert_eq!(session.created_at, session.updated_at);
    }

    #[test]
    fn test_expiry_is_strict() {
        let start = Instant::now();
        let session = Session::new(start);
        let timeout = Duration::from_millis(200);

        assert!(!session.is_expired(timeout, start + Duration::from_millis(200)));
        assert!(session.is_expired(timeout, start + Duration::from_millis(201)));
    }

    #[test]
    fn test_replace_renews_and_never_rolls_back() {
        let start = Instant::now();
        let mut session = Session::new(start);

        let mut data = SessionData::new();
        data.insert("k".to_string(), json!("v"));
        let later = start + Duration::from_secs(1);
        session.replace(data.clone(), later);
        assert_eq!(session.data, data);
        assert_eq!(session.last_touched, later);

        session.replace(SessionData::new(), start);
        assert_eq!(session.last_touched, later);
        assert!(session.data.is_empty());
    }

    #[test]
    fn test_info_snapshot() {
        let start = Instant::now();
        let session = Session::new(start);
        let timeout = Duration::from_secs(5);

        let info = SessionInfo::snapshot(&session, timeout, start + Duration::from_secs(2));
        assert_eq!(info.idle_for, Duration::from_secs(2));
        assert_eq!(info.expires_in, Duration::from_secs(3));
        assert_eq!(info.keys, 0);

        let info = SessionInfo::snapshot(&session, timeout, start + Duration::from_secs(9));
        assert_eq!(info.expires_in, Duration::ZERO);
    }
}
