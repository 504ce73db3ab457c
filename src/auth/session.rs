//! Session and auth snapshot types.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use uuid::Uuid;

/// An authenticated identity. Opaque to the guard, which only checks presence.
#[derive(Debug)]
pub struct Session {
    /// Unique id of this session; a new sign-in always gets a new one.
    pub id: Uuid,
    /// The signed-in account.
    pub user_id: String,
    pub access_token: SecretString,
    /// When the access token stops being valid. `None` never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            access_token: SecretString::from(access_token.into()),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// What the auth provider currently knows, as one consistent snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSnapshot {
    #[serde(serialize_with = "serialize_session")]
    pub session: Option<Arc<Session>>,
    /// True while the session is being resolved. Stays true if resolution failed.
    pub loading: bool,
    pub has_completed_onboarding: bool,
    /// Last provider failure, for diagnostics only.
    pub last_error: Option<String>,
}

impl AuthSnapshot {
    /// Snapshot at app start: nothing resolved yet.
    pub fn restoring() -> Self {
        Self {
            session: None,
            loading: true,
            has_completed_onboarding: false,
            last_error: None,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            loading: false,
            ..Self::restoring()
        }
    }

    pub fn signed_in(session: Session, has_completed_onboarding: bool) -> Self {
        Self {
            session: Some(Arc::new(session)),
            loading: false,
            has_completed_onboarding,
            last_error: None,
        }
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.id)
    }
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self::restoring()
    }
}

// Only the user id leaves the process in serialized snapshots.
fn serialize_session<S>(session: &Option<Arc<Session>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match session {
        Some(s) => serializer.serialize_some(&s.user_id),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_sessions_get_distinct_ids() {
        let a = Session::new("u1", "tok");
        let b = Session::new("u1", "tok");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn expiry() {
        let now = Utc::now();
        let session = Session::new("u1", "tok").with_expiry(now + Duration::minutes(5));
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::minutes(5)));
        assert!(!Session::new("u1", "tok").is_expired(now));
    }

    #[test]
    fn token_is_redacted_in_debug() {
        let session = Session::new("u1", "super-secret-token");
        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret-token"));
    }

    #[test]
    fn snapshot_serializes_user_id_only() {
        let snapshot = AuthSnapshot::signed_in(Session::new("producer-7", "tok"), true);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["session"], "producer-7");
        assert_eq!(json["loading"], false);
        assert_eq!(json["has_completed_onboarding"], true);
    }

    #[test]
    fn default_is_restoring() {
        let snapshot = AuthSnapshot::default();
        assert!(snapshot.loading);
        assert!(snapshot.session.is_none());
        assert!(!AuthSnapshot::signed_out().loading);
    }
}
