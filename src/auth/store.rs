//! Session persistence — where a signed-in session survives app restarts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::session::Session;
use crate::error::SessionStoreError;

/// A persisted session plus the onboarding flag that goes with it.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredSession {
    pub session_id: Uuid,
    pub user_id: String,
    #[serde(serialize_with = "serialize_token", deserialize_with = "deserialize_token")]
    pub access_token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub onboarding_completed: bool,
}

impl StoredSession {
    pub fn from_session(session: &Session, onboarding_completed: bool) -> Self {
        Self {
            session_id: session.id,
            user_id: session.user_id.clone(),
            access_token: SecretString::from(session.access_token.expose_secret().to_string()),
            expires_at: session.expires_at,
            onboarding_completed,
        }
    }

    /// Rebuild the live session. Returns it with the stored onboarding flag.
    pub fn into_session(self) -> (Session, bool) {
        let session = Session {
            id: self.session_id,
            user_id: self.user_id,
            access_token: self.access_token,
            expires_at: self.expires_at,
        };
        (session, self.onboarding_completed)
    }
}

impl Clone for StoredSession {
    fn clone(&self) -> Self {
        Self {
            session_id: self.session_id,
            user_id: self.user_id.clone(),
            access_token: SecretString::from(self.access_token.expose_secret().to_string()),
            expires_at: self.expires_at,
            onboarding_completed: self.onboarding_completed,
        }
    }
}

fn serialize_token<S>(token: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(token.expose_secret())
}

fn deserialize_token<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

/// Backend-agnostic session persistence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the persisted session, if any.
    async fn load(&self) -> Result<Option<StoredSession>, SessionStoreError>;

    /// Persist a session, replacing any previous one.
    async fn save(&self, record: &StoredSession) -> Result<(), SessionStoreError>;

    /// Forget the persisted session. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), SessionStoreError>;
}

/// In-memory store. Can be put into an unavailable mode to simulate a
/// backend that never answers successfully.
#[derive(Default)]
pub struct MemorySessionStore {
    record: RwLock<Option<StoredSession>>,
    unavailable: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: StoredSession) -> Self {
        Self {
            record: RwLock::new(Some(record)),
            unavailable: RwLock::new(None),
        }
    }

    /// A store whose every call fails with `reason`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            record: RwLock::new(None),
            unavailable: RwLock::new(Some(reason.into())),
        }
    }

    pub async fn set_unavailable(&self, reason: Option<String>) {
        *self.unavailable.write().await = reason;
    }

    async fn check_available(&self) -> Result<(), SessionStoreError> {
        match self.unavailable.read().await.as_ref() {
            Some(reason) => Err(SessionStoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<StoredSession>, SessionStoreError> {
        self.check_available().await?;
        Ok(self.record.read().await.clone())
    }

    async fn save(&self, record: &StoredSession) -> Result<(), SessionStoreError> {
        self.check_available().await?;
        *self.record.write().await = Some(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        self.check_available().await?;
        *self.record.write().await = None;
        Ok(())
    }
}

/// JSON file store, one session per file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<StoredSession>, SessionStoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No persisted session");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let record: StoredSession = serde_json::from_str(&raw)?;
        Ok(Some(record))
    }

    async fn save(&self, record: &StoredSession) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(record)?;
        // Write-then-rename so a crash never leaves a half-written record.
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), user_id = %record.user_id, "Session persisted");
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, onboarded: bool) -> StoredSession {
        StoredSession::from_session(&Session::new(user, "tok-123"), onboarded)
    }

    #[tokio::test]
    async fn memory_store_save_load_clear() {
        let store = MemorySessionStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save(&record("alice", true)).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.user_id, "alice");
        assert!(loaded.onboarding_completed);

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_store_unavailable() {
        let store = MemorySessionStore::unavailable("backend down");
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, SessionStoreError::Unavailable(ref r) if r == "backend down"));

        store.set_unavailable(None).await;
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        assert!(store.load().await.unwrap().is_none());
        // Clearing a missing file is fine too.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn file_store_persists_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = FileSessionStore::new(&path);

        let original = record("bob", false);
        store.save(&original).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.session_id, original.session_id);
        assert_eq!(loaded.access_token.expose_secret(), "tok-123");
        assert!(!loaded.onboarding_completed);

        store.clear().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn file_store_rejects_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = FileSessionStore::new(&path);
        assert!(matches!(
            store.load().await.unwrap_err(),
            SessionStoreError::Corrupt(_)
        ));
    }

    #[test]
    fn stored_session_round_trips_into_session() {
        let session = Session::new("carol", "tok");
        let id = session.id;
        let (restored, onboarded) = StoredSession::from_session(&session, true).into_session();
        assert_eq!(restored.id, id);
        assert_eq!(restored.user_id, "carol");
        assert!(onboarded);
    }
}
