//! AuthStore — the auth provider that owns session and onboarding state.
//!
//! It is the single writer of `AuthSnapshot`. Everything else (the guard
//! included) observes snapshots through a `watch` receiver and never mutates
//! them. Mutations are serialized so the persisted record always follows
//! the order in which snapshots were published.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tracing::{error, info, warn};

use super::session::{AuthSnapshot, Session};
use super::store::{SessionStore, StoredSession};
use crate::error::AuthError;

/// Read side of an auth provider.
pub trait AuthProvider: Send + Sync {
    /// Current snapshot.
    fn snapshot(&self) -> AuthSnapshot;

    /// Receiver notified on every snapshot change.
    fn subscribe(&self) -> watch::Receiver<AuthSnapshot>;
}

/// Auth provider backed by a `SessionStore` and a `watch` channel.
pub struct AuthStore {
    store: Arc<dyn SessionStore>,
    tx: watch::Sender<AuthSnapshot>,
    /// Held across a snapshot change and its store write.
    write_lock: Mutex<()>,
}

impl AuthStore {
    /// Create a provider in the restoring (`loading`) state.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (tx, _rx) = watch::channel(AuthSnapshot::restoring());
        Self {
            store,
            tx,
            write_lock: Mutex::new(()),
        }
    }

    /// Resolve the persisted session.
    ///
    /// A store failure leaves the provider loading: the guard keeps showing
    /// the loading view rather than bouncing a possibly valid session to
    /// the login flow.
    pub async fn restore(&self) -> Result<(), AuthError> {
        self.restore_at(Utc::now()).await
    }

    pub async fn restore_at(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        let _guard = self.write_lock.lock().await;
        let record = match self.store.load().await {
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, "Session restore failed, staying in loading state");
                let reason = e.to_string();
                self.tx.send_modify(|snap| {
                    snap.loading = true;
                    snap.last_error = Some(reason);
                });
                return Err(e.into());
            }
        };

        match record.map(StoredSession::into_session) {
            Some((session, _)) if session.is_expired(now) => {
                warn!(session_id = %session.id, "Persisted session expired, discarding");
                if let Err(e) = self.store.clear().await {
                    warn!(error = %e, "Failed to clear expired session");
                }
                self.tx.send_replace(AuthSnapshot::signed_out());
            }
            Some((session, onboarded)) => {
                info!(
                    session_id = %session.id,
                    user_id = %session.user_id,
                    onboarded,
                    "Session restored"
                );
                self.tx.send_replace(AuthSnapshot::signed_in(session, onboarded));
            }
            None => {
                info!("No session to restore");
                self.tx.send_replace(AuthSnapshot::signed_out());
            }
        }
        Ok(())
    }

    /// Install a freshly authenticated session, replacing any previous one.
    ///
    /// Persistence failures are logged and do not undo the sign-in.
    pub async fn sign_in(&self, session: Session, onboarding_completed: bool) {
        let _guard = self.write_lock.lock().await;
        let record = StoredSession::from_session(&session, onboarding_completed);
        if let Some(previous) = self.tx.borrow().session_id() {
            info!(previous = %previous, next = %session.id, "Replacing active session");
        }
        info!(session_id = %session.id, user_id = %session.user_id, "Signed in");
        self.tx
            .send_replace(AuthSnapshot::signed_in(session, onboarding_completed));

        if let Err(e) = self.store.save(&record).await {
            warn!(error = %e, "Failed to persist session");
        }
    }

    /// Destroy the active session.
    pub async fn sign_out(&self) {
        let _guard = self.write_lock.lock().await;
        self.sign_out_locked().await;
    }

    async fn sign_out_locked(&self) {
        let previous = self.tx.send_replace(AuthSnapshot::signed_out());
        if let Some(id) = previous.session_id() {
            info!(session_id = %id, "Signed out");
        }
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear persisted session");
        }
    }

    /// Mark onboarding complete for the active session. Only ever moves the
    /// flag from false to true; calling it again is a no-op.
    ///
    /// The record is persisted before the flag is published, so a failed
    /// write leaves the user in onboarding.
    pub async fn complete_onboarding(&self) -> Result<(), AuthError> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.snapshot();
        let session = snapshot.session.as_ref().ok_or(AuthError::NoSession)?;
        if snapshot.has_completed_onboarding {
            return Ok(());
        }

        self.store
            .save(&StoredSession::from_session(session, true))
            .await?;

        let published = self.tx.send_if_modified(|snap| {
            if snap.session_id() != Some(session.id) {
                return false;
            }
            snap.has_completed_onboarding = true;
            true
        });
        if published {
            info!(session_id = %session.id, "Onboarding completed");
        } else {
            warn!(session_id = %session.id, "Session changed while completing onboarding");
        }
        Ok(())
    }

    /// Drop the active session if its token has expired by `now`.
    /// Returns whether a session was dropped.
    pub async fn expire_if_needed(&self, now: DateTime<Utc>) -> bool {
        let _guard = self.write_lock.lock().await;
        let expired = self
            .tx
            .borrow()
            .session
            .as_ref()
            .is_some_and(|s| s.is_expired(now));
        if expired {
            warn!("Session token expired");
            self.sign_out_locked().await;
        }
        expired
    }
}

impl AuthProvider for AuthStore {
    fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }
}
