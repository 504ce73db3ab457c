//! Router abstraction — the navigation primitive the guard drives.

use std::sync::Mutex;

use tokio::sync::watch;
use tracing::debug;

use crate::routes::RouteLocation;

/// What the guard needs from a router.
pub trait Router: Send + Sync {
    /// The location currently shown.
    fn current_location(&self) -> RouteLocation;

    /// Replace the current location without keeping it in back-history.
    /// Fire-and-forget: the navigation may land later.
    fn replace(&self, path: &str);
}

/// In-process router. The location lives in a `watch` channel so a guard
/// driver can react to navigation.
pub struct MemoryRouter {
    tx: watch::Sender<RouteLocation>,
    deferred: bool,
    pending: Mutex<Option<RouteLocation>>,
    replaced: Mutex<Vec<String>>,
}

impl MemoryRouter {
    /// A router whose `replace` lands immediately.
    pub fn new(initial: RouteLocation) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx,
            deferred: false,
            pending: Mutex::new(None),
            replaced: Mutex::new(Vec::new()),
        }
    }

    /// A router whose `replace` only lands on `complete_pending`.
    pub fn deferred(initial: RouteLocation) -> Self {
        Self {
            deferred: true,
            ..Self::new(initial)
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RouteLocation> {
        self.tx.subscribe()
    }

    /// User-driven navigation (tapping a link, deep link, back button).
    pub fn navigate(&self, path: &str) {
        let location = RouteLocation::parse(path);
        debug!(to = %location, "Navigate");
        self.tx.send_replace(location);
    }

    /// Land the most recent deferred `replace`, if any. Returns the
    /// location navigated to.
    pub fn complete_pending(&self) -> Option<RouteLocation> {
        let location = lock(&self.pending).take()?;
        self.tx.send_replace(location.clone());
        Some(location)
    }

    pub fn has_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }

    /// Every path passed to `replace`, oldest first.
    pub fn replaced(&self) -> Vec<String> {
        lock(&self.replaced).clone()
    }
}

impl Router for MemoryRouter {
    fn current_location(&self) -> RouteLocation {
        self.tx.borrow().clone()
    }

    fn replace(&self, path: &str) {
        lock(&self.replaced).push(path.to_string());
        let location = RouteLocation::parse(path);
        if self.deferred {
            // A newer replace supersedes one that has not landed yet.
            *lock(&self.pending) = Some(location);
        } else {
            self.tx.send_replace(location);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
