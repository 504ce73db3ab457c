//! Auth provider — owns the session and onboarding flag the guard observes.

pub mod provider;
pub mod session;
pub mod store;

pub use provider::{AuthProvider, AuthStore};
pub use session::{AuthSnapshot, Session};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoredSession};
