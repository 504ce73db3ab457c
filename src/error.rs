//! Error types for the navigation guard and its collaborators.
//!
//! The guard itself is total and never fails; these errors belong to the
//! surfaces around it (configuration, auth provider, session persistence,
//! scenario replay).

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Session store error: {0}")]
    SessionStore(#[from] SessionStoreError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Redirect target {path} for {key} classifies as {actual}, expected {expected}")]
    TargetOutsideGroup {
        key: String,
        path: String,
        expected: String,
        actual: String,
    },
}

/// Auth provider errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No active session")]
    NoSession,

    #[error("Session store error: {0}")]
    Store(#[from] SessionStoreError),
}

/// Session persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session record: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Scenario replay errors.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Step {index} ({op}) failed: {source}")]
    Step {
        index: usize,
        op: String,
        #[source]
        source: AuthError,
    },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
