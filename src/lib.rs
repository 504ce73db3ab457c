//! nav-guard — session-gated navigation for the creator marketplace app.

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod router;
pub mod routes;
pub mod scenario;
