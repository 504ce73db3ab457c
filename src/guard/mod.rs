//! Navigation guard — keeps the user inside the route group their session
//! allows.
//!
//! `state` holds the redirect table, `evaluate` the pure decision function,
//! `runtime` applies decisions to a router and `driver` re-runs the guard on
//! every input change.

pub mod driver;
pub mod evaluate;
pub mod runtime;
pub mod state;

pub use driver::spawn_guard;
pub use evaluate::{Action, Evaluation, View, decide, evaluate, evaluate_snapshot};
pub use runtime::{Applied, NavigationGuard};
pub use state::{GuardState, RULES, Rule};
