//! NavigationGuard — applies evaluations to a router.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::evaluate::{Action, Evaluation, evaluate_snapshot};
use crate::auth::AuthSnapshot;
use crate::config::GuardConfig;
use crate::router::Router;
use crate::routes::{RouteGroup, RouteLocation};

/// A redirect that has been issued but has not landed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    path: String,
    /// Location at the time the redirect was issued.
    from: RouteLocation,
}

/// Outcome of one `apply` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Sequence number of this evaluation.
    pub seq: u64,
    pub location: RouteLocation,
    pub evaluation: Evaluation,
    /// Path passed to `Router::replace`, if one was issued.
    pub replaced: Option<String>,
}

/// Evaluates auth snapshots against the router's current location and
/// issues at most one `replace` per evaluation.
///
/// Every call re-reads the router, so a call made after inputs changed
/// always acts on the latest state; nothing is queued.
pub struct NavigationGuard {
    router: Arc<dyn Router>,
    config: GuardConfig,
    in_flight: Option<InFlight>,
    seq: u64,
}

impl NavigationGuard {
    pub fn new(router: Arc<dyn Router>, config: GuardConfig) -> Self {
        Self {
            router,
            config,
            in_flight: None,
            seq: 0,
        }
    }

    /// Evaluate against the current location and dispatch the action.
    pub fn apply(&mut self, snapshot: &AuthSnapshot) -> Applied {
        self.seq += 1;
        let seq = self.seq;
        let location = self.router.current_location();
        let current_group = RouteGroup::classify(&location);
        let evaluation = evaluate_snapshot(snapshot, current_group);

        // Any movement since the redirect was issued means it landed or was
        // overtaken by user navigation.
        if self
            .in_flight
            .as_ref()
            .is_some_and(|pending| pending.from != location)
        {
            self.in_flight = None;
        }

        let replaced = match evaluation.action {
            Action::NoOp => {
                debug!(
                    seq,
                    state = %evaluation.state,
                    location = %location,
                    "Navigation allowed"
                );
                self.in_flight = None;
                None
            }
            Action::RedirectTo(target) => self.redirect(seq, target, &location, &evaluation),
        };

        Applied {
            seq,
            location,
            evaluation,
            replaced,
        }
    }

    fn redirect(
        &mut self,
        seq: u64,
        target: RouteGroup,
        location: &RouteLocation,
        evaluation: &Evaluation,
    ) -> Option<String> {
        let Some(path) = self.config.route_for(target) else {
            warn!(seq, group = %target, "No route configured for redirect target");
            return None;
        };

        if self
            .in_flight
            .as_ref()
            .is_some_and(|pending| pending.path == path)
        {
            debug!(seq, to = path, "Redirect already in flight");
            return None;
        }

        info!(
            seq,
            state = %evaluation.state,
            from = %location,
            from_group = %evaluation.current_group,
            to = path,
            "Redirecting"
        );
        self.router.replace(path);
        self.in_flight = Some(InFlight {
            path: path.to_string(),
            from: location.clone(),
        });
        Some(path.to_string())
    }
}
