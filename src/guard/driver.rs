//! Reactive loop — re-runs the guard whenever auth state or location changes.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::evaluate::View;
use super::runtime::NavigationGuard;
use crate::auth::AuthSnapshot;
use crate::routes::RouteLocation;

/// Spawn the guard on its own task.
///
/// Evaluates once on start, then once per observed change. `watch`
/// coalesces bursts, so each pass sees only the latest auth snapshot and
/// location. The chosen view is published on `view_tx`. The task ends when
/// either input channel closes.
pub fn spawn_guard(
    mut guard: NavigationGuard,
    mut auth_rx: watch::Receiver<AuthSnapshot>,
    mut location_rx: watch::Receiver<RouteLocation>,
    view_tx: watch::Sender<View>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Navigation guard started");
        loop {
            // Mark both inputs seen before evaluating so a change that
            // arrives mid-pass triggers another pass.
            let snapshot = auth_rx.borrow_and_update().clone();
            location_rx.borrow_and_update();

            let applied = guard.apply(&snapshot);
            view_tx.send_if_modified(|view| {
                let changed = *view != applied.evaluation.view;
                *view = applied.evaluation.view;
                changed
            });

            let closed = tokio::select! {
                res = auth_rx.changed() => res.is_err(),
                res = location_rx.changed() => res.is_err(),
            };
            if closed {
                debug!("Guard input closed");
                break;
            }
        }
        info!("Navigation guard stopped");
    })
}
