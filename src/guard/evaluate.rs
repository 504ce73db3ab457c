//! The pure decision function.

use serde::{Deserialize, Serialize};

use super::state::GuardState;
use crate::auth::{AuthSnapshot, Session};
use crate::routes::RouteGroup;

/// What the guard asks the router to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "target")]
pub enum Action {
    NoOp,
    RedirectTo(RouteGroup),
}

impl Action {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::RedirectTo(_))
    }
}

/// What the UI layer renders in place of the navigator root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Loading view substituted for the navigable tree.
    Loading,
    /// The navigable tree.
    Navigator,
}

/// Full result of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub state: GuardState,
    pub current_group: RouteGroup,
    pub action: Action,
    pub view: View,
}

/// Decide the action for one set of inputs.
pub fn evaluate(
    session: Option<&Session>,
    loading: bool,
    onboarding_complete: bool,
    current_group: RouteGroup,
) -> Action {
    decide(
        GuardState::from_inputs(session.is_some(), loading, onboarding_complete),
        current_group,
    )
    .action
}

/// Evaluate an auth snapshot against the group the user is in.
pub fn evaluate_snapshot(snapshot: &AuthSnapshot, current_group: RouteGroup) -> Evaluation {
    decide(
        GuardState::from_inputs(
            snapshot.session.is_some(),
            snapshot.loading,
            snapshot.has_completed_onboarding,
        ),
        current_group,
    )
}

/// Table lookup: valid group → `NoOp`, anything else → redirect to the
/// state's target.
pub fn decide(state: GuardState, current_group: RouteGroup) -> Evaluation {
    let (action, view) = match state.redirect_target() {
        None => (Action::NoOp, View::Loading),
        Some(_) if state.allows(current_group) => (Action::NoOp, View::Navigator),
        Some(target) => (Action::RedirectTo(target), View::Navigator),
    };
    Evaluation {
        state,
        current_group,
        action,
        view,
    }
}
