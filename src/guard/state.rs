//! Guard states and the redirect table.
//!
//! States are derived from inputs on every evaluation, never stored.

use serde::{Deserialize, Serialize};

use crate::routes::RouteGroup;

/// The navigation state implied by auth provider inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    /// Session still resolving (or resolution failed). No navigation decision.
    Initializing,
    /// Resolved, no session.
    Unauthenticated,
    /// Signed in, onboarding not finished.
    AuthenticatedPendingOnboarding,
    /// Signed in and onboarded.
    AuthenticatedReady,
}

/// One row of the redirect table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub state: GuardState,
    /// Groups in which no action is taken.
    pub valid: &'static [RouteGroup],
    /// Where to send the user otherwise. `None` means never redirect.
    pub target: Option<RouteGroup>,
}

/// The full redirect table, one row per state.
pub static RULES: [Rule; 4] = [
    Rule {
        state: GuardState::Initializing,
        valid: &[],
        target: None,
    },
    Rule {
        state: GuardState::Unauthenticated,
        valid: &[RouteGroup::Auth],
        target: Some(RouteGroup::Auth),
    },
    Rule {
        state: GuardState::AuthenticatedPendingOnboarding,
        valid: &[RouteGroup::Onboarding],
        target: Some(RouteGroup::Onboarding),
    },
    Rule {
        state: GuardState::AuthenticatedReady,
        valid: &[RouteGroup::AppInterior],
        target: Some(RouteGroup::AppInterior),
    },
];

impl GuardState {
    /// Derive the state. `loading` wins over everything else, so an auth
    /// provider stuck resolving keeps the guard initializing.
    pub fn from_inputs(has_session: bool, loading: bool, onboarding_complete: bool) -> Self {
        match (loading, has_session, onboarding_complete) {
            (true, _, _) => Self::Initializing,
            (false, false, _) => Self::Unauthenticated,
            (false, true, false) => Self::AuthenticatedPendingOnboarding,
            (false, true, true) => Self::AuthenticatedReady,
        }
    }

    pub fn rule(&self) -> &'static Rule {
        match self {
            Self::Initializing => &RULES[0],
            Self::Unauthenticated => &RULES[1],
            Self::AuthenticatedPendingOnboarding => &RULES[2],
            Self::AuthenticatedReady => &RULES[3],
        }
    }

    pub fn valid_groups(&self) -> &'static [RouteGroup] {
        self.rule().valid
    }

    pub fn redirect_target(&self) -> Option<RouteGroup> {
        self.rule().target
    }

    pub fn allows(&self, group: RouteGroup) -> bool {
        self.valid_groups().contains(&group)
    }

    /// Whether a navigation decision is made in this state at all.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Initializing)
    }
}

impl std::fmt::Display for GuardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Initializing => "initializing",
            Self::Unauthenticated => "unauthenticated",
            Self::AuthenticatedPendingOnboarding => "authenticated_pending_onboarding",
            Self::AuthenticatedReady => "authenticated_ready",
        };
        write!(f, "{s}")
    }
}
