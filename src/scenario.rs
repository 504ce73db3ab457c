//! Scenario replay — drive the auth provider, router and guard through a
//! scripted sequence of events and record what the guard decided.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{
    AuthProvider, AuthStore, FileSessionStore, MemorySessionStore, Session, SessionStore,
    StoredSession,
};
use crate::config::GuardConfig;
use crate::error::{AuthError, Result as CrateResult, ScenarioError};
use crate::guard::{Action, GuardState, NavigationGuard, View, evaluate_snapshot};
use crate::router::{MemoryRouter, Router};
use crate::routes::{RouteGroup, RouteLocation};

/// A session described in a scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSpec {
    pub user_id: String,
    #[serde(default)]
    pub onboarding_complete: bool,
    /// Token lifetime relative to the scenario clock.
    #[serde(default)]
    pub expires_in_secs: Option<i64>,
}

impl SessionSpec {
    fn build(&self, now: DateTime<Utc>) -> Session {
        let session = Session::new(&self.user_id, format!("scenario-{}", self.user_id));
        match self.expires_in_secs {
            Some(secs) => session.with_expiry(now + Duration::seconds(secs)),
            None => session,
        }
    }
}

/// One scripted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Resolve the persisted session (seeded with `session` if given).
    Restore {
        #[serde(default)]
        session: Option<SessionSpec>,
    },
    /// Session resolution fails with `reason`.
    RestoreFailed { reason: String },
    SignIn {
        user_id: String,
        #[serde(default)]
        onboarding_complete: bool,
        #[serde(default)]
        expires_in_secs: Option<i64>,
    },
    SignOut,
    CompleteOnboarding,
    /// User-driven navigation.
    Navigate { path: String },
    /// Move the scenario clock forward and expire tokens past their lifetime.
    Advance { secs: i64 },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Restore { .. } => "restore",
            Self::RestoreFailed { .. } => "restore_failed",
            Self::SignIn { .. } => "sign_in",
            Self::SignOut => "sign_out",
            Self::CompleteOnboarding => "complete_onboarding",
            Self::Navigate { .. } => "navigate",
            Self::Advance { .. } => "advance",
        }
    }
}

/// What the guard did after one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: String,
    pub state: GuardState,
    pub action: Action,
    pub view: View,
    /// Path passed to the router, if the guard redirected.
    pub replaced: Option<String>,
    /// Location once the step and any redirect landed.
    pub location: RouteLocation,
    /// Whether re-evaluating at the final location takes no action.
    pub settled: bool,
}

/// A named sequence of steps starting from `start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    /// Location the app opens at.
    #[serde(default = "default_start")]
    pub start: String,
    pub steps: Vec<Step>,
}

fn default_start() -> String {
    "/".to_string()
}

impl Scenario {
    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub async fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_json(&raw)
    }

    /// Cold start with a persisted but not yet onboarded session, then
    /// onboarding, some browsing, and sign-out.
    pub fn cold_start_demo() -> Self {
        Self {
            name: Some("cold-start".to_string()),
            start: "/(tabs)".to_string(),
            steps: vec![
                Step::Restore {
                    session: Some(SessionSpec {
                        user_id: "producer-42".to_string(),
                        onboarding_complete: false,
                        expires_in_secs: Some(3600),
                    }),
                },
                Step::Navigate {
                    path: "/studio/7".to_string(),
                },
                Step::CompleteOnboarding,
                Step::Navigate {
                    path: "/bookings/19".to_string(),
                },
                Step::Navigate {
                    path: "/beats-v2".to_string(),
                },
                Step::Advance { secs: 7200 },
            ],
        }
    }

    /// Replay against fresh in-memory collaborators.
    pub async fn run(&self, config: GuardConfig) -> Result<Vec<StepOutcome>, ScenarioError> {
        let store = Arc::new(MemorySessionStore::new());
        self.run_with_store(config, store).await
    }

    /// Replay seeded from the session file at `session_file`, if any, and
    /// write the session the replay ended with back to it.
    pub async fn run_persisted(
        &self,
        config: GuardConfig,
        session_file: Option<&Path>,
    ) -> CrateResult<Vec<StepOutcome>> {
        let store = Arc::new(MemorySessionStore::new());
        let file_store = session_file.map(FileSessionStore::new);

        if let Some(file_store) = &file_store {
            match file_store.load().await {
                Ok(Some(record)) => {
                    info!(
                        path = %file_store.path().display(),
                        user_id = %record.user_id,
                        "Seeding replay from session file"
                    );
                    store.save(&record).await?;
                }
                Ok(None) => info!(path = %file_store.path().display(), "Session file empty"),
                Err(e) => warn!(error = %e, "Could not read session file"),
            }
        }

        let outcomes = self.run_with_store(config, Arc::clone(&store)).await?;

        if let Some(file_store) = &file_store {
            let result = match store.load().await? {
                Some(record) => file_store.save(&record).await,
                None => file_store.clear().await,
            };
            if let Err(e) = result {
                warn!(error = %e, "Could not update session file");
            }
        }
        Ok(outcomes)
    }

    pub async fn run_with_store(
        &self,
        config: GuardConfig,
        store: Arc<MemorySessionStore>,
    ) -> Result<Vec<StepOutcome>, ScenarioError> {
        let router = Arc::new(MemoryRouter::new(RouteLocation::parse(&self.start)));
        let auth = AuthStore::new(store.clone());
        let mut guard = NavigationGuard::new(router.clone(), config);
        let mut now = Utc::now();

        info!(
            scenario = self.name.as_deref().unwrap_or("unnamed"),
            steps = self.steps.len(),
            "Replaying scenario"
        );

        // Mount: the guard runs once before any event.
        guard.apply(&auth.snapshot());

        let mut outcomes = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            let step_err = |source: AuthError| ScenarioError::Step {
                index,
                op: step.name().to_string(),
                source,
            };

            match step {
                Step::Restore { session } => {
                    if let Some(spec) = session {
                        let record =
                            StoredSession::from_session(&spec.build(now), spec.onboarding_complete);
                        store.save(&record).await.map_err(|e| step_err(e.into()))?;
                    }
                    auth.restore_at(now).await.map_err(step_err)?;
                }
                Step::RestoreFailed { reason } => {
                    store.set_unavailable(Some(reason.clone())).await;
                    if let Err(e) = auth.restore_at(now).await {
                        warn!(index, error = %e, "Restore failed as scripted");
                    }
                    store.set_unavailable(None).await;
                }
                Step::SignIn {
                    user_id,
                    onboarding_complete,
                    expires_in_secs,
                } => {
                    let spec = SessionSpec {
                        user_id: user_id.clone(),
                        onboarding_complete: *onboarding_complete,
                        expires_in_secs: *expires_in_secs,
                    };
                    auth.sign_in(spec.build(now), *onboarding_complete).await;
                }
                Step::SignOut => auth.sign_out().await,
                Step::CompleteOnboarding => {
                    auth.complete_onboarding().await.map_err(step_err)?;
                }
                Step::Navigate { path } => router.navigate(path),
                Step::Advance { secs } => {
                    now += Duration::seconds(*secs);
                    auth.expire_if_needed(now).await;
                }
            }

            let snapshot = auth.snapshot();
            let applied = guard.apply(&snapshot);
            let location = router.current_location();
            let settled = evaluate_snapshot(&snapshot, RouteGroup::classify(&location)).action
                == Action::NoOp;

            outcomes.push(StepOutcome {
                index,
                op: step.name().to_string(),
                state: applied.evaluation.state,
                action: applied.evaluation.action,
                view: applied.evaluation.view,
                replaced: applied.replaced,
                location,
                settled,
            });
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::RouteGroup;

    #[test]
    fn parses_json_steps() {
        let scenario = Scenario::from_json(
            r#"{
                "name": "login",
                "steps": [
                    {"op": "restore"},
                    {"op": "sign_in", "user_id": "u1"},
                    {"op": "navigate", "path": "/(tabs)"},
                    {"op": "advance", "secs": 30},
                    {"op": "sign_out"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(scenario.start, "/");
        assert_eq!(scenario.steps.len(), 5);
        assert!(matches!(
            &scenario.steps[1],
            Step::SignIn { user_id, onboarding_complete: false, .. } if user_id == "u1"
        ));
        assert_eq!(scenario.steps[4].name(), "sign_out");
    }

    #[test]
    fn rejects_unknown_op() {
        let err = Scenario::from_json(r#"{"steps": [{"op": "teleport"}]}"#).unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[tokio::test]
    async fn cold_start_demo_outcomes() {
        let outcomes = Scenario::cold_start_demo()
            .run(GuardConfig::default())
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 6);
        assert!(outcomes.iter().all(|o| o.settled));

        // Restored but not onboarded: pushed out of tabs into onboarding.
        assert_eq!(outcomes[0].state, GuardState::AuthenticatedPendingOnboarding);
        assert_eq!(outcomes[0].action, Action::RedirectTo(RouteGroup::Onboarding));
        // Trying to reach the studio before onboarding bounces back.
        assert_eq!(outcomes[1].replaced.as_deref(), Some("/(onboarding)"));
        // Onboarding done: into the tabs.
        assert_eq!(outcomes[2].location.to_string(), "/(tabs)");
        // Bookings is part of the app interior.
        assert_eq!(outcomes[3].action, Action::NoOp);
        assert_eq!(outcomes[3].location.to_string(), "/bookings/19");
        // Unmapped screen is redirected.
        assert_eq!(outcomes[4].replaced.as_deref(), Some("/(tabs)"));
        // Token expired: back to login.
        assert_eq!(outcomes[5].state, GuardState::Unauthenticated);
        assert_eq!(outcomes[5].location.to_string(), "/(auth)/login");
    }

    #[tokio::test]
    async fn restore_failure_stays_on_loading_view() {
        let scenario = Scenario::from_json(
            r#"{"start": "/(tabs)", "steps": [{"op": "restore_failed", "reason": "offline"}]}"#,
        )
        .unwrap();
        let outcomes = scenario.run(GuardConfig::default()).await.unwrap();
        assert_eq!(outcomes[0].state, GuardState::Initializing);
        assert_eq!(outcomes[0].view, View::Loading);
        assert_eq!(outcomes[0].action, Action::NoOp);
        assert_eq!(outcomes[0].location.to_string(), "/(tabs)");
    }

    #[tokio::test]
    async fn complete_onboarding_without_session_fails_step() {
        let scenario = Scenario::from_json(
            r#"{"steps": [{"op": "restore"}, {"op": "complete_onboarding"}]}"#,
        )
        .unwrap();
        let err = scenario.run(GuardConfig::default()).await.unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Step { index: 1, ref op, .. } if op == "complete_onboarding"
        ));
    }

    #[tokio::test]
    async fn each_step_issues_one_redirect() {
        let scenario = Scenario::from_json(
            r#"{"start": "/(tabs)", "steps": [{"op": "restore"}, {"op": "navigate", "path": "/bookings"}]}"#,
        )
        .unwrap();
        let outcomes = scenario.run(GuardConfig::default()).await.unwrap();
        // One redirect per step.
        assert_eq!(outcomes[0].replaced.as_deref(), Some("/(auth)/login"));
        assert_eq!(outcomes[1].replaced.as_deref(), Some("/(auth)/login"));
        assert!(outcomes.iter().all(|o| o.settled));
    }

    #[tokio::test]
    async fn unreachable_target_is_reported_unsettled() {
        // A tabs route that does not classify as app interior never settles.
        let config = GuardConfig {
            tabs_route: "/(auth)/login".to_string(),
            ..GuardConfig::default()
        };
        let scenario = Scenario::from_json(
            r#"{"start": "/(auth)/login", "steps": [{"op": "sign_in", "user_id": "u", "onboarding_complete": true}]}"#,
        )
        .unwrap();
        let outcomes = scenario.run(config).await.unwrap();
        assert_eq!(outcomes[0].replaced.as_deref(), Some("/(auth)/login"));
        assert!(!outcomes[0].settled);
    }

    #[tokio::test]
    async fn persisted_run_writes_back_final_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let seed = StoredSession::from_session(&Session::new("pat", "tok"), true);
        FileSessionStore::new(&path).save(&seed).await.unwrap();

        let scenario = Scenario::from_json(
            r#"{"start": "/", "steps": [{"op": "restore"}, {"op": "sign_out"}]}"#,
        )
        .unwrap();
        let outcomes = scenario
            .run_persisted(GuardConfig::default(), Some(path.as_path()))
            .await
            .unwrap();

        assert_eq!(outcomes[0].state, GuardState::AuthenticatedReady);
        assert_eq!(outcomes[1].state, GuardState::Unauthenticated);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn persisted_run_reports_step_errors() {
        let scenario = Scenario::from_json(r#"{"steps": [{"op": "complete_onboarding"}]}"#).unwrap();
        let err = scenario
            .run_persisted(GuardConfig::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::Scenario(ScenarioError::Step { .. })));
    }

    #[tokio::test]
    async fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.json");
        let json = serde_json::to_string(&Scenario::cold_start_demo()).unwrap();
        tokio::fs::write(&path, json).await.unwrap();

        let scenario = Scenario::load(&path).await.unwrap();
        assert_eq!(scenario.name.as_deref(), Some("cold-start"));
        assert_eq!(scenario.steps.len(), 6);
    }
}
