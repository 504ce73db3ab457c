//! Configuration types.

use crate::error::ConfigError;
use crate::routes::{RouteGroup, RouteLocation};

/// Where the guard sends users when their current location is not allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// Landing route for signed-out users.
    pub auth_route: String,
    /// Entry route of the onboarding flow.
    pub onboarding_route: String,
    /// Tabs root of the app interior.
    pub tabs_route: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            auth_route: "/(auth)/login".to_string(),
            onboarding_route: "/(onboarding)".to_string(),
            tabs_route: "/(tabs)".to_string(),
        }
    }
}

impl GuardConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str, fallback: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };

        let config = Self {
            auth_route: read("NAV_GUARD_AUTH_ROUTE", defaults.auth_route),
            onboarding_route: read("NAV_GUARD_ONBOARDING_ROUTE", defaults.onboarding_route),
            tabs_route: read("NAV_GUARD_TABS_ROUTE", defaults.tabs_route),
        };
        config.validate()?;
        Ok(config)
    }

    /// Every redirect target must land inside the group it stands for,
    /// otherwise the guard would redirect again after arriving.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let targets = [
            ("NAV_GUARD_AUTH_ROUTE", &self.auth_route, RouteGroup::Auth),
            (
                "NAV_GUARD_ONBOARDING_ROUTE",
                &self.onboarding_route,
                RouteGroup::Onboarding,
            ),
            ("NAV_GUARD_TABS_ROUTE", &self.tabs_route, RouteGroup::AppInterior),
        ];
        for (key, path, expected) in targets {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("route must be absolute, got {path:?}"),
                });
            }
            let actual = RouteGroup::classify(&RouteLocation::parse(path));
            if actual != expected {
                return Err(ConfigError::TargetOutsideGroup {
                    key: key.to_string(),
                    path: path.clone(),
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Route for a redirect target group. `None` for groups that are never
    /// a redirect target.
    pub fn route_for(&self, group: RouteGroup) -> Option<&str> {
        match group {
            RouteGroup::Auth => Some(self.auth_route.as_str()),
            RouteGroup::Onboarding => Some(self.onboarding_route.as_str()),
            RouteGroup::AppInterior => Some(self.tabs_route.as_str()),
            RouteGroup::Unclassified => None,
        }
    }
}

/// Runtime settings for the `nav-guard` binary.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub guard: GuardConfig,
    /// File-backed session store location; in-memory when unset.
    pub session_file: Option<std::path::PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            guard: GuardConfig::from_env()?,
            session_file: std::env::var("NAV_GUARD_SESSION_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(std::path::PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        GuardConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_lookup_gives_defaults() {
        let config = GuardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GuardConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = GuardConfig::from_lookup(lookup(&[
            ("NAV_GUARD_AUTH_ROUTE", "/(auth)/welcome"),
            ("NAV_GUARD_TABS_ROUTE", " /(tabs)/home "),
        ]))
        .unwrap();
        assert_eq!(config.auth_route, "/(auth)/welcome");
        assert_eq!(config.tabs_route, "/(tabs)/home");
        assert_eq!(config.onboarding_route, "/(onboarding)");
    }

    #[test]
    fn blank_value_falls_back_to_default() {
        let config =
            GuardConfig::from_lookup(lookup(&[("NAV_GUARD_ONBOARDING_ROUTE", "   ")])).unwrap();
        assert_eq!(config.onboarding_route, "/(onboarding)");
    }

    #[test]
    fn target_outside_its_group_is_rejected() {
        let err = GuardConfig::from_lookup(lookup(&[("NAV_GUARD_TABS_ROUTE", "/(auth)/login")]))
            .unwrap_err();
        match err {
            ConfigError::TargetOutsideGroup {
                key,
                expected,
                actual,
                ..
            } => {
                assert_eq!(key, "NAV_GUARD_TABS_ROUTE");
                assert_eq!(expected, "app_interior");
                assert_eq!(actual, "auth");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unmapped_target_is_rejected() {
        let err = GuardConfig::from_lookup(lookup(&[("NAV_GUARD_AUTH_ROUTE", "/login")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::TargetOutsideGroup { .. }));
    }

    #[test]
    fn relative_route_is_rejected() {
        let err = GuardConfig::from_lookup(lookup(&[("NAV_GUARD_AUTH_ROUTE", "(auth)/login")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn route_for_groups() {
        let config = GuardConfig::default();
        assert_eq!(config.route_for(RouteGroup::Auth), Some("/(auth)/login"));
        assert_eq!(config.route_for(RouteGroup::AppInterior), Some("/(tabs)"));
        assert_eq!(config.route_for(RouteGroup::Unclassified), None);
    }
}
