//! Route groups — the top-level partitions the guard reasons about.
//!
//! `ROUTE_TABLE` is the one place that says which first segment belongs to
//! which group. A screen whose first segment is missing from it classifies as
//! `Unclassified` and gets redirected in every settled state.

use serde::{Deserialize, Serialize};

use super::location::RouteLocation;

/// Top-level navigational partition of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteGroup {
    /// Login / sign-up screens.
    Auth,
    /// First-run onboarding flow.
    Onboarding,
    /// The tabs root and every detail screen reachable from it.
    AppInterior,
    /// A location not mapped to any known group.
    Unclassified,
}

/// Sections that together make up the app interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteriorRoute {
    Tabs,
    Studio,
    Producer,
    Profile,
    Club,
    Community,
    Bookings,
    Transactions,
    Settings,
    Notifications,
    Modal,
}

impl InteriorRoute {
    pub const ALL: [InteriorRoute; 11] = [
        Self::Tabs,
        Self::Studio,
        Self::Producer,
        Self::Profile,
        Self::Club,
        Self::Community,
        Self::Bookings,
        Self::Transactions,
        Self::Settings,
        Self::Notifications,
        Self::Modal,
    ];

    /// The router segment this section lives under.
    pub const fn segment(&self) -> &'static str {
        match self {
            Self::Tabs => "(tabs)",
            Self::Studio => "studio",
            Self::Producer => "producer",
            Self::Profile => "profile",
            Self::Club => "club",
            Self::Community => "community",
            Self::Bookings => "bookings",
            Self::Transactions => "transactions",
            Self::Settings => "settings",
            Self::Notifications => "notifications",
            Self::Modal => "modal",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.segment() == segment)
    }
}

/// First segment → group. Interior sections are listed in `InteriorRoute`.
pub const ROUTE_TABLE: &[(&str, RouteGroup)] = &[
    ("(auth)", RouteGroup::Auth),
    ("(onboarding)", RouteGroup::Onboarding),
    (InteriorRoute::Tabs.segment(), RouteGroup::AppInterior),
    (InteriorRoute::Studio.segment(), RouteGroup::AppInterior),
    (InteriorRoute::Producer.segment(), RouteGroup::AppInterior),
    (InteriorRoute::Profile.segment(), RouteGroup::AppInterior),
    (InteriorRoute::Club.segment(), RouteGroup::AppInterior),
    (InteriorRoute::Community.segment(), RouteGroup::AppInterior),
    (InteriorRoute::Bookings.segment(), RouteGroup::AppInterior),
    (InteriorRoute::Transactions.segment(), RouteGroup::AppInterior),
    (InteriorRoute::Settings.segment(), RouteGroup::AppInterior),
    (InteriorRoute::Notifications.segment(), RouteGroup::AppInterior),
    (InteriorRoute::Modal.segment(), RouteGroup::AppInterior),
];

impl RouteGroup {
    /// Classify a single first segment.
    pub fn classify_segment(segment: &str) -> Self {
        ROUTE_TABLE
            .iter()
            .find(|(s, _)| *s == segment)
            .map(|(_, group)| *group)
            .unwrap_or(Self::Unclassified)
    }

    /// Classify a full location by its first segment. The bare root is
    /// unclassified.
    pub fn classify(location: &RouteLocation) -> Self {
        location
            .first_segment()
            .map(Self::classify_segment)
            .unwrap_or(Self::Unclassified)
    }
}

impl std::fmt::Display for RouteGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Auth => "auth",
            Self::Onboarding => "onboarding",
            Self::AppInterior => "app_interior",
            Self::Unclassified => "unclassified",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_interior_route_is_in_table() {
        for route in InteriorRoute::ALL {
            assert_eq!(
                RouteGroup::classify_segment(route.segment()),
                RouteGroup::AppInterior,
                "{route:?} should classify as app interior"
            );
        }
        let interior_rows = ROUTE_TABLE
            .iter()
            .filter(|(_, g)| *g == RouteGroup::AppInterior)
            .count();
        assert_eq!(interior_rows, InteriorRoute::ALL.len());
    }

    #[test]
    fn table_has_no_duplicate_segments() {
        for (i, (a, _)) in ROUTE_TABLE.iter().enumerate() {
            for (b, _) in &ROUTE_TABLE[i + 1..] {
                assert_ne!(a, b, "duplicate segment {a}");
            }
        }
    }

    #[test]
    fn classify_known_groups() {
        assert_eq!(
            RouteGroup::classify(&RouteLocation::parse("/(auth)/login")),
            RouteGroup::Auth
        );
        assert_eq!(
            RouteGroup::classify(&RouteLocation::parse("/(onboarding)/role")),
            RouteGroup::Onboarding
        );
        assert_eq!(
            RouteGroup::classify(&RouteLocation::parse("/bookings/17")),
            RouteGroup::AppInterior
        );
        assert_eq!(
            RouteGroup::classify(&RouteLocation::parse("/(tabs)")),
            RouteGroup::AppInterior
        );
    }

    #[test]
    fn unmapped_and_root_are_unclassified() {
        assert_eq!(
            RouteGroup::classify(&RouteLocation::parse("/marketplace-v2")),
            RouteGroup::Unclassified
        );
        assert_eq!(
            RouteGroup::classify(&RouteLocation::root()),
            RouteGroup::Unclassified
        );
        // Matching is exact: group folders keep their parentheses.
        assert_eq!(RouteGroup::classify_segment("tabs"), RouteGroup::Unclassified);
        assert_eq!(RouteGroup::classify_segment("Bookings"), RouteGroup::Unclassified);
    }

    #[test]
    fn only_first_segment_matters() {
        assert_eq!(
            RouteGroup::classify(&RouteLocation::parse("/(auth)/bookings")),
            RouteGroup::Auth
        );
    }

    #[test]
    fn interior_route_lookup() {
        assert_eq!(InteriorRoute::from_segment("club"), Some(InteriorRoute::Club));
        assert_eq!(InteriorRoute::from_segment("(auth)"), None);
    }

    #[test]
    fn display_matches_serde() {
        for group in [
            RouteGroup::Auth,
            RouteGroup::Onboarding,
            RouteGroup::AppInterior,
            RouteGroup::Unclassified,
        ] {
            let json = serde_json::to_string(&group).unwrap();
            assert_eq!(format!("\"{group}\""), json);
        }
    }
}
