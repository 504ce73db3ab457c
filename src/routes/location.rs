//! Router locations as ordered path segments.

use serde::{Deserialize, Serialize};

/// Where the user currently is, as the router reports it.
///
/// Only the first segment matters for group classification; the rest is
/// carried so redirects and logs can show the full location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteLocation {
    segments: Vec<String>,
}

impl RouteLocation {
    /// The root location (`/`), which has no segments.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a router path such as `/(tabs)/marketplace?tab=beats`.
    ///
    /// Query strings and fragments are dropped, as are empty segments, so
    /// `//studio/` and `/studio` are the same location.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments = path
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    /// Build a location directly from segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    /// The first segment, used to classify the route group.
    pub fn first_segment(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl std::fmt::Display for RouteLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl From<&str> for RouteLocation {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}
