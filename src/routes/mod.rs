//! Route model — router locations and their classification into groups.

pub mod group;
pub mod location;

pub use group::{InteriorRoute, ROUTE_TABLE, RouteGroup};
pub use location::RouteLocation;
