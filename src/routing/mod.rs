//! Routing module
//!
//! Explicit route table mapping `/<action>/<title>` paths to wiki handlers.

mod matcher;

pub use matcher::{match_route, RouteKind, RouteMatch, ROUTES};
