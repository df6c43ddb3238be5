//! Routing module
//!
//! Provides the public route table:
//! - Slug sanitization for the promotion page path
//! - Ordered matching of health, media and slug routes

mod matcher;
mod slug;

pub use matcher::{HealthPaths, PublicRoute, RouteTable};
pub use slug::resolve_slug;
