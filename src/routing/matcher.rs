//! Route matching module
//!
//! Maps request paths on the public server to the handler that owns them.

/// Handlers reachable on the public server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicRoute {
    /// The promotion page for the configured slug
    Promotion,
    /// A stored document under the storage URL prefix
    Media,
    Liveness,
    Readiness,
}

/// Route matching conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    /// Exact path match
    Path(String),
    /// Path prefix match (e.g., "/uploads" matches "/uploads/a.pdf")
    Prefix(String),
    /// `^/<slug>/?$`
    Slug(String),
}

/// Health probe paths
#[derive(Debug, Clone)]
pub struct HealthPaths {
    pub liveness: String,
    pub readiness: String,
}

impl Default for HealthPaths {
    fn default() -> Self {
        Self {
            liveness: "/healthz".to_string(),
            readiness: "/readyz".to_string(),
        }
    }
}

/// Ordered route list, rebuilt whenever the slug changes
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<(RouteMatch, PublicRoute)>,
}

impl RouteTable {
    pub fn build(slug: &str, media_prefix: &str, health: &HealthPaths) -> Self {
        let media_prefix = format!("/{}/", media_prefix.trim_matches('/'));
        let routes = vec![
            (RouteMatch::Path(health.liveness.clone()), PublicRoute::Liveness),
            (RouteMatch::Path(health.readiness.clone()), PublicRoute::Readiness),
            (RouteMatch::Prefix(media_prefix), PublicRoute::Media),
            (RouteMatch::Slug(slug.to_string()), PublicRoute::Promotion),
        ];
        Self { routes }
    }

    /// First path segments owned by the fixed routes
    ///
    /// A slug equal to one of these would be shadowed by the fixed route
    /// (`/<prefix>/` always goes to media), so slugs must avoid them.
    pub fn reserved_segments(media_prefix: &str, health: &HealthPaths) -> Vec<String> {
        [health.liveness.as_str(), health.readiness.as_str(), media_prefix]
            .iter()
            .filter_map(|path| path.trim_start_matches('/').split('/').next())
            .filter(|segment| !segment.is_empty())
            .map(str::to_ascii_lowercase)
            .collect()
    }

    /// Find the first matching route for a given path
    pub fn resolve(&self, path: &str) -> Option<PublicRoute> {
        self.routes
            .iter()
            .find(|(rule, _)| match_path(rule, path))
            .map(|(_, route)| *route)
    }
}

/// Check if a path matches a route rule
pub fn match_path(rule: &RouteMatch, path: &str) -> bool {
    match rule {
        RouteMatch::Path(exact) => path == exact,
        RouteMatch::Prefix(prefix) => path.starts_with(prefix.as_str()),
        RouteMatch::Slug(slug) => {
            let Some(rest) = path.strip_prefix('/') else {
                return false;
            };
            let rest = rest.strip_suffix('/').unwrap_or(rest);
            !slug.is_empty() && rest == slug
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(slug: &str) -> RouteTable {
        RouteTable::build(slug, "/uploads", &HealthPaths::default())
    }

    #[test]
    fn test_slug_with_and_without_trailing_slash() {
        let t = table("playas");
        assert_eq!(t.resolve("/playas"), Some(PublicRoute::Promotion));
        assert_eq!(t.resolve("/playas/"), Some(PublicRoute::Promotion));
        assert_eq!(t.resolve("/playas//"), None);
        assert_eq!(t.resolve("/playas/extra"), None);
        assert_eq!(t.resolve("/playasx"), None);
        assert_eq!(t.resolve("/"), None);
    }

    #[test]
    fn test_rebuilt_table_drops_old_slug() {
        let old = table("playas");
        let new = table("ofertas");
        assert_eq!(old.resolve("/playas"), Some(PublicRoute::Promotion));
        assert_eq!(new.resolve("/playas"), None);
        assert_eq!(new.resolve("/ofertas"), Some(PublicRoute::Promotion));
    }

    #[test]
    fn test_fixed_routes() {
        let t = table("playas");
        assert_eq!(t.resolve("/healthz"), Some(PublicRoute::Liveness));
        assert_eq!(t.resolve("/readyz"), Some(PublicRoute::Readiness));
        assert_eq!(
            t.resolve("/uploads/promotions/promo.pdf"),
            Some(PublicRoute::Media)
        );
        assert_eq!(t.resolve("/uploads"), None);
    }

    #[test]
    fn test_reserved_segments_follow_prefix() {
        let health = HealthPaths::default();
        assert_eq!(
            RouteTable::reserved_segments("/files", &health),
            vec!["healthz", "readyz", "files"]
        );
        assert_eq!(
            RouteTable::reserved_segments("/Media/docs/", &health),
            vec!["healthz", "readyz", "media"]
        );
    }

    #[test]
    fn test_custom_prefix_slug_is_reserved() {
        let health = HealthPaths::default();
        let reserved = RouteTable::reserved_segments("/files", &health);
        let slug = crate::routing::resolve_slug("files", &reserved);
        let t = RouteTable::build(&slug, "/files", &health);

        assert_eq!(t.resolve("/playas/"), Some(PublicRoute::Promotion));
        assert_eq!(t.resolve("/files"), None);
        assert_eq!(t.resolve("/files/promo.pdf"), Some(PublicRoute::Media));
    }

    #[test]
    fn test_match_path_rules() {
        assert!(match_path(&RouteMatch::Path("/a".to_string()), "/a"));
        assert!(!match_path(&RouteMatch::Path("/a".to_string()), "/a/"));
        assert!(match_path(&RouteMatch::Prefix("/u/".to_string()), "/u/x"));
        assert!(!match_path(&RouteMatch::Slug(String::new()), "/"));
    }
}
