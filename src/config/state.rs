// Application state module
// Holds the injected collaborators and the active public route table

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use super::types::Config;
use crate::admin::TokenRegistry;
use crate::logger;
use crate::routing::{resolve_slug, HealthPaths, RouteTable};
use crate::settings::SharedSettingsStore;
use crate::storage::{LocalStorage, MediaLibrary, SharedFileStorage};

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: SharedSettingsStore,
    pub storage: SharedFileStorage,
    pub media: MediaLibrary,
    pub tokens: TokenRegistry,
    pub health: HealthPaths,
    /// Slugs shadowed by fixed public routes
    reserved_slugs: Vec<String>,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,

    routes: RwLock<Arc<RouteTable>>,
}

impl AppState {
    /// Build state over the upload directory described by `config`
    pub fn new(config: Config, store: SharedSettingsStore) -> Self {
        let local = LocalStorage::new(config.storage_base_url(), &config.storage.upload_dir);
        let media = MediaLibrary::open(local.clone(), &config.storage.subdir);
        Self::with_collaborators(config, store, Arc::new(local), media)
    }

    /// Build state with an explicit storage collaborator
    pub fn with_collaborators(
        config: Config,
        store: SharedSettingsStore,
        storage: SharedFileStorage,
        media: MediaLibrary,
    ) -> Self {
        let health = HealthPaths::default();
        let reserved_slugs = RouteTable::reserved_segments(&config.storage.url_prefix, &health);
        let slug = resolve_slug(&store.get().slug, &reserved_slugs);
        let routes = RouteTable::build(&slug, &config.storage.url_prefix, &health);

        Self {
            cached_access_log: AtomicBool::new(config.logging.access_log),
            tokens: TokenRegistry::new(Duration::from_secs(config.admin.token_ttl_secs)),
            config,
            store,
            storage,
            media,
            health,
            reserved_slugs,
            routes: RwLock::new(Arc::new(routes)),
        }
    }

    /// Sanitize free text into a slug that no fixed route shadows
    pub fn resolve_slug(&self, input: &str) -> String {
        resolve_slug(input, &self.reserved_slugs)
    }

    /// Route table requests are currently matched against
    pub fn current_routes(&self) -> Arc<RouteTable> {
        Arc::clone(&self.routes.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Rebuild the route table from the stored slug
    ///
    /// Must run after every slug change; until then the old slug keeps routing.
    pub fn flush_routes(&self) -> Arc<RouteTable> {
        let slug = self.resolve_slug(&self.store.get().slug);
        let table = Arc::new(RouteTable::build(
            &slug,
            &self.config.storage.url_prefix,
            &self.health,
        ));
        *self.routes.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&table);
        logger::log_info(&format!("Public routes rebuilt for /{slug}"));
        table
    }
}
