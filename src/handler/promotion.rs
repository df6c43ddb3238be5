//! Promotion page handler
//!
//! Every hit on the active slug counts as a view, whatever the page state.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::sync::Arc;

use super::pages;
use crate::config::AppState;
use crate::error::{PromoError, PromoResult};
use crate::http;
use crate::logger;
use crate::settings::{PromotionConfig, SharedSettingsStore};
use crate::storage::FileStorage;

/// What the public page shows for the current record
#[derive(Debug)]
pub enum PromotionPage {
    Viewer { file_url: String },
    Placeholder,
    Broken(PromoError),
}

/// Decide the page state, checking the document lazily against storage
pub fn resolve_page(config: &PromotionConfig, storage: &dyn FileStorage) -> PromotionPage {
    if !config.has_file() {
        return PromotionPage::Placeholder;
    }
    match storage.url_to_path(&config.file_url) {
        Some(path) if storage.exists(&path) => PromotionPage::Viewer {
            file_url: config.file_url.clone(),
        },
        Some(path) => PromotionPage::Broken(PromoError::FileMissing(path)),
        None => PromotionPage::Broken(PromoError::FileMissing(config.file_url.clone().into())),
    }
}

/// Increment the counter on the blocking pool
///
/// The store persists synchronously and connections share one thread.
async fn record_view(store: SharedSettingsStore) -> PromoResult<PromotionConfig> {
    tokio::task::spawn_blocking(move || store.update(&mut |cfg| cfg.record_view()))
        .await
        .map_err(|e| PromoError::Store(format!("view task failed: {e}")))?
}

/// Count the view, then render viewer, placeholder or error page
pub async fn serve_promotion(state: &AppState, is_head: bool) -> Response<Full<Bytes>> {
    let config = match record_view(Arc::clone(&state.store)).await {
        Ok(cfg) => {
            logger::log_view(&cfg.slug, cfg.view_count);
            cfg
        }
        Err(e) => {
            // The visitor still gets the page; only the counter is lost
            logger::log_store_failure("recording view", &e);
            state.store.get()
        }
    };

    let site_name = &state.config.site.name;
    let html = match resolve_page(&config, state.storage.as_ref()) {
        PromotionPage::Viewer { file_url } => pages::viewer_page(site_name, &file_url),
        PromotionPage::Placeholder => pages::placeholder_page(site_name),
        PromotionPage::Broken(PromoError::FileMissing(path)) => {
            logger::log_file_missing(&path);
            pages::error_page(
                site_name,
                "El PDF no se encontró. Por favor contacta al administrador.",
            )
        }
        PromotionPage::Broken(e) => pages::error_page(site_name, &e.to_string()),
    };

    http::build_html_response(StatusCode::OK, html, is_head)
}
