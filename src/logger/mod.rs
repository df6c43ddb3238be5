//! Logger module
//!
//! Thin façade over `tracing` so call sites stay one-liners, plus the
//! access log for public requests.

mod format;
mod writer;

pub use format::AccessLogEntry;

use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::PromoError;

/// Install the tracing subscriber and the access log writer
///
/// `RUST_LOG` overrides `logging.level` when set.
pub fn init(config: &Config) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
    {
        eprintln!("[WARN] tracing subscriber already set: {e}");
    }

    writer::init(config.logging.access_log_file.as_deref())
}

pub fn log_server_start(public: &SocketAddr, admin: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("{} started", config.http.server_name);
    tracing::info!("Public site: http://{public}");
    tracing::info!("Admin panel: http://{admin}");
    tracing::info!("Documents: {}", config.document_dir().display());
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.access_log_file {
        tracing::info!("Access log: {path}");
    }
    if config.admin.password.is_empty() {
        tracing::warn!("admin.password is empty, every admin request will be refused");
    }
    tracing::info!("======================================");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_info(message: &str) {
    tracing::info!("{message}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Outcome of an admin action, e.g. `[ADMIN] upload 200 PDF actualizado`
pub fn log_admin_action(action: &str, status: u16, message: &str) {
    if status < 400 {
        tracing::info!("[ADMIN] {action} {status} {message}");
    } else {
        tracing::warn!("[ADMIN] {action} {status} {message}");
    }
}

pub fn log_slug_changed(old: &str, new: &str) {
    tracing::info!("[ROUTES] slug changed /{old} -> /{new}, routes flushed");
}

pub fn log_view(slug: &str, count: u64) {
    tracing::debug!("[VIEW] /{slug} view #{count}");
}

pub fn log_file_missing(path: &Path) {
    tracing::warn!("[PROMO] configured document is missing: {}", path.display());
}

pub fn log_store_failure(context: &str, err: &PromoError) {
    tracing::error!("[STORE] {context} ({}): {err}", err.kind());
}

/// Write a formatted access log line
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    writer::write_access(&entry.format(format));
}
