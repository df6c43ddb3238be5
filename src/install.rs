//! Install steps run once per start, before the listeners bind
//!
//! Idempotent: an existing record, directory or `.htaccess` is left alone.

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::PromoResult;
use crate::logger;
use crate::settings::{PromotionConfig, SettingsStore};

const HTACCESS: &str = "Options -Indexes\n";

/// Prepare the document directory and seed the settings record
pub fn run(config: &Config, store: &dyn SettingsStore) -> PromoResult<()> {
    prepare_document_dir(&config.document_dir())?;

    if !store.is_initialized() {
        store.set(&PromotionConfig::default())?;
        logger::log_info("Seeded default promotion settings");
    }

    let version = env!("CARGO_PKG_VERSION");
    match store.installed_version() {
        Some(previous) if previous != version => {
            logger::log_info(&format!("Upgrading install from {previous} to {version}"));
        }
        None => logger::log_info(&format!("Fresh install of version {version}")),
        Some(_) => {}
    }
    store.set_installed_version(version)
}

/// Create the directory with listing disabled for servers that honour `.htaccess`
fn prepare_document_dir(dir: &Path) -> PromoResult<()> {
    fs::create_dir_all(dir)?;
    let htaccess = dir.join(".htaccess");
    if !htaccess.exists() {
        fs::write(&htaccess, HTACCESS)?;
    }
    Ok(())
}
