//! Promotion settings record
//!
//! A single persisted record shared by the public handler and the admin
//! actions: the active slug, the current document and the view counter.

mod store;

pub use store::{SettingsStore, SharedSettingsStore, TomlSettingsStore};

#[cfg(test)]
pub use store::MemorySettingsStore;

use serde::{Deserialize, Serialize};

/// Slug used when none is configured or the configured one is unusable
pub const DEFAULT_SLUG: &str = "playas";

/// Display format for `last_updated`
pub const LAST_UPDATED_FORMAT: &str = "%d/%m/%Y %H:%M";

/// The persisted promotion settings
///
/// `file_url` is empty exactly when `file_id` is 0; both mean "no active file".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PromotionConfig {
    pub slug: String,
    pub file_id: u64,
    pub file_url: String,
    pub file_name: String,
    pub file_size_label: String,
    pub last_updated: String,
    pub view_count: u64,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            slug: DEFAULT_SLUG.to_string(),
            file_id: 0,
            file_url: String::new(),
            file_name: String::new(),
            file_size_label: String::new(),
            last_updated: String::new(),
            view_count: 0,
        }
    }
}

/// A validated document reference coming from the upload action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub id: u64,
    pub url: String,
    pub name: String,
    pub size_label: String,
}

impl PromotionConfig {
    pub fn has_file(&self) -> bool {
        !self.file_url.is_empty()
    }

    /// Point the record at a new document
    pub fn attach_file(&mut self, file: FileRef, updated_at: String) {
        self.file_id = file.id;
        self.file_url = file.url;
        self.file_name = file.name;
        self.file_size_label = file.size_label;
        self.last_updated = updated_at;
    }

    /// Drop the document, keeping slug and view counter
    pub fn clear_file(&mut self) {
        self.file_id = 0;
        self.file_url.clear();
        self.file_name.clear();
        self.file_size_label.clear();
        self.last_updated.clear();
    }

    pub fn record_view(&mut self) {
        self.view_count = self.view_count.saturating_add(1);
    }
}

/// Current local time formatted for `last_updated`
pub fn now_label() -> String {
    chrono::Local::now().format(LAST_UPDATED_FORMAT).to_string()
}
