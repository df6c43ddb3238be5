//! File storage module
//!
//! The public handler only needs to know whether the document a URL points
//! at still exists; the media library writes uploaded documents.

pub mod media;

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

pub use media::{sanitize_file_name, MediaLibrary};

/// Storage collaborator used by the promotion handler
pub trait FileStorage: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Map a public file URL back to its on-disk path
    fn url_to_path(&self, url: &str) -> Option<PathBuf>;
}

pub type SharedFileStorage = Arc<dyn FileStorage>;

/// Upload directory published under a base URL
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_url: String,
    base_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(base_url: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            base_dir: base_dir.into(),
        }
    }

    #[allow(clippy::missing_const_for_fn)]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Public URL for a path relative to the base directory
    pub fn url_for(&self, relative: &Path) -> String {
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(p) => Some(p.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        format!("{}/{}", self.base_url, parts.join("/"))
    }

    /// Resolve a path relative to the base directory, rejecting traversal
    pub fn resolve_relative(&self, relative: &str) -> Option<PathBuf> {
        let relative = relative.split(['?', '#']).next().unwrap_or_default();
        let relative = relative.trim_start_matches('/');
        if relative.is_empty() {
            return None;
        }

        let mut path = self.base_dir.clone();
        for segment in relative.split('/') {
            match segment {
                "" | "." => {}
                ".." => return None,
                s if s.contains('\\') => return None,
                s => path.push(s),
            }
        }
        Some(path)
    }
}

impl FileStorage for LocalStorage {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn url_to_path(&self, url: &str) -> Option<PathBuf> {
        let idx = url.find(self.base_url.as_str())?;
        let rest = &url[idx + self.base_url.len()..];
        if !rest.starts_with('/') {
            return None;
        }
        self.resolve_relative(rest)
    }
}
