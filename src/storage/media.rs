//! Media library
//!
//! Receives document bytes from the admin page, writes them into the
//! upload directory and hands back an attachment reference the upload
//! action can record.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use super::LocalStorage;
use crate::error::{PromoError, PromoResult};
use crate::http::mime;
use crate::logger;

const INDEX_FILE: &str = ".media.toml";

/// A stored document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub id: u64,
    pub url: String,
    pub filename: String,
    pub size_label: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MediaIndex {
    #[serde(default)]
    last_id: u64,
    #[serde(default)]
    attachments: Vec<Attachment>,
}

pub struct MediaLibrary {
    storage: LocalStorage,
    /// Sub-directory of the storage base dir documents go to
    subdir: PathBuf,
    index: Mutex<MediaIndex>,
}

impl MediaLibrary {
    pub fn open(storage: LocalStorage, subdir: impl Into<PathBuf>) -> Self {
        let subdir = subdir.into();
        let index_path = storage.base_dir().join(&subdir).join(INDEX_FILE);
        let index = load_index(&index_path).unwrap_or_default();
        Self {
            storage,
            subdir,
            index: Mutex::new(index),
        }
    }

    fn document_dir(&self) -> PathBuf {
        self.storage.base_dir().join(&self.subdir)
    }

    /// Store a document and register it under a fresh id
    ///
    /// Only PDF documents are accepted.
    pub async fn store(&self, original_name: &str, data: &[u8]) -> PromoResult<Attachment> {
        let filename = sanitize_file_name(original_name);
        match mime::check_filetype(&filename) {
            Some(("pdf", _)) => {}
            _ => return Err(PromoError::invalid("Solo se permiten archivos PDF")),
        }
        if data.is_empty() {
            return Err(PromoError::invalid("El archivo está vacío."));
        }

        let mut index = self.index.lock().await;

        let dir = self.document_dir();
        fs::create_dir_all(&dir).await?;
        let filename = unique_name(&dir, &filename).await;
        fs::write(dir.join(&filename), data).await?;

        let id = index.last_id + 1;
        let attachment = Attachment {
            id,
            url: self.storage.url_for(&self.subdir.join(&filename)),
            filename,
            size_label: human_size(data.len() as u64),
        };
        index.last_id = id;
        index.attachments.push(attachment.clone());

        let content = toml::to_string_pretty(&*index)?;
        fs::write(dir.join(INDEX_FILE), content).await?;
        drop(index);

        logger::log_info(&format!(
            "Stored attachment #{} ({}, {})",
            attachment.id, attachment.filename, attachment.size_label
        ));
        Ok(attachment)
    }
}

fn load_index(path: &Path) -> Option<MediaIndex> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(index) => Some(index),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to parse media index {}: {e}",
                path.display()
            ));
            None
        }
    }
}

/// First free name in `dir`, appending `-1`, `-2`... before the extension
async fn unique_name(dir: &Path, filename: &str) -> String {
    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    };

    let mut candidate = filename.to_string();
    let mut n = 1;
    while fs::try_exists(dir.join(&candidate)).await.unwrap_or(false) {
        candidate = match ext {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        };
        n += 1;
    }
    candidate
}

/// Reduce a client-supplied file name to `[A-Za-z0-9._-]`
pub fn sanitize_file_name(name: &str) -> String {
    // Browsers on some platforms send a full path
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let mut out = String::with_capacity(base.len());
    for c in base.trim().chars() {
        match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => out.push(c),
            c if c.is_whitespace() => {
                if !out.ends_with('-') {
                    out.push('-');
                }
            }
            _ => {}
        }
    }

    out.trim_start_matches(['.', '-']).to_string()
}

/// Human readable size, e.g. `"1.2 MB"`
#[allow(clippy::cast_precision_loss)]
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if value >= 10.0 {
        format!("{value:.0} {}", UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library(dir: &Path) -> MediaLibrary {
        MediaLibrary::open(
            LocalStorage::new("http://localhost:8080/uploads", dir),
            "promotions",
        )
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("promo.pdf"), "promo.pdf");
        assert_eq!(sanitize_file_name("Mi Promo (1).pdf"), "Mi-Promo-1.pdf");
        assert_eq!(sanitize_file_name("C:\\Users\\x\\promo.pdf"), "promo.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name(".hidden.pdf"), "hidden.pdf");
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(1_258_291), "1.2 MB");
        assert_eq!(human_size(50 * 1024 * 1024), "50 MB");
    }

    #[tokio::test]
    async fn test_store_assigns_ids_and_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library(dir.path());

        let first = lib.store("promo.pdf", b"%PDF-1.4 a").await.unwrap();
        let second = lib.store("promo.pdf", b"%PDF-1.4 b").await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.filename, "promo.pdf");
        assert_eq!(second.filename, "promo-1.pdf");
        assert_eq!(
            first.url,
            "http://localhost:8080/uploads/promotions/promo.pdf"
        );
        assert!(dir.path().join("promotions/promo-1.pdf").is_file());
    }

    #[tokio::test]
    async fn test_ids_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        lib_store(dir.path(), "a.pdf").await;
        let reopened = library(dir.path());
        let next = reopened.store("b.pdf", b"%PDF").await.unwrap();
        assert_eq!(next.id, 2);
    }

    async fn lib_store(dir: &Path, name: &str) {
        library(dir).store(name, b"%PDF").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library(dir.path());
        let err = lib.store("photo.png", b"\x89PNG").await.unwrap_err();
        assert!(matches!(err, PromoError::InvalidInput(_)));
        assert!(!dir.path().join("promotions/photo.png").exists());
    }
}
