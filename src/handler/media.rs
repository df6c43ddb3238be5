//! Stored document serving
//!
//! Serves files from the upload directory under the storage URL prefix
//! with `ETag` revalidation and single-range requests. Directories are
//! never listed.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::router::RequestContext;
use crate::http::range::RangeOutcome;
use crate::http::{self, mime, response};
use crate::logger;

/// Serve the file a `/uploads/...` path points at
pub async fn serve_media(
    ctx: &RequestContext<'_>,
    upload_dir: &Path,
    url_prefix: &str,
) -> Response<Full<Bytes>> {
    let Some(path) = media_path(upload_dir, url_prefix, ctx.path) else {
        return http::build_404_response();
    };
    match load_file(upload_dir, &path).await {
        Some(data) => {
            let content_type = mime::get_content_type(path.extension().and_then(|e| e.to_str()));
            build_file_response(Bytes::from(data), content_type, ctx)
        }
        None => http::build_404_response(),
    }
}

/// Map a request path to a file below the upload directory
///
/// Rejects `..`, backslashes and dot-files (the media index, `.htaccess`).
fn media_path(upload_dir: &Path, url_prefix: &str, request_path: &str) -> Option<PathBuf> {
    let prefix = format!("/{}/", url_prefix.trim_matches('/'));
    let relative = request_path.strip_prefix(&prefix)?;

    let mut path = upload_dir.to_path_buf();
    let mut segments = 0;
    for segment in relative.split('/') {
        match segment {
            "" => {}
            s if s.starts_with('.') || s.contains('\\') => return None,
            s => {
                path.push(s);
                segments += 1;
            }
        }
    }
    (segments > 0).then_some(path)
}

async fn load_file(upload_dir: &Path, path: &Path) -> Option<Vec<u8>> {
    // File not found is common (404), no need to log at warning level
    let canonical = fs::canonicalize(path).await.ok()?;
    let base = match fs::canonicalize(upload_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Upload directory not accessible '{}': {e}",
                upload_dir.display()
            ));
            return None;
        }
    };
    if !canonical.starts_with(&base) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {}",
            canonical.display()
        ));
        return None;
    }
    if !fs::metadata(&canonical).await.ok()?.is_file() {
        return None;
    }

    match fs::read(&canonical).await {
        Ok(data) => Some(data),
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", canonical.display()));
            None
        }
    }
}

/// Strong validator for a stored document: size plus content hash
///
/// Replacing a PDF under the same name changes the tag, so viewers that
/// kept the old copy refetch it.
fn document_etag(data: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    format!("\"{:x}-{:x}\"", data.len(), hasher.finish())
}

/// `If-None-Match` check; weak tags compare equal to our strong one
fn is_not_modified(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|header| {
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
        })
    })
}

/// Build file response with `ETag` and Range support
fn build_file_response(
    data: Bytes,
    content_type: &str,
    ctx: &RequestContext<'_>,
) -> Response<Full<Bytes>> {
    let etag = document_etag(&data);
    let total_size = data.len();

    if is_not_modified(ctx.if_none_match.as_deref(), &etag) {
        return http::build_304_response(&etag);
    }

    match http::parse_range_header(ctx.range_header.as_deref(), total_size) {
        RangeOutcome::Partial(range) => response::build_partial_response(
            data.slice(range.start..=range.end),
            content_type,
            &etag,
            range.start,
            range.end,
            total_size,
            ctx.is_head,
        ),
        RangeOutcome::Unsatisfiable => http::build_416_response(total_size),
        RangeOutcome::Full => response::build_cached_response(data, content_type, &etag, ctx.is_head),
    }
}
