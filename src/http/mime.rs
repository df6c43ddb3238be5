//! MIME type detection module
//!
//! Maps file extensions to Content-Type and validates upload file types.

/// Get MIME Content-Type based on file extension
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let ext = extension.map(str::to_ascii_lowercase);
    match ext.as_deref() {
        // Documents
        Some("pdf") => "application/pdf",

        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt") => "text/plain; charset=utf-8",
        Some("js") => "application/javascript",
        Some("json") => "application/json",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Default
        _ => "application/octet-stream",
    }
}

/// Extension and MIME type of an uploadable file name
///
/// Returns `None` for names without an extension or with a type that is
/// not allowed as an upload. Only the last extension counts, so
/// `promo.pdf.exe` is rejected.
pub fn check_filetype(file_name: &str) -> Option<(&'static str, &'static str)> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => Some(("pdf", "application/pdf")),
        "png" => Some(("png", "image/png")),
        "jpg" | "jpeg" => Some(("jpg", "image/jpeg")),
        "gif" => Some(("gif", "image/gif")),
        "webp" => Some(("webp", "image/webp")),
        "txt" => Some(("txt", "text/plain")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(get_content_type(Some("pdf")), "application/pdf");
        assert_eq!(get_content_type(Some("PDF")), "application/pdf");
        assert_eq!(get_content_type(Some("html")), "text/html; charset=utf-8");
        assert_eq!(get_content_type(Some("png")), "image/png");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), "application/octet-stream");
        assert_eq!(get_content_type(None), "application/octet-stream");
    }

    #[test]
    fn test_check_filetype() {
        assert_eq!(check_filetype("promo.pdf"), Some(("pdf", "application/pdf")));
        assert_eq!(check_filetype("PROMO.PDF"), Some(("pdf", "application/pdf")));
        assert_eq!(check_filetype("photo.JPEG"), Some(("jpg", "image/jpeg")));
        assert_eq!(check_filetype("promo.pdf.exe"), None);
        assert_eq!(check_filetype("promo"), None);
        assert_eq!(check_filetype(".pdf"), None);
    }
}
