//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from specific business logic.
//! Shared by the public server and the admin server.

pub mod mime;
pub mod range;
pub mod response;

use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::HeaderMap;

// Re-export commonly used types
pub use range::parse_range_header;
pub use response::{
    build_304_response, build_401_response, build_404_response, build_405_response,
    build_413_response, build_416_response, build_health_response, build_html_response,
    build_options_response,
};

/// Boxed body error accepted by [`read_body`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Declared `Content-Length`, if present and numeric
pub fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(hyper::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// First value of a header as a string
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Collect a request body, refusing anything larger than `limit` bytes
///
/// Returns `None` when the body is too large or cannot be read.
pub async fn read_body<B>(body: B, limit: u64) -> Option<Bytes>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let limited = http_body_util::Limited::new(body, usize::try_from(limit).unwrap_or(usize::MAX));
    match limited.collect().await {
        Ok(collected) => Some(collected.to_bytes()),
        Err(e) => {
            crate::logger::log_warning(&format!("Failed to read request body: {e}"));
            None
        }
    }
}

/// Parse an `application/x-www-form-urlencoded` body or query string
pub fn parse_form(input: &[u8]) -> std::collections::HashMap<String, String> {
    url::form_urlencoded::parse(input).into_owned().collect()
}
