//! HTTP Range request parsing module
//!
//! Single-range `bytes=` parsing (RFC 7233). Browser PDF viewers fetch
//! documents in chunks, so stored files must answer 206.

/// Inclusive byte range, already clamped to the file size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

/// What the response should carry for a given Range header
#[derive(Debug, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No Range header or one we ignore; send the whole file
    Full,
    Partial(ByteRange),
    /// Range cannot be served - should return 416
    Unsatisfiable,
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
/// Multi-range and malformed headers fall back to a full response.
pub fn parse_range_header(range_header: Option<&str>, file_size: usize) -> RangeOutcome {
    let Some(range_set) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeOutcome::Full;
    };
    if range_set.contains(',') {
        return RangeOutcome::Full;
    }
    let Some((start_str, end_str)) = range_set.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if file_size == 0 {
        return RangeOutcome::Unsatisfiable;
    }
    let last = file_size - 1;

    // Suffix range: "-500" means last 500 bytes
    if start_str.is_empty() {
        return match end_str.parse::<usize>() {
            Ok(0) => RangeOutcome::Unsatisfiable,
            Ok(suffix) => RangeOutcome::Partial(ByteRange {
                start: file_size.saturating_sub(suffix),
                end: last,
            }),
            Err(_) => RangeOutcome::Full,
        };
    }

    let Ok(start) = start_str.parse::<usize>() else {
        return RangeOutcome::Full;
    };
    if start > last {
        return RangeOutcome::Unsatisfiable;
    }

    let end = if end_str.is_empty() {
        last
    } else {
        match end_str.parse::<usize>() {
            Ok(e) => e.min(last),
            Err(_) => return RangeOutcome::Full,
        }
    };

    if start > end {
        return RangeOutcome::Unsatisfiable;
    }
    RangeOutcome::Partial(ByteRange { start, end })
}
