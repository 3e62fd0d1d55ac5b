//! Byte range parsing (RFC 7233, single `bytes=` range only)

/// Inclusive byte range already clamped to the content length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn content_length(self) -> usize {
        self.end - self.start + 1
    }
}

/// Outcome of looking at a Range header
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    Valid(ByteRange),
    /// Range outside the content, answer 416
    NotSatisfiable,
    /// No header, other unit, multi-range or malformed: serve everything
    None,
}

/// Parse `bytes=start-end`, `bytes=start-` or `bytes=-suffix`
///
/// ```
/// use jsxserve::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// assert_eq!(
///     parse_range_header(Some("bytes=0-99"), 1000),
///     RangeParseResult::Valid(ByteRange { start: 0, end: 99 })
/// );
/// assert_eq!(parse_range_header(None, 1000), RangeParseResult::None);
/// ```
pub fn parse_range_header(range_header: Option<&str>, total: usize) -> RangeParseResult {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::None;
    };
    if spec.contains(',') {
        return RangeParseResult::None;
    }
    let Some((first, last)) = spec.split_once('-') else {
        return RangeParseResult::None;
    };

    match (first.trim(), last.trim()) {
        ("", suffix) => suffix_range(suffix, total),
        (start, end) => bounded_range(start, end, total),
    }
}

fn suffix_range(suffix: &str, total: usize) -> RangeParseResult {
    let Ok(suffix) = suffix.parse::<usize>() else {
        return RangeParseResult::None;
    };
    if suffix == 0 || total == 0 {
        return RangeParseResult::NotSatisfiable;
    }
    RangeParseResult::Valid(ByteRange {
        start: total.saturating_sub(suffix),
        end: total - 1,
    })
}

fn bounded_range(start: &str, end: &str, total: usize) -> RangeParseResult {
    let Ok(start) = start.parse::<usize>() else {
        return RangeParseResult::None;
    };
    if start >= total {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if end.is_empty() {
        total - 1
    } else {
        match end.parse::<usize>() {
            Ok(e) if e < start => return RangeParseResult::NotSatisfiable,
            Ok(e) => e.min(total - 1),
            Err(_) => return RangeParseResult::None,
        }
    };

    RangeParseResult::Valid(ByteRange { start, end })
}
