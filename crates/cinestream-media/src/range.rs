//! HTTP `Range` header resolution.
//!
//! Turns an optional `Range` header into the concrete byte window to serve.
//! Supported forms:
//! - `bytes=0-499`
//! - `bytes=500-` (to end of asset)
//! - `bytes=-500` (last 500 bytes)
//!
//! An end offset past the asset is clamped rather than rejected, since clients
//! routinely over-request the final chunk.

use thiserror::Error;

/// Why a `Range` header could not be honoured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The header is syntactically unusable. Servers fall back to full content.
    #[error("malformed range header: {0}")]
    Malformed(String),

    /// The header is well formed but starts beyond the asset.
    #[error("range not satisfiable for {total} bytes")]
    NotSatisfiable { total: u64 },
}

impl From<RangeError> for cinestream_common::Error {
    fn from(e: RangeError) -> Self {
        match e {
            RangeError::Malformed(msg) => cinestream_common::Error::MalformedRange(msg),
            RangeError::NotSatisfiable { total } => {
                cinestream_common::Error::RangeNotSatisfiable { total }
            }
        }
    }
}

/// Concrete byte window to serve.
///
/// For a non-empty asset `start <= end < total` and `length == end - start + 1`.
/// An empty asset resolves to `length == 0` with `is_partial == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    /// First byte offset (inclusive).
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
    /// Number of bytes in the window.
    pub length: u64,
    /// Whether this is a 206 partial response.
    pub is_partial: bool,
}

impl ResolvedRange {
    /// The whole asset.
    pub fn full(total: u64) -> Self {
        Self {
            start: 0,
            end: total.saturating_sub(1),
            length: total,
            is_partial: false,
        }
    }

    fn partial(start: u64, end: u64) -> Self {
        Self {
            start,
            end,
            length: end - start + 1,
            is_partial: true,
        }
    }

    /// `Content-Range` header value, present only for partial windows.
    pub fn content_range(&self, total: u64) -> Option<String> {
        self.is_partial
            .then(|| format!("bytes {}-{}/{}", self.start, self.end, total))
    }
}

/// `Content-Range` value for a 416 response.
pub fn unsatisfied_content_range(total: u64) -> String {
    format!("bytes */{}", total)
}

/// Resolve an optional `Range` header against an asset of `total` bytes.
pub fn resolve(total: u64, header: Option<&str>) -> Result<ResolvedRange, RangeError> {
    let Some(header) = header else {
        return Ok(ResolvedRange::full(total));
    };

    let byte_range = header
        .trim()
        .strip_prefix("bytes=")
        .ok_or_else(|| RangeError::Malformed(format!("unsupported unit in {header:?}")))?;

    if byte_range.contains(',') {
        return Err(RangeError::Malformed("multiple ranges are not supported".into()));
    }

    let (start, end) = byte_range
        .split_once('-')
        .ok_or_else(|| RangeError::Malformed(format!("missing '-' in {header:?}")))?;
    let (start, end) = (start.trim(), end.trim());

    match (start.is_empty(), end.is_empty()) {
        (true, true) => Err(RangeError::Malformed("empty range".into())),
        // bytes=-500
        (true, false) => {
            let suffix = parse_offset(end)?;
            if suffix == 0 || total == 0 {
                return Err(RangeError::NotSatisfiable { total });
            }
            Ok(ResolvedRange::partial(total - suffix.min(total), total - 1))
        }
        // bytes=500- and bytes=0-499
        (false, _) => {
            let start = parse_offset(start)?;
            let end = if end.is_empty() {
                None
            } else {
                Some(parse_offset(end)?)
            };

            if let Some(end) = end {
                if start > end {
                    return Err(RangeError::Malformed(format!(
                        "start {start} is after end {end}"
                    )));
                }
            }
            if start >= total {
                return Err(RangeError::NotSatisfiable { total });
            }

            let last = total - 1;
            Ok(ResolvedRange::partial(start, end.unwrap_or(last).min(last)))
        }
    }
}

fn parse_offset(s: &str) -> Result<u64, RangeError> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed(format!("invalid offset {s:?}")));
    }
    s.parse()
        .map_err(|_| RangeError::Malformed(format!("offset out of range {s:?}")))
}
