//! Unified error type for cinestream.
//!
//! Server and player failures funnel into [`Error`], which carries enough
//! context for HTTP handlers to derive a status code via [`Error::http_status`].

use std::fmt;

/// Unified error type covering the delivery and playback failure modes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No asset is registered under the requested id.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// The `Range` header could not be parsed.
    #[error("Malformed range: {0}")]
    MalformedRange(String),

    /// The requested range starts at or beyond the end of the asset.
    #[error("Range not satisfiable for asset of {total} bytes")]
    RangeNotSatisfiable {
        /// Total asset size, reported back in `Content-Range: bytes */{total}`.
        total: u64,
    },

    /// Reading the asset failed after the response was committed.
    #[error("Streaming I/O error: {source}")]
    StreamingIo {
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The primary decode pipeline rejected a play/pause/seek request.
    #[error("Playback failure: {0}")]
    PlaybackFailure(String),

    /// The preview pipeline could not attach to the asset.
    #[error("Preview pipeline unavailable: {0}")]
    PreviewAttach(String),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An I/O operation failed before any bytes were committed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::AssetNotFound(_) => 404,
            Error::MalformedRange(_) => 400,
            Error::RangeNotSatisfiable { .. } => 416,
            Error::StreamingIo { .. } => 500,
            Error::PlaybackFailure(_) => 500,
            Error::PreviewAttach(_) => 503,
            Error::InvalidInput(_) => 400,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::AssetNotFound(_) => "asset_not_found",
            Error::MalformedRange(_) => "malformed_range",
            Error::RangeNotSatisfiable { .. } => "range_not_satisfiable",
            Error::StreamingIo { .. } => "streaming_io_error",
            Error::PlaybackFailure(_) => "playback_failure",
            Error::PreviewAttach(_) => "preview_attach_failure",
            Error::InvalidInput(_) => "invalid_input",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Create a new AssetNotFound error.
    pub fn asset_not_found(id: impl fmt::Display) -> Self {
        Self::AssetNotFound(id.to_string())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new PlaybackFailure error.
    pub fn playback<S: Into<String>>(msg: S) -> Self {
        Self::PlaybackFailure(msg.into())
    }

    /// Wrap an I/O error raised while a response body was being produced.
    pub fn streaming(source: std::io::Error) -> Self {
        Self::StreamingIo { source }
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
