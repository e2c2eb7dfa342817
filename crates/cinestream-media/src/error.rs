//! Error types for cinestream-media.

use thiserror::Error;

/// Result type for cinestream-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for cinestream-media operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The manifest text is not a usable master playlist.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// The manifest parsed but advertises no variants.
    #[error("Manifest has no variant streams")]
    EmptyManifest,
}

impl Error {
    /// Create an invalid manifest error.
    pub fn invalid_manifest(message: impl Into<String>) -> Self {
        Self::InvalidManifest(message.into())
    }
}

impl From<Error> for cinestream_common::Error {
    fn from(e: Error) -> Self {
        cinestream_common::Error::invalid_input(e.to_string())
    }
}
