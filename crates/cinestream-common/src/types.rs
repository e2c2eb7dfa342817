//! Core value types shared by the server and the player.

use serde::{Deserialize, Serialize};

use crate::AssetId;

/// Extensions the asset store recognises, in lookup order.
const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "webm", "mkv", "mov", "ts", "m2ts", "m4a", "mp3", "flac", "wav",
];

/// Immutable description of a resolved asset.
///
/// Both decode pipelines of a player hold an `Arc` of the same descriptor;
/// nothing in it changes once the asset has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Asset identifier.
    pub id: AssetId,
    /// Total size of the byte stream.
    pub total_size_bytes: u64,
    /// Mime type sent as `Content-Type`.
    pub mime_type: String,
}

impl AssetDescriptor {
    /// Create a new descriptor.
    pub fn new(id: AssetId, total_size_bytes: u64, mime_type: impl Into<String>) -> Self {
        Self {
            id,
            total_size_bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Extensions recognised as streamable media.
pub fn media_extensions() -> &'static [&'static str] {
    MEDIA_EXTENSIONS
}

/// Determine the mime type from a file extension.
pub fn mime_type_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "ts" | "m2ts" => "video/mp2t",
        "m4a" => "audio/mp4",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        _ => "application/octet-stream",
    }
}
