//! HLS master playlist structures.

use crate::error::{Error, Result};

/// One bitrate/resolution rendition advertised by a master playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    /// Peak bandwidth in bits per second.
    pub bandwidth: u32,
    /// Video resolution as `(width, height)`.
    pub resolution: Option<(u32, u32)>,
    /// Codec string (e.g., "avc1.64001f,mp4a.40.2").
    pub codecs: Option<String>,
    /// Frame rate.
    pub frame_rate: Option<f64>,
    /// Media playlist URI, as written in the manifest.
    pub uri: String,
}

impl Variant {
    /// Vertical resolution, if advertised.
    pub fn height(&self) -> Option<u32> {
        self.resolution.map(|(_, h)| h)
    }

    fn from_stream(stream: m3u8_rs::VariantStream) -> Result<Self> {
        let uri = stream.uri.trim();
        if uri.is_empty() || uri.starts_with('#') {
            return Err(Error::invalid_manifest("stream without URI"));
        }

        let bandwidth = u32::try_from(stream.bandwidth).map_err(|_| {
            Error::invalid_manifest(format!("BANDWIDTH {} out of range", stream.bandwidth))
        })?;
        let resolution = match stream.resolution {
            Some(r) => Some(
                u32::try_from(r.width)
                    .ok()
                    .zip(u32::try_from(r.height).ok())
                    .ok_or_else(|| {
                        Error::invalid_manifest(format!(
                            "RESOLUTION {}x{} out of range",
                            r.width, r.height
                        ))
                    })?,
            ),
            None => None,
        };

        Ok(Self {
            bandwidth,
            resolution,
            codecs: stream.codecs,
            frame_rate: stream.frame_rate,
            uri: uri.to_string(),
        })
    }
}

/// Master playlist with multiple renditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterPlaylist {
    /// Stream variants in manifest order. I-frame-only streams are skipped.
    pub variants: Vec<Variant>,
}

impl MasterPlaylist {
    /// Parse an M3U8 master playlist.
    pub fn parse(text: &str) -> Result<Self> {
        let playlist = m3u8_rs::parse_master_playlist_res(text.as_bytes())
            .map_err(|e| Error::invalid_manifest(format!("{:?}", e)))?;

        let variants = playlist
            .variants
            .into_iter()
            .filter(|stream| !stream.is_i_frame)
            .map(Variant::from_stream)
            .collect::<Result<Vec<_>>>()?;

        if variants.is_empty() {
            return Err(Error::EmptyManifest);
        }

        Ok(Self { variants })
    }
}
