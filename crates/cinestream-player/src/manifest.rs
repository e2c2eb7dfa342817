//! Quality ladder of a segmented, multi-bitrate stream.

use cinestream_media::{MasterPlaylist, Variant};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Requested or confirmed quality.
///
/// `Level` holds the variant index as the pipeline knows it (manifest order),
/// not a position in the deduplicated menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualitySelection {
    /// Let the adaptive algorithm choose.
    #[default]
    Auto,
    Level(usize),
}

impl fmt::Display for QualitySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Level(i) => write!(f, "level {}", i),
        }
    }
}

/// One entry of the quality menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityLevel {
    pub selection: QualitySelection,
    pub label: String,
    pub height_px: Option<u32>,
    pub bitrate_bps: Option<u32>,
}

impl QualityLevel {
    /// The `Auto` sentinel entry.
    pub fn auto() -> Self {
        Self {
            selection: QualitySelection::Auto,
            label: "Auto".to_string(),
            height_px: None,
            bitrate_bps: None,
        }
    }
}

/// Quality levels of one asset, deduplicated by vertical resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestModel {
    variants: Vec<Variant>,
    levels: Vec<QualityLevel>,
}

impl ManifestModel {
    /// Build the model from a parsed master playlist.
    pub fn from_playlist(playlist: MasterPlaylist) -> Self {
        Self::from_variants(playlist.variants)
    }

    /// Build the model from variant tuples in manifest order.
    ///
    /// Levels are sorted by descending height; variants sharing a height keep
    /// only the highest bitrate. Variants without a resolution are listed
    /// last, by descending bitrate.
    pub fn from_variants(variants: Vec<Variant>) -> Self {
        let mut order: Vec<usize> = (0..variants.len()).collect();
        order.sort_by(|&a, &b| {
            let (va, vb) = (&variants[a], &variants[b]);
            vb.height()
                .cmp(&va.height())
                .then(vb.bandwidth.cmp(&va.bandwidth))
                .then(a.cmp(&b))
        });

        let mut levels: Vec<QualityLevel> = Vec::with_capacity(order.len());
        for index in order {
            let variant = &variants[index];
            let height = variant.height();
            if height.is_some() && levels.iter().any(|l| l.height_px == height) {
                continue;
            }
            levels.push(QualityLevel {
                selection: QualitySelection::Level(index),
                label: label_for(variant),
                height_px: height,
                bitrate_bps: Some(variant.bandwidth),
            });
        }

        Self { variants, levels }
    }

    /// Concrete levels, best first.
    pub fn levels(&self) -> &[QualityLevel] {
        &self.levels
    }

    /// Menu entries with the `Auto` sentinel first.
    pub fn levels_with_auto(&self) -> Vec<QualityLevel> {
        std::iter::once(QualityLevel::auto())
            .chain(self.levels.iter().cloned())
            .collect()
    }

    /// Number of variants known to the pipeline.
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Whether a selection refers to a known variant.
    pub fn contains(&self, selection: QualitySelection) -> bool {
        match selection {
            QualitySelection::Auto => true,
            QualitySelection::Level(i) => i < self.variants.len(),
        }
    }
}

fn label_for(variant: &Variant) -> String {
    match variant.height() {
        Some(h) => format!("{}p", h),
        None => format!("{} kbps", variant.bandwidth / 1000),
    }
}
