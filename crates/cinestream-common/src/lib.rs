//! Cinestream-Common: Shared types, identifiers, and errors.
//!
//! This crate provides functionality used by both the asset server and the
//! player engine:
//!
//! - **Typed IDs**: [`AssetId`], a validated identifier safe to map onto storage
//! - **Core Types**: [`AssetDescriptor`] and mime-type detection by extension
//! - **Error Handling**: the unified [`Error`] taxonomy and result alias
//!
//! # Examples
//!
//! ```
//! use cinestream_common::{AssetDescriptor, AssetId, Error, Result};
//!
//! let id: AssetId = "big-buck-bunny".parse().unwrap();
//! let asset = AssetDescriptor::new(id, 1000, "video/mp4");
//! assert_eq!(asset.total_size_bytes, 1000);
//!
//! fn example() -> Result<()> {
//!     Err(Error::asset_not_found("missing"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::AssetId;
pub use types::*;
