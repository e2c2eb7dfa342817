//! Cinestream-Media: byte-range math and HLS manifest parsing
//!
//! This crate holds the protocol-level logic of the delivery pipeline. None of
//! it performs I/O, so the server and the player can share it freely.
//!
//! # Modules
//!
//! - `range` - `Range` header resolution against a known asset size
//! - `hls` - HLS master playlist parsing into quality variants
//!
//! # Range resolution
//!
//! ```
//! use cinestream_media::range::resolve;
//!
//! let range = resolve(1000, Some("bytes=200-299")).unwrap();
//! assert_eq!((range.start, range.end, range.length), (200, 299, 100));
//! assert!(range.is_partial);
//! assert_eq!(range.content_range(1000).unwrap(), "bytes 200-299/1000");
//! ```

pub mod error;
pub mod hls;
pub mod range;

pub use error::{Error, Result};
pub use hls::{MasterPlaylist, Variant};
pub use range::{RangeError, ResolvedRange};
