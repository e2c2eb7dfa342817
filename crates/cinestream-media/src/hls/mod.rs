//! HLS manifest handling.
//!
//! Master playlists are parsed with `m3u8-rs` and mapped onto the variant
//! list the player builds its quality ladder from.

mod playlist;

pub use playlist::{MasterPlaylist, Variant};
