//! Media streaming module.
//!
//! Serves stored assets over HTTP with byte-range support.
//!
//! # Routes
//!
//! - `GET /assets/{id}` - asset bytes, honouring `Range`
//! - `HEAD /assets/{id}` - the same headers without a body

mod direct;
mod store;

pub use direct::{head_asset, stream_asset, AssetByteServer, ByteStream, StreamMeta, StreamResult};
pub use store::{AssetReader, AssetStore, FsAssetStore};

use axum::{routing::get, Router};

use crate::server::AppContext;

/// Create the asset streaming router.
pub fn assets_router() -> Router<AppContext> {
    Router::new().route("/:asset_id", get(stream_asset).head(head_asset))
}
