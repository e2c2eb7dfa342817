//! Asset lookup.
//!
//! The byte server never touches storage directly. It asks an [`AssetStore`]
//! to resolve an id into an [`AssetDescriptor`] and to open a seekable reader
//! over its bytes.

use async_trait::async_trait;
use cinestream_common::{
    media_extensions, mime_type_for_extension, AssetDescriptor, AssetId, Error, Result,
};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncSeek};

/// Seekable byte source of one asset.
pub trait AssetReader: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> AssetReader for T {}

/// Storage collaborator resolving asset ids.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Resolve an id. Fails with `AssetNotFound` when nothing is stored under it.
    async fn resolve(&self, id: &AssetId) -> Result<AssetDescriptor>;

    /// Open the asset's bytes for reading.
    async fn open(&self, asset: &AssetDescriptor) -> Result<Box<dyn AssetReader>>;
}

/// Assets stored as `{root}/{id}.{ext}` for a known media extension.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find the file backing `id`, with its size and extension.
    async fn locate(&self, id: &AssetId) -> Result<(PathBuf, u64, &'static str)> {
        for &ext in media_extensions() {
            let path = self.root.join(format!("{}.{}", id, ext));
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => return Ok((path, meta.len(), ext)),
                Ok(_) => continue,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::asset_not_found(id))
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn resolve(&self, id: &AssetId) -> Result<AssetDescriptor> {
        let (path, size, ext) = self.locate(id).await?;
        tracing::debug!(asset_id = %id, path = ?path, size, "Resolved asset");
        Ok(AssetDescriptor::new(
            id.clone(),
            size,
            mime_type_for_extension(ext),
        ))
    }

    async fn open(&self, asset: &AssetDescriptor) -> Result<Box<dyn AssetReader>> {
        let (path, _, _) = self.locate(&asset.id).await?;
        let file = tokio::fs::File::open(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::asset_not_found(&asset.id)
            } else {
                e.into()
            }
        })?;
        Ok(Box::new(file))
    }
}
