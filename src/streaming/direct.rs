//! Direct streaming with HTTP range requests.
//!
//! [`AssetByteServer`] resolves the asset and the requested range, then
//! streams exactly the resolved bytes. The axum handlers at the bottom turn
//! its result into a 200/206 response.

use std::io::SeekFrom;
use std::pin::Pin;
use std::sync::Arc;

use async_stream::try_stream;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use bytes::Bytes;
use cinestream_common::{AssetDescriptor, AssetId, Error, Result};
use cinestream_media::range::{self, RangeError, ResolvedRange};
use futures::{Stream, StreamExt};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::store::{AssetReader, AssetStore};
use crate::server::{AppContext, AppError};

/// Body of a streamed response.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Resolved metadata of a byte-range request.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamMeta {
    pub asset: AssetDescriptor,
    pub range: ResolvedRange,
}

impl StreamMeta {
    pub fn status(&self) -> StatusCode {
        if self.range.is_partial {
            StatusCode::PARTIAL_CONTENT
        } else {
            StatusCode::OK
        }
    }
}

/// A resolved request with its byte stream.
pub struct StreamResult {
    pub meta: StreamMeta,
    pub body: ByteStream,
}

/// Stateless range-aware reader over an [`AssetStore`].
///
/// Every call opens its own reader, so concurrent requests for the same asset
/// never share a file position.
#[derive(Clone)]
pub struct AssetByteServer {
    store: Arc<dyn AssetStore>,
    chunk_size: usize,
}

impl AssetByteServer {
    pub fn new(store: Arc<dyn AssetStore>, chunk_size: usize) -> Self {
        Self {
            store,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Resolve the asset and range without opening the bytes.
    ///
    /// A malformed `Range` header falls back to the full content; a range
    /// starting past the end fails with `RangeNotSatisfiable`.
    pub async fn describe(
        &self,
        id: &AssetId,
        range_header: Option<&str>,
    ) -> Result<StreamMeta> {
        let asset = self.store.resolve(id).await?;
        let total = asset.total_size_bytes;

        let range = match range::resolve(total, range_header) {
            Ok(range) => range,
            Err(RangeError::Malformed(reason)) => {
                tracing::debug!(
                    asset_id = %id,
                    header = ?range_header,
                    reason = %reason,
                    "Ignoring malformed range, serving full content"
                );
                ResolvedRange::full(total)
            }
            Err(e @ RangeError::NotSatisfiable { .. }) => {
                tracing::debug!(asset_id = %id, header = ?range_header, "Range not satisfiable");
                return Err(e.into());
            }
        };

        Ok(StreamMeta { asset, range })
    }

    /// Resolve the request and open a stream of exactly `range.length` bytes.
    pub async fn serve(
        &self,
        id: &AssetId,
        range_header: Option<&str>,
    ) -> Result<StreamResult> {
        let meta = self.describe(id, range_header).await?;
        let mut reader = self.store.open(&meta.asset).await?;
        if meta.range.length > 0 {
            reader.seek(SeekFrom::Start(meta.range.start)).await?;
        }

        tracing::debug!(
            asset_id = %id,
            start = meta.range.start,
            end = meta.range.end,
            length = meta.range.length,
            partial = meta.range.is_partial,
            "Streaming asset"
        );

        let body = Box::pin(byte_stream(
            reader,
            meta.range.length,
            self.chunk_size,
            id.clone(),
        ));
        Ok(StreamResult { meta, body })
    }
}

/// Stream `length` bytes from the reader's current position.
///
/// Ends with `StreamingIo` if the reader fails or runs dry early, so the
/// transport aborts the response instead of sending a short body.
fn byte_stream(
    reader: Box<dyn AssetReader>,
    length: u64,
    chunk_size: usize,
    asset_id: AssetId,
) -> impl Stream<Item = Result<Bytes>> + Send {
    try_stream! {
        let mut chunks = ReaderStream::with_capacity(reader.take(length), chunk_size);
        let mut remaining = length;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| streaming_failure(&asset_id, remaining, e))?;
            remaining -= chunk.len() as u64;
            yield chunk;
        }

        if remaining > 0 {
            let eof = std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "asset ended before the requested range",
            );
            Err(streaming_failure(&asset_id, remaining, eof))?;
        }
    }
}

fn streaming_failure(asset_id: &AssetId, remaining: u64, source: std::io::Error) -> Error {
    tracing::error!(
        asset_id = %asset_id,
        remaining,
        error = %source,
        "Aborting response: asset read failed mid-stream"
    );
    Error::streaming(source)
}

/// `GET /assets/{id}`
pub async fn stream_asset(
    State(ctx): State<AppContext>,
    Path(asset_id): Path<String>,
    headers: HeaderMap,
) -> std::result::Result<Response, AppError> {
    let id: AssetId = asset_id.parse()?;
    let result = ctx.assets.serve(&id, range_header(&headers)).await?;
    build_response(
        &result.meta,
        ctx.config.storage.cache_max_age_secs,
        Body::from_stream(result.body),
    )
}

/// `HEAD /assets/{id}`: same headers as `GET`, no body.
pub async fn head_asset(
    State(ctx): State<AppContext>,
    Path(asset_id): Path<String>,
    headers: HeaderMap,
) -> std::result::Result<Response, AppError> {
    let id: AssetId = asset_id.parse()?;
    let meta = ctx.assets.describe(&id, range_header(&headers)).await?;
    build_response(&meta, ctx.config.storage.cache_max_age_secs, Body::empty())
}

/// A `Range` header that is not valid UTF-8 is treated like a malformed one.
fn range_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::RANGE).and_then(|h| h.to_str().ok())
}

fn build_response(
    meta: &StreamMeta,
    cache_max_age_secs: u64,
    body: Body,
) -> std::result::Result<Response, AppError> {
    let total = meta.asset.total_size_bytes;

    let mut builder = Response::builder()
        .status(meta.status())
        .header(header::CONTENT_TYPE, meta.asset.mime_type.as_str())
        .header(header::CONTENT_LENGTH, meta.range.length.to_string())
        .header(header::ACCEPT_RANGES, "bytes")
        .header(
            header::CACHE_CONTROL,
            format!("max-age={}", cache_max_age_secs),
        );
    if let Some(content_range) = meta.range.content_range(total) {
        builder = builder.header(header::CONTENT_RANGE, content_range);
    }

    builder
        .body(body)
        .map_err(|e| Error::internal(format!("failed to build response: {}", e)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::io::Cursor;

    /// In-memory store; `truncate_to` simulates an asset shrinking after lookup.
    struct MemoryStore {
        data: Vec<u8>,
        truncate_to: Option<usize>,
    }

    #[async_trait]
    impl AssetStore for MemoryStore {
        async fn resolve(&self, id: &AssetId) -> Result<AssetDescriptor> {
            if id.as_str() != "clip" {
                return Err(Error::asset_not_found(id));
            }
            Ok(AssetDescriptor::new(
                id.clone(),
                self.data.len() as u64,
                "video/mp4",
            ))
        }

        async fn open(&self, _asset: &AssetDescriptor) -> Result<Box<dyn AssetReader>> {
            let len = self.truncate_to.unwrap_or(self.data.len());
            Ok(Box::new(Cursor::new(self.data[..len].to_vec())))
        }
    }

    fn server(size: usize, truncate_to: Option<usize>) -> AssetByteServer {
        let data = (0..size).map(|i| (i % 251) as u8).collect();
        AssetByteServer::new(Arc::new(MemoryStore { data, truncate_to }), 7)
    }

    fn clip() -> AssetId {
        "clip".parse().unwrap()
    }

    async fn collect(body: ByteStream) -> Result<Vec<u8>> {
        let mut body = body;
        let mut out = Vec::new();
        while let Some(chunk) = body.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }

    #[tokio::test]
    async fn test_partial_range_streams_exact_bytes() {
        let result = server(1000, None)
            .serve(&clip(), Some("bytes=100-199"))
            .await
            .unwrap();
        assert_eq!(result.meta.status(), StatusCode::PARTIAL_CONTENT);

        let bytes = collect(result.body).await.unwrap();
        assert_eq!(bytes.len(), 100);
        assert_eq!(bytes[0], 100);
        assert_eq!(bytes[99], 199);
    }

    #[tokio::test]
    async fn test_absent_range_streams_everything() {
        let result = server(1000, None).serve(&clip(), None).await.unwrap();
        assert_eq!(result.meta.status(), StatusCode::OK);
        assert_eq!(collect(result.body).await.unwrap().len(), 1000);
    }

    #[tokio::test]
    async fn test_malformed_range_falls_back_to_full() {
        let meta = server(1000, None)
            .describe(&clip(), Some("bytes=abc-def"))
            .await
            .unwrap();
        assert!(!meta.range.is_partial);
        assert_eq!(meta.range.length, 1000);
    }

    #[tokio::test]
    async fn test_unsatisfiable_range() {
        let err = server(1000, None)
            .serve(&clip(), Some("bytes=1000-"))
            .await
            .err()
            .unwrap();
        assert_matches!(err, Error::RangeNotSatisfiable { total: 1000 });
    }

    #[tokio::test]
    async fn test_unknown_asset() {
        let err = server(10, None)
            .serve(&"other".parse().unwrap(), None)
            .await
            .err()
            .unwrap();
        assert_matches!(err, Error::AssetNotFound(_));
    }

    #[tokio::test]
    async fn test_short_read_fails_stream() {
        let result = server(1000, Some(150))
            .serve(&clip(), Some("bytes=100-199"))
            .await
            .unwrap();
        let err = collect(result.body).await.unwrap_err();
        assert_matches!(err, Error::StreamingIo { .. });
    }

    #[tokio::test]
    async fn test_empty_asset() {
        let result = server(0, None).serve(&clip(), None).await.unwrap();
        assert_eq!(result.meta.range.length, 0);
        assert!(collect(result.body).await.unwrap().is_empty());
    }
}
