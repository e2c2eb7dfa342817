//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which owns a temporary assets directory and an
//! [`AppContext`] serving from it. Requests go through the router in-process
//! with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use cinestream::config::Config;
use cinestream::server::{create_router, AppContext};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestHarness {
    pub dir: TempDir,
    pub ctx: AppContext,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Harness with a custom config. `storage.assets_dir` is replaced by the
    /// temporary directory.
    pub fn with_config(mut config: Config) -> Self {
        let dir = tempfile::tempdir().expect("failed to create assets dir");
        config.storage.assets_dir = dir.path().to_path_buf();
        let ctx = AppContext::from_config(config);
        Self { dir, ctx }
    }

    /// Store an asset file and return its bytes.
    pub fn add_asset(&self, file_name: &str, size: usize) -> Vec<u8> {
        let data = pattern(size);
        std::fs::write(self.dir.path().join(file_name), &data).expect("failed to write asset");
        data
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    pub async fn get(&self, uri: &str, range: Option<&str>) -> Response<Body> {
        self.request(Method::GET, uri, range).await
    }

    pub async fn head(&self, uri: &str, range: Option<&str>) -> Response<Body> {
        self.request(Method::HEAD, uri, range).await
    }

    pub async fn request(&self, method: Method, uri: &str, range: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(range) = range {
            builder = builder.header(header::RANGE, range);
        }
        let request = builder.body(Body::empty()).unwrap();
        self.router().oneshot(request).await.unwrap()
    }
}

/// Deterministic, non-repeating-at-small-scale byte pattern.
pub fn pattern(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

pub async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.unwrap().to_bytes().to_vec()
}

pub fn header_str<'a>(response: &'a Response<Body>, name: header::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
