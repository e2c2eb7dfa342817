//! Integration tests for asset streaming routes.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use cinestream::config::Config;
use common::{body_bytes, header_str, TestHarness};
use tower::ServiceExt;

#[tokio::test]
async fn health_check() {
    let h = TestHarness::new();
    let resp = h.get("/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn full_content_without_range() {
    let h = TestHarness::new();
    let data = h.add_asset("movie.mp4", 1000);

    let resp = h.get("/assets/movie", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header_str(&resp, header::CONTENT_LENGTH), Some("1000"));
    assert_eq!(header_str(&resp, header::ACCEPT_RANGES), Some("bytes"));
    assert_eq!(header_str(&resp, header::CONTENT_TYPE), Some("video/mp4"));
    assert_eq!(header_str(&resp, header::CACHE_CONTROL), Some("max-age=3600"));
    assert!(resp.headers().get(header::CONTENT_RANGE).is_none());
    assert_eq!(body_bytes(resp.into_body()).await, data);
}

#[tokio::test]
async fn closed_range_returns_partial_content() {
    let h = TestHarness::new();
    let data = h.add_asset("movie.mp4", 1000);

    let resp = h.get("/assets/movie", Some("bytes=200-299")).await;
    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        header_str(&resp, header::CONTENT_RANGE),
        Some("bytes 200-299/1000")
    );
    assert_eq!(header_str(&resp, header::CONTENT_LENGTH), Some("100"));
    assert_eq!(body_bytes(resp.into_body()).await, &data[200..300]);
}

#[tokio::test]
async fn open_range_runs_to_end() {
    let h = TestHarness::new();
    let data = h.add_asset("movie.mp4", 1000);

    let resp = h.get("/assets/movie", Some("bytes=900-")).await;
    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        header_str(&resp, header::CONTENT_RANGE),
        Some("bytes 900-999/1000")
    );
    assert_eq!(body_bytes(resp.into_body()).await, &data[900..]);
}

#[tokio::test]
async fn overshooting_end_is_clamped() {
    let h = TestHarness::new();
    h.add_asset("movie.mp4", 1000);

    let resp = h.get("/assets/movie", Some("bytes=500-99999")).await;
    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        header_str(&resp, header::CONTENT_RANGE),
        Some("bytes 500-999/1000")
    );
    assert_eq!(header_str(&resp, header::CONTENT_LENGTH), Some("500"));
}

#[tokio::test]
async fn suffix_range_returns_tail() {
    let h = TestHarness::new();
    let data = h.add_asset("movie.mp4", 1000);

    let resp = h.get("/assets/movie", Some("bytes=-200")).await;
    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        header_str(&resp, header::CONTENT_RANGE),
        Some("bytes 800-999/1000")
    );
    assert_eq!(body_bytes(resp.into_body()).await, &data[800..]);
}

#[tokio::test]
async fn range_past_end_is_not_satisfiable() {
    let h = TestHarness::new();
    h.add_asset("movie.mp4", 1000);

    let resp = h.get("/assets/movie", Some("bytes=5000-")).await;
    assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(header_str(&resp, header::CONTENT_RANGE), Some("bytes */1000"));

    let body: serde_json::Value =
        serde_json::from_slice(&body_bytes(resp.into_body()).await).unwrap();
    assert_eq!(body["code"], "range_not_satisfiable");
}

#[tokio::test]
async fn range_starting_at_size_is_not_satisfiable() {
    let h = TestHarness::new();
    h.add_asset("movie.mp4", 1000);

    let resp = h.get("/assets/movie", Some("bytes=1000-1000")).await;
    assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
}

#[tokio::test]
async fn malformed_ranges_fall_back_to_full_content() {
    let h = TestHarness::new();
    h.add_asset("movie.mp4", 1000);

    for range in [
        "bytes=abc-def",
        "bytes=500-100",
        "items=0-10",
        "bytes=0-10,20-30",
        "bytes=-",
    ] {
        let resp = h.get("/assets/movie", Some(range)).await;
        assert_eq!(resp.status(), StatusCode::OK, "range {:?}", range);
        assert_eq!(header_str(&resp, header::CONTENT_LENGTH), Some("1000"));
        assert!(resp.headers().get(header::CONTENT_RANGE).is_none());
    }
}

#[tokio::test]
async fn consecutive_ranges_reassemble_the_asset() {
    let h = TestHarness::new();
    let data = h.add_asset("movie.webm", 10_000);

    let mut reassembled = Vec::new();
    let mut start = 0;
    while start < data.len() {
        let end = (start + 3000 - 1).min(data.len() - 1);
        let resp = h
            .get("/assets/movie", Some(&format!("bytes={}-{}", start, end)))
            .await;
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        reassembled.extend(body_bytes(resp.into_body()).await);
        start = end + 1;
    }
    assert_eq!(reassembled, data);
}

#[tokio::test]
async fn concurrent_requests_for_one_asset() {
    let h = TestHarness::new();
    let data = h.add_asset("movie.mp4", 4096);

    let (a, b) = tokio::join!(
        h.get("/assets/movie", Some("bytes=0-1023")),
        h.get("/assets/movie", Some("bytes=3072-")),
    );
    let (a, b) = tokio::join!(body_bytes(a.into_body()), body_bytes(b.into_body()));
    assert_eq!(a, &data[..1024]);
    assert_eq!(b, &data[3072..]);
}

#[tokio::test]
async fn unknown_asset_is_not_found() {
    let h = TestHarness::new();
    let resp = h.get("/assets/missing", Some("bytes=0-10")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value =
        serde_json::from_slice(&body_bytes(resp.into_body()).await).unwrap();
    assert_eq!(body["code"], "asset_not_found");
}

#[tokio::test]
async fn invalid_asset_id_is_rejected() {
    let h = TestHarness::new();
    h.add_asset("movie.mp4", 10);
    let resp = h.get("/assets/..movie", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_asset_serves_zero_bytes() {
    let h = TestHarness::new();
    h.add_asset("blank.mp4", 0);

    let resp = h.get("/assets/blank", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header_str(&resp, header::CONTENT_LENGTH), Some("0"));
    assert!(body_bytes(resp.into_body()).await.is_empty());

    let resp = h.get("/assets/blank", Some("bytes=0-")).await;
    assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(header_str(&resp, header::CONTENT_RANGE), Some("bytes */0"));
}

#[tokio::test]
async fn head_returns_headers_only() {
    let h = TestHarness::new();
    h.add_asset("song.mp3", 1000);

    let resp = h.head("/assets/song", Some("bytes=0-99")).await;
    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&resp, header::CONTENT_TYPE), Some("audio/mpeg"));
    assert_eq!(header_str(&resp, header::CONTENT_LENGTH), Some("100"));
    assert_eq!(
        header_str(&resp, header::CONTENT_RANGE),
        Some("bytes 0-99/1000")
    );
    assert!(body_bytes(resp.into_body()).await.is_empty());
}

#[tokio::test]
async fn cache_max_age_follows_config() {
    let mut config = Config::default();
    config.storage.cache_max_age_secs = 60;
    let h = TestHarness::with_config(config);
    h.add_asset("movie.mp4", 10);

    let resp = h.get("/assets/movie", None).await;
    assert_eq!(header_str(&resp, header::CACHE_CONTROL), Some("max-age=60"));
}

#[tokio::test]
async fn small_chunk_size_streams_identical_bytes() {
    let mut config = Config::default();
    config.storage.chunk_size = 7;
    let h = TestHarness::with_config(config);
    let data = h.add_asset("movie.mp4", 1000);

    let resp = h.get("/assets/movie", Some("bytes=3-996")).await;
    assert_eq!(body_bytes(resp.into_body()).await, &data[3..997]);
}

#[tokio::test]
async fn cors_exposes_range_headers() {
    let h = TestHarness::new();
    h.add_asset("movie.mp4", 1000);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/assets/movie")
        .header(header::ORIGIN, "https://player.example.com")
        .header(header::RANGE, "bytes=0-9")
        .body(Body::empty())
        .unwrap();
    let resp = h.router().oneshot(request).await.unwrap();

    assert_eq!(
        header_str(&resp, header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some("*")
    );
    let exposed = header_str(&resp, header::ACCESS_CONTROL_EXPOSE_HEADERS)
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("content-range"));
    assert!(exposed.contains("accept-ranges"));
}

#[tokio::test]
async fn cors_can_be_disabled() {
    let mut config = Config::default();
    config.server.cors.enabled = false;
    let h = TestHarness::with_config(config);
    h.add_asset("movie.mp4", 10);

    let request = Request::builder()
        .uri("/assets/movie")
        .header(header::ORIGIN, "https://player.example.com")
        .body(Body::empty())
        .unwrap();
    let resp = h.router().oneshot(request).await.unwrap();
    assert!(resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
