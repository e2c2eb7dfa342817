//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`cinestream_common::Error`] so that route
//! handlers can return `Result<T, AppError>` and use `?` on library calls.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use cinestream_common::Error;
use cinestream_media::range::unsatisfied_content_range;
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: Error,
}

impl AppError {
    pub fn new(inner: Error) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Error {
        &self.inner
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in asset handler"
            );
        }

        let body = json!({
            "error": self.inner.to_string(),
            "code": self.inner.code(),
        });

        let mut response = (status, axum::Json(body)).into_response();

        if let Error::RangeNotSatisfiable { total } = &self.inner {
            if let Ok(value) = HeaderValue::from_str(&unsatisfied_content_range(*total)) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }

        response
    }
}
