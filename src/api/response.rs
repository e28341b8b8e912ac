// API response utility functions module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::ApiError;
use crate::http;
use crate::logger;

pub type ApiResult = Result<Response<Full<Bytes>>, ApiError>;

/// 200 with the serialized record
#[allow(clippy::unnecessary_wraps)]
pub fn ok<T: Serialize>(body: &T) -> ApiResult {
    Ok(http::json_response(StatusCode::OK, body))
}

/// 201 with the newly stored record
#[allow(clippy::unnecessary_wraps)]
pub fn created<T: Serialize>(body: &T) -> ApiResult {
    Ok(http::json_response(StatusCode::CREATED, body))
}

/// Render an [`ApiError`] as `{"error": ...}`
///
/// Store failures keep their cause out of the body; it goes to the log instead.
pub fn from_error(err: &ApiError) -> Response<Full<Bytes>> {
    match err {
        ApiError::Store { context, source } => logger::log_store_failure(context, source),
        ApiError::BadRequest(message) => logger::log_warning(&format!("Bad request: {message}")),
        ApiError::NotFound(_) => {}
    }
    http::error_response(err.status(), &err.to_string())
}
