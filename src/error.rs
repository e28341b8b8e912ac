//! Error types for the marketplace service

use hyper::StatusCode;
use thiserror::Error;

/// Failures raised by a key-value backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key encoding: {0}")]
    KeyEncoding(#[from] std::string::FromUtf8Error),
}

/// Request-level failure, mapped onto an HTTP status and an `{error}` body
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(&'static str),

    /// Any store failure surfaces as a generic per-operation message
    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Adapter for `map_err` that tags a store error with the client-facing message
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { context, source }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::bad_request("gigId required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("Gig not found").status(),
            StatusCode::NOT_FOUND
        );

        let json_err = serde_json::from_str::<u32>("x").unwrap_err();
        let err = ApiError::store("Failed to fetch gigs")(StoreError::Json(json_err));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The underlying cause never leaks into the message
        assert_eq!(err.to_string(), "Failed to fetch gigs");
    }
}
