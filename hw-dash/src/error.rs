//! Error types for hw-dash
//!
//! `FetchError` covers everything that can go wrong between issuing a KPI
//! request and holding its JSON body. The coordinator never propagates it:
//! a failed fetch only marks its resource unavailable. `ApiError` maps
//! failures of the HTTP surface onto status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// KPI fetch failures
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Request could not be sent or the connection dropped
    #[error("Network error: {0}")]
    Network(String),

    /// API answered with a non-success status
    #[error("API error {0}: {1}")]
    Status(u16, String),

    /// Body was not valid JSON
    #[error("Decode error: {0}")]
    Decode(String),

    /// No answer within the configured bound
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// hw-common error
    #[error("Common error: {0}")]
    Common(#[from] hw_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Common(ref err @ hw_common::Error::YearOutOfRange { .. }) => (
                StatusCode::BAD_REQUEST,
                "YEAR_OUT_OF_RANGE",
                err.to_string(),
            ),
            ApiError::Common(ref err @ hw_common::Error::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", err.to_string())
            }
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
