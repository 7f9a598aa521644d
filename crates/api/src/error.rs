//! API error types with HTTP response mapping.

use analytics::AnalyticsError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use thiserror::Error;

const INTERNAL_MESSAGE: &str = "internal server error";

/// API-level error type that maps to HTTP responses.
///
/// Domain validation failures become 400 with their message. Everything else
/// becomes a 500 with a generic message; the details are only logged.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain logic error.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Analytics query error.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Domain(err) if err.is_validation() => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            other => {
                tracing::error!(error = %other, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
