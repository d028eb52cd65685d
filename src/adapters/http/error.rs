//! Shared HTTP error payload and status mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};

/// JSON error body returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    /// Builds the body for a domain error.
    pub fn from_domain(err: &DomainError) -> Self {
        Self {
            error: err.message.clone(),
            code: err.code.to_string(),
        }
    }
}

/// Maps a domain error onto an HTTP response.
pub fn domain_error_response(err: DomainError) -> Response {
    let status = match err.code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::ProviderUnavailable => StatusCode::BAD_GATEWAY,
        ErrorCode::DatabaseError
        | ErrorCode::AccessibilityError
        | ErrorCode::ImageProcessingError
        | ErrorCode::UnexpectedError => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse::from_domain(&err))).into_response()
}
