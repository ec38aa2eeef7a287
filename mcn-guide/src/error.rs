//! HTTP error responses for mcn-guide
//!
//! Every error body has the shape `{"error": {"code", "message", ...}}`.
//! Redirects for ungranted artworks are not errors and are built by the
//! detail handler directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mcn_common::navigation::NotFound;
use mcn_common::CollaboratorFailure;
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Artwork or route absent from the catalog (404, with recovery link)
    #[error("Not found: {}", .0.requested)]
    NotFound(NotFound),

    /// Request carries no known visitor session (401)
    #[error("Visitor session required")]
    SessionRequired,

    /// Malformed request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Scan input resolves to no artwork (422)
    #[error("Invalid code: {candidate}")]
    InvalidCode { candidate: String, message: String },

    /// Unknown or finished camera scan (404)
    #[error("Scan not found: {0}")]
    ScanNotFound(String),

    /// External collaborator failed; the visitor may retry (503, or 429 for rate limits)
    #[error("Collaborator failure: {failure}")]
    Collaborator {
        failure: CollaboratorFailure,
        /// Localized notice for the visitor
        message: String,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(not_found) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": {
                        "code": "NOT_FOUND",
                        "message": not_found.message,
                        "requested": not_found.requested,
                    },
                    "recovery": not_found.recovery,
                }),
            ),
            ApiError::SessionRequired => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": {
                        "code": "SESSION_REQUIRED",
                        "message": "Create a visitor session with POST /api/session",
                    }
                }),
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": { "code": "BAD_REQUEST", "message": msg } }),
            ),
            ApiError::InvalidCode { candidate, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": {
                        "code": "INVALID_CODE",
                        "message": message,
                        "candidate": candidate,
                    }
                }),
            ),
            ApiError::ScanNotFound(scan_id) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": {
                        "code": "SCAN_NOT_FOUND",
                        "message": format!("No camera scan {}", scan_id),
                    }
                }),
            ),
            ApiError::Collaborator { failure, message } => {
                let status = match failure {
                    CollaboratorFailure::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                    _ => StatusCode::SERVICE_UNAVAILABLE,
                };
                (
                    status,
                    json!({
                        "error": {
                            "code": "COLLABORATOR_FAILURE",
                            "message": message,
                            "detail": failure.to_string(),
                            "retryable": true,
                        }
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
