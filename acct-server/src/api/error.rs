//! REST API error types
//!
//! These errors are designed to produce consistent JSON responses
//! with appropriate HTTP status codes.

use crate::oauth::OAuthError;

use acct_auth::AuthError;
use acct_db::DbError;

use std::panic::Location;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use serde::Serialize;
use thiserror::Error;

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// Inner error body with code, message, and optional field
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Field name if this is a validation error for a specific field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// API errors with associated HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    /// Validation error (400)
    #[error("Validation failed: {message} {location}")]
    Validation {
        message: String,
        field: Option<String>,
        location: ErrorLocation,
    },

    /// Duplicate unique value (409)
    #[error("Conflict: {message} {location}")]
    Conflict {
        message: String,
        location: ErrorLocation,
    },

    /// No usable session presented (401)
    #[error("Authentication required {location}")]
    Unauthorized { location: ErrorLocation },

    /// OAuth provider exchange failed (502)
    #[error("Upstream provider error: {message} {location}")]
    Upstream {
        message: String,
        location: ErrorLocation,
    },

    /// Feature not configured (503)
    #[error("Service unavailable: {message} {location}")]
    Unavailable {
        message: String,
        location: ErrorLocation,
    },

    /// Internal server error (500)
    #[error("Internal error: {message} {location}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log the error with location for debugging
        log::error!("{}", self);

        let (status, body) = match self {
            ApiError::NotFound { message, .. } => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    code: "NOT_FOUND".into(),
                    message,
                    field: None,
                },
            ),
            ApiError::Validation { message, field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "VALIDATION_ERROR".into(),
                    message,
                    field,
                },
            ),
            ApiError::Conflict { message, .. } => (
                StatusCode::CONFLICT,
                ApiErrorBody {
                    code: "CONFLICT".into(),
                    message,
                    field: None,
                },
            ),
            ApiError::Unauthorized { .. } => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody {
                    code: "AUTH_REQUIRED".into(),
                    message: "Authentication required".into(),
                    field: None,
                },
            ),
            ApiError::Upstream { message, .. } => (
                StatusCode::BAD_GATEWAY,
                ApiErrorBody {
                    code: "UPSTREAM_ERROR".into(),
                    message,
                    field: None,
                },
            ),
            ApiError::Unavailable { message, .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorBody {
                    code: "SERVICE_UNAVAILABLE".into(),
                    message,
                    field: None,
                },
            ),
            ApiError::Internal { message, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".into(),
                    message,
                    field: None,
                },
            ),
        };

        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

impl From<DbError> for ApiError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict { field, .. } => ApiError::Conflict {
                message: format!("Duplicate value for unique field '{}'", field),
                location: ErrorLocation::from(Location::caller()),
            },
            other => {
                // Backend details go to the log; the caller gets a generic
                // retryable condition.
                log::error!("Storage gateway failure: {}", other);
                ApiError::Internal {
                    message: "Storage unavailable, please try again".into(),
                    location: ErrorLocation::from(Location::caller()),
                }
            }
        }
    }
}

impl From<AuthError> for ApiError {
    #[track_caller]
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingEmail { .. } => ApiError::Validation {
                message: "Email is required".into(),
                field: Some("email".into()),
                location: ErrorLocation::from(Location::caller()),
            },
            AuthError::Store { source } => ApiError::from(source),
        }
    }
}

impl From<OAuthError> for ApiError {
    #[track_caller]
    fn from(err: OAuthError) -> Self {
        log::error!("OAuth exchange failure: {}", err);
        ApiError::Upstream {
            message: "OAuth provider exchange failed".into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
