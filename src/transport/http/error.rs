use crate::app::CollectionError;
use crate::domain::ValidationErrors;
use crate::transport::http::types::ApiResponse;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors a handler can answer with. Every variant renders as an [`ApiResponse`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid JSON body: {rejection} (expected: {expected})")]
    InvalidJson {
        rejection: String,
        expected: &'static str,
    },

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),

    #[error("No route for {0}")]
    RouteNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid_json(rejection: JsonRejection, expected: &'static str) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge(rejection.body_text());
        }
        ApiError::InvalidJson {
            rejection: rejection.body_text(),
            expected,
        }
    }

    pub fn invalid_path(rejection: PathRejection) -> Self {
        ApiError::InvalidPath(rejection.body_text())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Collection(CollectionError::Validation(errors))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("response serialization failed: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Collection(CollectionError::Validation(errors)) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::failure(
                    format!("Validation failed: {}", errors),
                    Some(json!({ "errors": errors })),
                ),
            ),
            ApiError::Collection(CollectionError::Ownership { .. }) => (
                StatusCode::FORBIDDEN,
                ApiResponse::failure(self.to_string(), None),
            ),
            ApiError::Collection(CollectionError::IncompleteSet {
                missing, duplicates, ..
            }) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::failure(
                    self.to_string(),
                    Some(json!({ "missing": missing, "duplicates": duplicates })),
                ),
            ),
            ApiError::Collection(CollectionError::NotFound { .. }) => (
                StatusCode::NOT_FOUND,
                ApiResponse::failure(self.to_string(), None),
            ),
            ApiError::Collection(CollectionError::Storage(e)) => {
                error!(error = %e, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::failure("Internal storage error", None),
                )
            }
            ApiError::Unauthenticated(_) => (
                StatusCode::UNAUTHORIZED,
                ApiResponse::failure(self.to_string(), None),
            ),
            ApiError::InvalidJson { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiResponse::failure(self.to_string(), None),
            ),
            ApiError::PayloadTooLarge(_) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ApiResponse::failure(self.to_string(), None),
            ),
            ApiError::InvalidPath(_) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::failure(self.to_string(), None),
            ),
            ApiError::RouteNotFound(_) => (
                StatusCode::NOT_FOUND,
                ApiResponse::failure(self.to_string(), None),
            ),
            ApiError::Internal(message) => {
                error!(error = %message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::failure("Internal server error", None),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
