use crate::transport::http::error::ApiError;
use crate::transport::http::types::ApiResponse;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const ORDER_UPDATED: &str = "Display order updated successfully";

/// Wraps `data` in a successful envelope.
pub fn respond<T: Serialize>(status: StatusCode, data: &T) -> Result<Response, ApiError> {
    let data = serde_json::to_value(data)?;
    Ok((status, Json(ApiResponse::ok(data))).into_response())
}

pub fn message(text: &str) -> Result<Response, ApiError> {
    respond(StatusCode::OK, &serde_json::json!({ "message": text }))
}

/// Unwraps an extracted JSON body, turning a rejection into a 422.
pub fn body<T>(request: Result<Json<T>, JsonRejection>, expected: &'static str) -> Result<T, ApiError> {
    request
        .map(|Json(value)| value)
        .map_err(|e| ApiError::invalid_json(e, expected))
}

/// Unwraps an extracted path parameter, turning a rejection into a 400.
pub fn path<T>(param: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    param.map(|Path(value)| value).map_err(ApiError::invalid_path)
}

/// Router fallback: unknown routes still answer with the envelope.
pub async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::RouteNotFound(format!("{} {}", method, uri.path()))
}
