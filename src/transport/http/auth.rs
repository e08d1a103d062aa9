//! Owner identification.
//!
//! Authentication happens upstream; the proxy forwards the authenticated user
//! id in the configured owner header (default `x-owner-id`).

use crate::domain::OwnerId;
use crate::transport::http::error::ApiError;
use crate::transport::http::types::AppState;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

/// The authenticated owner of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub OwnerId);

#[async_trait]
impl FromRequestParts<AppState> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = &state.owner_header;
        let raw = parts
            .headers
            .get(header)
            .ok_or_else(|| ApiError::Unauthenticated(format!("missing {} header", header)))?;

        let owner_id = raw
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<OwnerId>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                debug!(header = %header, "rejected malformed owner header");
                ApiError::Unauthenticated(format!("{} header is not a valid user id", header))
            })?;

        Ok(Owner(owner_id))
    }
}
