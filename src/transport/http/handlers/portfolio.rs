//! Personal info, the owner dashboard and the public portfolio read model.

use crate::domain::{OwnerId, PersonalInfoPayload};
use crate::transport::http::auth::Owner;
use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::{body, path, respond};
use crate::transport::http::types::{AppState, PersonalInfoRequest};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

const PERSONAL_INFO_BODY: &str =
    r#"{"name", "title", "description", "about_content", "email", "phone"}"#;

#[utoipa::path(
    get,
    path = "/personal-info",
    params(("x-owner-id" = i64, Header, description = "Authenticated owner id")),
    responses(
        (status = 200, description = "Personal info, `data: null` when not set yet", body = ApiResponse)
    )
)]
pub async fn get_personal_info_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
) -> Result<Response, ApiError> {
    let info = state.portfolio.personal_info(owner_id).await?;
    respond(StatusCode::OK, &info)
}

#[utoipa::path(
    put,
    path = "/personal-info",
    params(("x-owner-id" = i64, Header, description = "Authenticated owner id")),
    request_body = PersonalInfoRequest,
    responses(
        (status = 200, description = "Personal info saved", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn save_personal_info_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    request: Result<Json<PersonalInfoRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let details: PersonalInfoPayload = body(request, PERSONAL_INFO_BODY)?.into();
    let info = state.portfolio.save_personal_info(owner_id, details).await?;
    respond(StatusCode::OK, &info)
}

#[utoipa::path(
    get,
    path = "/dashboard",
    params(("x-owner-id" = i64, Header, description = "Authenticated owner id")),
    responses(
        (status = 200, description = "Personal info, projects, social links and counts", body = ApiResponse)
    )
)]
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
) -> Result<Response, ApiError> {
    let dashboard = state.portfolio.dashboard(owner_id).await?;
    respond(StatusCode::OK, &dashboard)
}

#[utoipa::path(
    get,
    path = "/portfolio/{owner_id}",
    params(("owner_id" = i64, Path, description = "Owner whose portfolio to render")),
    responses(
        (status = 200, description = "Public portfolio content in display order", body = ApiResponse)
    )
)]
pub async fn public_portfolio_handler(
    State(state): State<AppState>,
    owner_id: Result<Path<OwnerId>, PathRejection>,
) -> Result<Response, ApiError> {
    let owner_id = path(owner_id)?;
    let portfolio = state.portfolio.public_portfolio(owner_id).await?;
    respond(StatusCode::OK, &portfolio)
}
