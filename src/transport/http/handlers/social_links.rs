use crate::domain::ItemId;
use crate::transport::http::auth::Owner;
use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::{body, message, path, respond, ORDER_UPDATED};
use crate::transport::http::types::{
    reposition_index, AppState, ReorderRequest, SocialLinkRequest,
};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

const LINK_BODY: &str = r#"{"name": "...", "url": "https://...", "icon": "..."}"#;
const ORDER_BODY: &str = r#"{"items": [{"id": 1, "display_order": 0}, ...]}"#;

#[utoipa::path(
    get,
    path = "/social-links",
    params(("x-owner-id" = i64, Header, description = "Authenticated owner id")),
    responses(
        (status = 200, description = "Owner's social links in display order", body = ApiResponse),
        (status = 401, description = "Missing or invalid owner header", body = ApiResponse)
    )
)]
pub async fn list_links_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
) -> Result<Response, ApiError> {
    let links = state.social_links.list(owner_id).await?;
    respond(StatusCode::OK, &links)
}

#[utoipa::path(
    post,
    path = "/social-links",
    params(("x-owner-id" = i64, Header, description = "Authenticated owner id")),
    request_body = SocialLinkRequest,
    responses(
        (status = 201, description = "Link appended to the end of the list", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn create_link_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    request: Result<Json<SocialLinkRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = body(request, LINK_BODY)?;
    let link = state.social_links.append(owner_id, request.payload()).await?;
    respond(StatusCode::CREATED, &link)
}

#[utoipa::path(
    get,
    path = "/social-links/{id}",
    params(
        ("id" = i64, Path, description = "Social link id"),
        ("x-owner-id" = i64, Header, description = "Authenticated owner id")
    ),
    responses(
        (status = 200, description = "Social link", body = ApiResponse),
        (status = 403, description = "Link belongs to another owner", body = ApiResponse),
        (status = 404, description = "No such link", body = ApiResponse)
    )
)]
pub async fn get_link_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    id: Result<Path<ItemId>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = path(id)?;
    let link = state.social_links.get(owner_id, id).await?;
    respond(StatusCode::OK, &link)
}

#[utoipa::path(
    put,
    path = "/social-links/{id}",
    params(
        ("id" = i64, Path, description = "Social link id"),
        ("x-owner-id" = i64, Header, description = "Authenticated owner id")
    ),
    request_body = SocialLinkRequest,
    responses(
        (status = 200, description = "Link updated", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 403, description = "Link belongs to another owner", body = ApiResponse),
        (status = 404, description = "No such link", body = ApiResponse)
    )
)]
pub async fn update_link_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    id: Result<Path<ItemId>, PathRejection>,
    request: Result<Json<SocialLinkRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = path(id)?;
    let request = body(request, LINK_BODY)?;
    let reposition = reposition_index(request.display_order)?;
    let link = state
        .social_links
        .replace_payload(owner_id, id, request.payload(), reposition)
        .await?;
    respond(StatusCode::OK, &link)
}

#[utoipa::path(
    delete,
    path = "/social-links/{id}",
    params(
        ("id" = i64, Path, description = "Social link id"),
        ("x-owner-id" = i64, Header, description = "Authenticated owner id")
    ),
    responses(
        (status = 200, description = "Link deleted", body = ApiResponse),
        (status = 403, description = "Link belongs to another owner", body = ApiResponse),
        (status = 404, description = "No such link", body = ApiResponse)
    )
)]
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    id: Result<Path<ItemId>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = path(id)?;
    state.social_links.delete(owner_id, id).await?;
    message("Social link deleted successfully")
}

#[utoipa::path(
    post,
    path = "/social-links/order",
    params(("x-owner-id" = i64, Header, description = "Authenticated owner id")),
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Display order updated", body = ApiResponse),
        (status = 400, description = "Ids do not match the owner's links exactly", body = ApiResponse),
        (status = 403, description = "An id belongs to another owner", body = ApiResponse),
        (status = 404, description = "An id does not exist", body = ApiResponse)
    )
)]
pub async fn reorder_links_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    request: Result<Json<ReorderRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = body(request, ORDER_BODY)?;
    let ordered_ids = request.ordered_ids()?;
    state.social_links.reorder(owner_id, &ordered_ids).await?;
    message(ORDER_UPDATED)
}
