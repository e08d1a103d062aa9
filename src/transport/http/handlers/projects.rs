use crate::domain::ItemId;
use crate::transport::http::auth::Owner;
use crate::transport::http::error::ApiError;
use crate::transport::http::handlers::common::{body, message, path, respond, ORDER_UPDATED};
use crate::transport::http::types::{
    reposition_index, AppState, ProjectRequest, ReorderRequest,
};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

const PROJECT_BODY: &str = r#"{"title": "...", "description": "...", "tags": [...]}"#;
const ORDER_BODY: &str = r#"{"items": [{"id": 1, "display_order": 0}, ...]}"#;

#[utoipa::path(
    get,
    path = "/projects",
    params(("x-owner-id" = i64, Header, description = "Authenticated owner id")),
    responses(
        (status = 200, description = "Owner's projects in display order", body = ApiResponse),
        (status = 401, description = "Missing or invalid owner header", body = ApiResponse)
    )
)]
pub async fn list_projects_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
) -> Result<Response, ApiError> {
    let projects = state.projects.manager().list(owner_id).await?;
    respond(StatusCode::OK, &projects)
}

#[utoipa::path(
    post,
    path = "/projects",
    params(("x-owner-id" = i64, Header, description = "Authenticated owner id")),
    request_body = ProjectRequest,
    responses(
        (status = 201, description = "Project appended to the end of the list", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 401, description = "Missing or invalid owner header", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn create_project_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    request: Result<Json<ProjectRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = body(request, PROJECT_BODY)?;
    let payload = request.payload();
    let project = state
        .projects
        .create(owner_id, payload, request.image)
        .await?;
    respond(StatusCode::CREATED, &project)
}

#[utoipa::path(
    get,
    path = "/projects/{id}",
    params(
        ("id" = i64, Path, description = "Project id"),
        ("x-owner-id" = i64, Header, description = "Authenticated owner id")
    ),
    responses(
        (status = 200, description = "Project", body = ApiResponse),
        (status = 403, description = "Project belongs to another owner", body = ApiResponse),
        (status = 404, description = "No such project", body = ApiResponse)
    )
)]
pub async fn get_project_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    id: Result<Path<ItemId>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = path(id)?;
    let project = state.projects.manager().get(owner_id, id).await?;
    respond(StatusCode::OK, &project)
}

#[utoipa::path(
    put,
    path = "/projects/{id}",
    params(
        ("id" = i64, Path, description = "Project id"),
        ("x-owner-id" = i64, Header, description = "Authenticated owner id")
    ),
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 403, description = "Project belongs to another owner", body = ApiResponse),
        (status = 404, description = "No such project", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn update_project_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    id: Result<Path<ItemId>, PathRejection>,
    request: Result<Json<ProjectRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = path(id)?;
    let request = body(request, PROJECT_BODY)?;
    let reposition = reposition_index(request.display_order)?;
    let payload = request.payload();
    let project = state
        .projects
        .update(owner_id, id, payload, request.image_change(), reposition)
        .await?;
    respond(StatusCode::OK, &project)
}

#[utoipa::path(
    delete,
    path = "/projects/{id}",
    params(
        ("id" = i64, Path, description = "Project id"),
        ("x-owner-id" = i64, Header, description = "Authenticated owner id")
    ),
    responses(
        (status = 200, description = "Project and its image deleted", body = ApiResponse),
        (status = 403, description = "Project belongs to another owner", body = ApiResponse),
        (status = 404, description = "No such project", body = ApiResponse)
    )
)]
pub async fn delete_project_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    id: Result<Path<ItemId>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = path(id)?;
    state.projects.delete(owner_id, id).await?;
    message("Project deleted successfully")
}

#[utoipa::path(
    post,
    path = "/projects/order",
    params(("x-owner-id" = i64, Header, description = "Authenticated owner id")),
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Display order updated", body = ApiResponse),
        (status = 400, description = "Ids do not match the owner's projects exactly", body = ApiResponse),
        (status = 403, description = "An id belongs to another owner", body = ApiResponse),
        (status = 404, description = "An id does not exist", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn reorder_projects_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    request: Result<Json<ReorderRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = body(request, ORDER_BODY)?;
    let ordered_ids = request.ordered_ids()?;
    state.projects.manager().reorder(owner_id, &ordered_ids).await?;
    message(ORDER_UPDATED)
}

#[utoipa::path(
    patch,
    path = "/projects/{id}/toggle-featured",
    params(
        ("id" = i64, Path, description = "Project id"),
        ("x-owner-id" = i64, Header, description = "Authenticated owner id")
    ),
    responses(
        (status = 200, description = "Featured flag flipped", body = ApiResponse),
        (status = 403, description = "Project belongs to another owner", body = ApiResponse),
        (status = 404, description = "No such project", body = ApiResponse)
    )
)]
pub async fn toggle_featured_handler(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    id: Result<Path<ItemId>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = path(id)?;
    let project = state.projects.toggle_featured(owner_id, id).await?;
    respond(StatusCode::OK, &project)
}
