use crate::app::DashboardStats;
use crate::domain::{FieldError, PersonalInfoPayload, ProjectPayload, SocialLinkPayload};
use crate::infra::Config;
use crate::storage::ImageUpload;
use crate::transport::http::handlers::{common, health, portfolio, projects, social_links};
use crate::transport::http::types::{
    ApiResponse, AppState, OrderEntry, PersonalInfoRequest, ProjectRequest, ReorderRequest,
    SocialLinkRequest,
};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        projects::list_projects_handler,
        projects::create_project_handler,
        projects::get_project_handler,
        projects::update_project_handler,
        projects::delete_project_handler,
        projects::reorder_projects_handler,
        projects::toggle_featured_handler,
        social_links::list_links_handler,
        social_links::create_link_handler,
        social_links::get_link_handler,
        social_links::update_link_handler,
        social_links::delete_link_handler,
        social_links::reorder_links_handler,
        portfolio::get_personal_info_handler,
        portfolio::save_personal_info_handler,
        portfolio::dashboard_handler,
        portfolio::public_portfolio_handler
    ),
    components(schemas(
        ApiResponse,
        ProjectRequest,
        SocialLinkRequest,
        PersonalInfoRequest,
        ReorderRequest,
        OrderEntry,
        ImageUpload,
        ProjectPayload,
        SocialLinkPayload,
        PersonalInfoPayload,
        DashboardStats,
        FieldError
    ))
)]
pub struct ApiDoc;

/// Room for the non-image fields of a project body and a `data:` URL prefix.
const JSON_HEADROOM_BYTES: usize = 64 * 1024;

/// Largest request body accepted: a base64-encoded image of `max_image_bytes`
/// plus [`JSON_HEADROOM_BYTES`].
pub fn body_limit(max_image_bytes: usize) -> usize {
    (max_image_bytes / 3 + 1)
        .saturating_mul(4)
        .saturating_add(JSON_HEADROOM_BYTES)
}

/// Builds the API router. Uploaded images under `config.upload_dir` are served at `/storage`.
pub fn create_router(app_state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/projects",
            get(projects::list_projects_handler).post(projects::create_project_handler),
        )
        .route("/projects/order", post(projects::reorder_projects_handler))
        .route(
            "/projects/:id",
            get(projects::get_project_handler)
                .put(projects::update_project_handler)
                .patch(projects::update_project_handler)
                .delete(projects::delete_project_handler),
        )
        .route(
            "/projects/:id/toggle-featured",
            patch(projects::toggle_featured_handler),
        )
        .route(
            "/social-links",
            get(social_links::list_links_handler).post(social_links::create_link_handler),
        )
        .route("/social-links/order", post(social_links::reorder_links_handler))
        .route(
            "/social-links/:id",
            get(social_links::get_link_handler)
                .put(social_links::update_link_handler)
                .patch(social_links::update_link_handler)
                .delete(social_links::delete_link_handler),
        )
        .route(
            "/personal-info",
            get(portfolio::get_personal_info_handler)
                .post(portfolio::save_personal_info_handler)
                .put(portfolio::save_personal_info_handler),
        )
        .route("/dashboard", get(portfolio::dashboard_handler))
        .route("/portfolio/:owner_id", get(portfolio::public_portfolio_handler))
        .nest_service("/storage", ServeDir::new(&config.upload_dir))
        .fallback(common::route_not_found)
        .layer(DefaultBodyLimit::max(body_limit(config.max_image_bytes)))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
