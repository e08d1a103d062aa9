// src/bin/api_server.rs

use portfolio_cms::infra::{telemetry, Config, StorageBackend};
use portfolio_cms::storage::{ItemStore, MemoryItemStore, PostgresItemStore};
use portfolio_cms::transport;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init();

    let config = Config::from_env()?;

    // --- Store Initialization ---
    let store: Arc<dyn ItemStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
            info!(max_connections = config.db_max_connections, "connecting to Postgres");
            let store = PostgresItemStore::connect(url, config.db_max_connections).await?;
            store.ensure_schema().await?;
            info!("schema ready");
            Arc::new(store)
        }
        StorageBackend::Memory => {
            warn!("using the in-memory store; data is lost on shutdown");
            Arc::new(MemoryItemStore::new())
        }
    };

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!(upload_dir = %config.upload_dir.display(), "serving uploads under /storage");

    // --- API Server Initialization ---
    let app_state = transport::http::AppState::new(store, &config)?;
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state, &config)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "API server listening");
    info!("Swagger UI available at /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    info!("graceful shutdown complete");
    Ok(())
}
