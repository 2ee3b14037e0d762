// src/bin/api_server.rs

use catalogue_service::infra::{config::ServiceConfig, logging, wiring};
use catalogue_service::transport;
use catalogue_service::{CatalogueService, SystemClock};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    // --- Repository Initialization ---
    let config = ServiceConfig::from_env()?;
    let handle = wiring::build_product_repo(&config.store)?;
    tracing::info!(store = handle.store_kind, "product repository ready");

    let service = CatalogueService::new(handle.repo, Arc::new(SystemClock));
    let app_state = transport::http::AppState {
        service: Arc::new(service),
        store_kind: handle.store_kind,
    };

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    tracing::info!(addr = %config.listen, "API server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
            }
        })
        .await?;

    tracing::info!("graceful shutdown complete");
    Ok(())
}
