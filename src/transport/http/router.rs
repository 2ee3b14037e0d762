use crate::domain::model::{Product, ProductError, ProductField};
use crate::transport::http::handlers::{health, products};
use crate::transport::http::types::{ApiResponse, AppState, HealthResponse, UpsertProductRequest};
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        products::upsert_product_handler,
        products::create_product_handler,
        products::list_products_handler,
        products::get_product_handler,
        products::delete_product_handler
    ),
    components(schemas(
        ApiResponse,
        HealthResponse,
        UpsertProductRequest,
        Product,
        ProductError,
        ProductField
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/products",
            get(products::list_products_handler)
                .put(products::upsert_product_handler)
                .post(products::create_product_handler),
        )
        .route(
            "/products/:id",
            get(products::get_product_handler).delete(products::delete_product_handler),
        )
        .with_state(app_state)
}
