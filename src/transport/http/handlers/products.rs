use crate::app::UpsertError;
use crate::transport::http::handlers::common::{bad_request, internal_error, json_object, missing_fields};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[utoipa::path(
    put,
    path = "/products",
    request_body = crate::transport::http::types::UpsertProductRequest,
    responses(
        (status = 200, description = "Product saved", body = crate::domain::model::Product),
        (status = 400, description = "Missing body, missing fields or invalid field", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn upsert_product_handler(State(state): State<AppState>, raw: Bytes) -> Response {
    // Parsed regardless of content-type.
    let Some(body) = json_object(&raw) else {
        return bad_request("Request body is required").into_response();
    };

    let missing = body.as_object().map(missing_fields).unwrap_or_default();
    if !missing.is_empty() {
        return bad_request(format!("Missing required fields: {}", missing.join(", "))).into_response();
    }

    match state.service.upsert_product(&body).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(UpsertError::Invalid(err)) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::failure("Failed to upsert product").with_error(json!({
                "field": err.field.as_str(),
                "message": err.message,
            }))),
        )
            .into_response(),
        Err(UpsertError::Repo(err)) => internal_error(&err).into_response(),
    }
}

/// Same contract as `PUT /products`.
#[utoipa::path(
    post,
    path = "/products",
    request_body = crate::transport::http::types::UpsertProductRequest,
    responses(
        (status = 200, description = "Product saved", body = crate::domain::model::Product),
        (status = 400, description = "Missing body, missing fields or invalid field", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn create_product_handler(state: State<AppState>, raw: Bytes) -> Response {
    upsert_product_handler(state, raw).await
}

#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products", body = Vec<crate::domain::model::Product>),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn list_products_handler(State(state): State<AppState>) -> Response {
    match state.service.list_products().await {
        Ok(products) => Json(products).into_response(),
        Err(err) => internal_error(&err).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = crate::domain::model::Product),
        (status = 404, description = "No product with this id", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn get_product_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.service.get_product(&id).await {
        Ok(Some(product)) => Json(product).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Json(ApiResponse::failure("Product not found"))).into_response(),
        Err(err) => internal_error(&err).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 204, description = "Deleted, or was already absent"),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn delete_product_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.service.delete_product(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => internal_error(&err).into_response(),
    }
}
