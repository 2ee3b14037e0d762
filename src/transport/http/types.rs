use crate::app::CatalogueService;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CatalogueService>,
    /// Name of the backing document store, reported by `/health`.
    pub store_kind: &'static str,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub error: Option<JsonValue>,
}

impl ApiResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: JsonValue) -> Self {
        self.error = Some(error);
        self
    }
}

/// Body accepted by `PUT|POST /products`. Any `updatedAt` sent by the client is
/// ignored; the server stamps the record when it is saved.
#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProductRequest {
    pub id: String,
    pub name: String,
    pub quantity: u64,
    pub loan_days: u64,
    pub description: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}
