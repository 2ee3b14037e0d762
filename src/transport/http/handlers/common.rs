use crate::domain::repo::RepoError;
use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value as JsonValue;

pub type HandlerError = (StatusCode, Json<ApiResponse>);

/// Fields a product body must carry, in validation order.
pub const REQUIRED_FIELDS: [&str; 5] = ["id", "name", "quantity", "loanDays", "description"];
const TEXT_FIELDS: [&str; 3] = ["id", "name", "description"];

pub fn bad_request(message: impl Into<String>) -> HandlerError {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::failure(message)))
}

/// Store and integrity failures surface as 500 with the repository message.
pub fn internal_error(err: &RepoError) -> HandlerError {
    tracing::error!(error = %err, "repository call failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::failure("Internal server error").with_error(JsonValue::String(err.to_string()))),
    )
}

/// Parses a request body that must be a JSON object. Empty, malformed and
/// non-object bodies yield `None`.
pub fn json_object(raw: &[u8]) -> Option<JsonValue> {
    serde_json::from_slice::<JsonValue>(raw)
        .ok()
        .filter(JsonValue::is_object)
}

/// Required fields that are absent, `null`, or (for text fields) an empty string.
pub fn missing_fields(body: &serde_json::Map<String, JsonValue>) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|name| match body.get(*name) {
            None | Some(JsonValue::Null) => true,
            Some(JsonValue::String(s)) => TEXT_FIELDS.contains(name) && s.is_empty(),
            Some(_) => false,
        })
        .collect()
}
