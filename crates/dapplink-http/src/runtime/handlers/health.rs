//! Liveness endpoint

use axum::{http::StatusCode, response::Json};
use serde_json::{Value, json};

/// GET /health - fixed liveness payload
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
