//! Liveness and readiness endpoints.

use axum::Json;
use serde_json::{json, Value};

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is alive"))
)]
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Readiness check endpoint.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses((status = 200, description = "Service accepts requests"))
)]
pub async fn readiness_check() -> Json<Value> {
    Json(json!({ "status": "ready" }))
}
