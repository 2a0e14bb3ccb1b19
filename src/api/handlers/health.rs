/*
 * Responsibility
 * - GET /health (疎通用, proxy / orchestrator の readiness 確認)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
