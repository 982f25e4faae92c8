use axum::Json;

/// GET /healthz — liveness probe. Never touches the remote API.
pub async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
