use crate::api::AppState;
use axum::extract::State;
use axum::Json;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready once the process is up; also reports whether a wallet session is live.
pub async fn ready(State(state): State<AppState>) -> Json<serde_json::Value> {
    let connected = state.dashboard.session_id().await.is_some();
    Json(serde_json::json!({"status": "ready", "connected": connected}))
}
