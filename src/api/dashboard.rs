use crate::api::AppState;
use crate::error::AppError;
use crate::orchestration::{DashboardView, RefreshReport};
use axum::extract::State;
use axum::Json;

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    Json(state.dashboard.view().await)
}

/// Runs both fetches to completion before answering; branch failures are
/// reported in the body and in the view's error state, not as an HTTP error.
pub async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshReport>, AppError> {
    let report = state.dashboard.refresh().await?;
    Ok(Json(report))
}

pub async fn dismiss_error(State(state): State<AppState>) -> Json<serde_json::Value> {
    let dismissed = state.dashboard.dismiss_error().await;
    Json(serde_json::json!({ "dismissed": dismissed }))
}
