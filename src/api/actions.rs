use crate::api::AppState;
use crate::error::AppError;
use crate::orchestration::{ActionHandle, ActionRecord, ActionStatus};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestRequest {
    #[serde(default)]
    pub min_harvest: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionAccepted {
    pub id: Uuid,
    #[serde(flatten)]
    pub status: ActionStatus,
}

impl From<&ActionHandle> for ActionAccepted {
    fn from(handle: &ActionHandle) -> Self {
        Self {
            id: handle.id(),
            status: handle.status(),
        }
    }
}

pub async fn harvest(
    State(state): State<AppState>,
    Json(request): Json<HarvestRequest>,
) -> Result<(StatusCode, Json<ActionAccepted>), AppError> {
    let handle = state.dashboard.harvest_all(&request.min_harvest).await?;
    Ok((StatusCode::ACCEPTED, Json(ActionAccepted::from(&handle))))
}

pub async fn exit_inactive(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ActionAccepted>), AppError> {
    let handle = state.dashboard.exit_inactive().await?;
    Ok((StatusCode::ACCEPTED, Json(ActionAccepted::from(&handle))))
}

pub async fn get_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionRecord>, AppError> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::BadRequest("Invalid action id".into()))?;
    state
        .dashboard
        .action(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("action {}", id)))
}
