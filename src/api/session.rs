use crate::api::AppState;
use crate::domain::Address;
use crate::error::AppError;
use crate::orchestration::Connected;
use crate::wallet::WalletProvider;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

pub async fn connect(State(state): State<AppState>) -> Result<Json<Connected>, AppError> {
    let provider: Arc<dyn WalletProvider> = Arc::new(state.wallet.clone());
    let connected = state.dashboard.connect(provider).await?;
    Ok(Json(connected))
}

pub async fn disconnect(State(state): State<AppState>) -> Json<serde_json::Value> {
    let disconnected = state.dashboard.disconnect().await;
    Json(serde_json::json!({ "disconnected": disconnected }))
}

#[derive(Debug, Deserialize)]
pub struct SwitchAccountRequest {
    pub address: Option<String>,
}

/// Switch the wallet's active account. Any live session is reset by its
/// account-change listener, exactly as for an externally initiated switch.
pub async fn switch_account(
    State(state): State<AppState>,
    Json(request): Json<SwitchAccountRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let account = request
        .address
        .as_deref()
        .map(Address::from_str)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    state.wallet.switch_account(account.clone());
    Ok(Json(serde_json::json!({ "account": account })))
}
