pub mod actions;
pub mod dashboard;
pub mod health;
pub mod session;

use crate::orchestration::Dashboard;
use crate::wallet::StaticWallet;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
    pub wallet: StaticWallet,
}

impl AppState {
    pub fn new(dashboard: Dashboard, wallet: StaticWallet) -> Self {
        Self { dashboard, wallet }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/dashboard", get(dashboard::get_dashboard))
        .route("/v1/refresh", post(dashboard::refresh))
        .route("/v1/error/dismiss", post(dashboard::dismiss_error))
        .route("/v1/session/connect", post(session::connect))
        .route("/v1/session/disconnect", post(session::disconnect))
        .route("/v1/wallet/account", post(session::switch_account))
        .route("/v1/actions/harvest", post(actions::harvest))
        .route("/v1/actions/exit-inactive", post(actions::exit_inactive))
        .route("/v1/actions/:id", get(actions::get_action))
        .layer(cors)
        .with_state(state)
}
