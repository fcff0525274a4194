use crate::orchestration::DashboardError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::InvalidAmount(_) => AppError::BadRequest(err.to_string()),
            DashboardError::NotConnected
            | DashboardError::AddressUnresolved
            | DashboardError::SessionEnded
            | DashboardError::NoInactiveStake => AppError::Conflict(err.to_string()),
            DashboardError::AddressResolution(_) | DashboardError::Manager(_) => {
                AppError::Upstream(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParseUnitsError;
    use crate::manager::ManagerError;

    #[test]
    fn test_dashboard_error_status_mapping() {
        let cases = [
            (
                DashboardError::InvalidAmount(ParseUnitsError::InvalidNumber("abc".into())),
                StatusCode::BAD_REQUEST,
            ),
            (DashboardError::NotConnected, StatusCode::CONFLICT),
            (DashboardError::NoInactiveStake, StatusCode::CONFLICT),
            (
                DashboardError::Manager(ManagerError::RateLimited),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
