use super::{ActionRecord, Dashboard, ErrorState};
use crate::domain::{Address, Decimal, PoolPosition, SessionId, UnderlyingHolding};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: SessionId,
    pub network: String,
    pub address: Option<Address>,
    pub read_only: bool,
}

/// Read-only snapshot handed to the rendering layer, taken under a single
/// read lock so every field belongs to the same moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub session: Option<SessionView>,
    pub positions: Vec<PoolPosition>,
    pub total_usd: Decimal,
    pub underlyings: Vec<UnderlyingHolding>,
    pub error: ErrorState,
    pub can_refresh: bool,
    pub can_harvest: bool,
    pub can_exit_inactive: bool,
    pub actions: Vec<ActionRecord>,
}

impl Dashboard {
    pub async fn view(&self) -> DashboardView {
        let state = self.shared.state.read().await;
        let session = state.session.as_ref().map(|s| SessionView {
            id: s.id(),
            network: s.network().to_string(),
            address: s.address().cloned(),
            read_only: s.is_read_only(),
        });
        let connected = session.is_some();
        let resolved = session.as_ref().is_some_and(|s| s.address.is_some());

        DashboardView {
            can_refresh: resolved,
            can_harvest: connected && !state.portfolio.positions.is_empty(),
            can_exit_inactive: connected && state.portfolio.has_stranded_stake(),
            session,
            positions: state.portfolio.positions.clone(),
            total_usd: state.portfolio.total_usd,
            underlyings: state.underlyings.clone(),
            error: state.error.clone(),
            actions: state.actions.clone(),
        }
    }
}
