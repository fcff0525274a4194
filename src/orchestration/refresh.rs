use super::{Dashboard, DashboardError, FailureKind};
use crate::domain::{Address, SessionId, Underlyings};
use crate::engine::{redeemable_holdings, Portfolio};
use crate::manager::{ManagerError, PoolManager};
use futures::future::join;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// What happened to one branch of a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum BranchOutcome {
    /// The result replaced the displayed collection.
    Applied { count: usize },
    /// A newer refresh had already been applied; the result was dropped.
    Superseded,
    /// The session ended while the call was in flight; the result was dropped.
    SessionEnded,
    /// The manager call failed; the previous collection stays displayed.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub seq: u64,
    pub underlyings: BranchOutcome,
    pub positions: BranchOutcome,
}

/// Everything a refresh needs, captured under the lock so the manager call
/// itself runs without holding it.
struct RefreshTicket {
    session: SessionId,
    seq: u64,
    address: Address,
    manager: Arc<dyn PoolManager>,
    alive: watch::Receiver<()>,
}

/// Resolves once the session's sender is dropped.
async fn session_closed(mut alive: watch::Receiver<()>) {
    while alive.changed().await.is_ok() {}
}

async fn unless_session_closed<T>(
    alive: &watch::Receiver<()>,
    call: impl Future<Output = T>,
) -> Option<T> {
    tokio::select! {
        result = call => Some(result),
        _ = session_closed(alive.clone()) => None,
    }
}

impl Dashboard {
    /// Re-fetch underlyings and pool summaries for the session's address.
    ///
    /// The two fetches run concurrently and each commits on its own; a
    /// failure in one does not stop the other. Overlapping refreshes are
    /// resolved per collection by sequence number: an older refresh never
    /// overwrites a newer one, whichever finishes last.
    pub async fn refresh(&self) -> Result<RefreshReport, DashboardError> {
        let ticket = self.ticket(None).await?;
        Ok(self.run_refresh(ticket).await)
    }

    /// Refresh only if `session` is still the live one.
    pub(super) async fn refresh_session(
        &self,
        session: SessionId,
    ) -> Result<RefreshReport, DashboardError> {
        let ticket = self.ticket(Some(session)).await?;
        Ok(self.run_refresh(ticket).await)
    }

    async fn ticket(&self, expected: Option<SessionId>) -> Result<RefreshTicket, DashboardError> {
        let state = self.shared.state.read().await;
        let session = match (&state.session, expected) {
            (None, None) => return Err(DashboardError::NotConnected),
            (None, Some(_)) => return Err(DashboardError::SessionEnded),
            (Some(s), Some(id)) if s.id != id => return Err(DashboardError::SessionEnded),
            (Some(s), _) => s,
        };
        let address = session
            .address
            .clone()
            .ok_or(DashboardError::AddressUnresolved)?;
        Ok(RefreshTicket {
            session: session.id,
            seq: self.shared.last_refresh_seq.fetch_add(1, Ordering::SeqCst) + 1,
            address,
            manager: session.manager.clone(),
            alive: session.alive.subscribe(),
        })
    }

    async fn run_refresh(&self, ticket: RefreshTicket) -> RefreshReport {
        info!(session = %ticket.session, seq = ticket.seq, address = %ticket.address, "refreshing");

        let underlyings = async {
            let fetched = unless_session_closed(
                &ticket.alive,
                ticket.manager.aggregate_underlyings(&ticket.address),
            )
            .await;
            match fetched {
                None => BranchOutcome::SessionEnded,
                Some(Ok(raw)) => self.commit_underlyings(&ticket, raw).await,
                Some(Err(e)) => self.fail_branch(&ticket, "underlyings", e).await,
            }
        };

        let positions = async {
            let fetched =
                unless_session_closed(&ticket.alive, ticket.manager.summary(&ticket.address))
                    .await;
            match fetched {
                None => BranchOutcome::SessionEnded,
                Some(Ok(raw)) => match Portfolio::from_summaries(raw) {
                    Ok(portfolio) => self.commit_portfolio(&ticket, portfolio).await,
                    Err(e) => {
                        self.fail_branch(&ticket, "summary", ManagerError::Malformed(e.to_string()))
                            .await
                    }
                },
                Some(Err(e)) => self.fail_branch(&ticket, "summary", e).await,
            }
        };

        let (underlyings, positions) = join(underlyings, positions).await;
        RefreshReport {
            seq: ticket.seq,
            underlyings,
            positions,
        }
    }

    async fn commit_underlyings(
        &self,
        ticket: &RefreshTicket,
        raw: Underlyings,
    ) -> BranchOutcome {
        let holdings = redeemable_holdings(&raw);
        let mut state = self.write().await;
        if !state.is_current(ticket.session) {
            return BranchOutcome::SessionEnded;
        }
        if ticket.seq < state.underlyings_seq {
            debug!(seq = ticket.seq, applied = state.underlyings_seq, "stale underlyings dropped");
            return BranchOutcome::Superseded;
        }
        let count = holdings.len();
        state.underlyings = holdings;
        state.underlyings_seq = ticket.seq;
        BranchOutcome::Applied { count }
    }

    async fn commit_portfolio(&self, ticket: &RefreshTicket, portfolio: Portfolio) -> BranchOutcome {
        let mut state = self.write().await;
        if !state.is_current(ticket.session) {
            return BranchOutcome::SessionEnded;
        }
        if ticket.seq < state.portfolio_seq {
            debug!(seq = ticket.seq, applied = state.portfolio_seq, "stale summaries dropped");
            return BranchOutcome::Superseded;
        }
        let count = portfolio.positions.len();
        info!(positions = count, total_usd = %portfolio.total_usd, "portfolio updated");
        state.portfolio = portfolio;
        state.portfolio_seq = ticket.seq;
        BranchOutcome::Applied { count }
    }

    async fn fail_branch(
        &self,
        ticket: &RefreshTicket,
        branch: &str,
        error: ManagerError,
    ) -> BranchOutcome {
        let err = DashboardError::Manager(error);
        debug!(seq = ticket.seq, branch, "refresh branch failed: {}", err);
        self.raise_for(Some(ticket.session), FailureKind::RemoteCall, &err)
            .await;
        BranchOutcome::Failed {
            error: err.to_string(),
        }
    }
}
