use super::{Dashboard, DashboardError, DashboardState, FailureKind};
use crate::domain::{
    format_units, parse_units, ParseUnitsError, SessionId, TokenAmount, REWARD_DECIMALS,
};
use crate::manager::{ManagerError, PoolManager};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

/// Most recent actions kept in the view.
const ACTION_LOG_LIMIT: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActionKind {
    Harvest { minimum: TokenAmount },
    ExitInactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ActionStatus {
    Pending,
    Succeeded,
    Failed { reason: String },
}

impl ActionStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, ActionStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub id: Uuid,
    pub kind: ActionKind,
    #[serde(flatten)]
    pub status: ActionStatus,
    pub submitted_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Caller's view of a dispatched action. The action runs whether or not the
/// handle is kept.
#[derive(Debug, Clone)]
pub struct ActionHandle {
    id: Uuid,
    status: watch::Receiver<ActionStatus>,
}

impl ActionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> ActionStatus {
        self.status.borrow().clone()
    }

    /// Wait until the action succeeds or fails.
    pub async fn wait(mut self) -> ActionStatus {
        if let Ok(status) = self.status.wait_for(ActionStatus::is_finished).await {
            return status.clone();
        }
        let status = self.status.borrow().clone();
        status
    }
}

/// Interpret the minimum-harvest field: an empty field means `default`,
/// anything else must be a reward-token amount with at most 18 decimals.
pub fn min_harvest_threshold(
    input: &str,
    default: TokenAmount,
) -> Result<TokenAmount, ParseUnitsError> {
    if input.is_empty() {
        return Ok(default);
    }
    parse_units(input, REWARD_DECIMALS)
}

impl Dashboard {
    /// Claim rewards from every pool holding at least the given amount.
    ///
    /// The amount is validated before anything is sent. The returned handle
    /// tracks the manager call; the portfolio is not refreshed afterwards.
    pub async fn harvest_all(&self, min_harvest: &str) -> Result<ActionHandle, DashboardError> {
        let minimum = min_harvest_threshold(min_harvest, self.shared.settings.default_min_harvest)?;
        self.dispatch(
            ActionKind::Harvest { minimum },
            |_| Ok(()),
            move |manager| async move { manager.get_rewards(minimum).await },
        )
        .await
    }

    /// Withdraw stake from every inactive pool.
    ///
    /// Refused with `NoInactiveStake` unless a displayed position still has
    /// stake in an inactive pool, checked against the same state the action
    /// is logged in.
    pub async fn exit_inactive(&self) -> Result<ActionHandle, DashboardError> {
        self.dispatch(
            ActionKind::ExitInactive,
            |state| {
                if state.portfolio.has_stranded_stake() {
                    Ok(())
                } else {
                    Err(DashboardError::NoInactiveStake)
                }
            },
            |manager| async move { manager.exit_inactive().await },
        )
        .await
    }

    /// Look up a logged action.
    pub async fn action(&self, id: Uuid) -> Option<ActionRecord> {
        let state = self.shared.state.read().await;
        state.actions.iter().find(|a| a.id == id).cloned()
    }

    async fn dispatch<P, C, F>(
        &self,
        kind: ActionKind,
        precondition: P,
        call: C,
    ) -> Result<ActionHandle, DashboardError>
    where
        P: FnOnce(&DashboardState) -> Result<(), DashboardError>,
        C: FnOnce(Arc<dyn PoolManager>) -> F,
        F: Future<Output = Result<(), ManagerError>> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let (tx, rx) = watch::channel(ActionStatus::Pending);
        let (session, manager) = {
            let mut state = self.write().await;
            let target = state
                .session
                .as_ref()
                .map(|s| (s.id, s.manager.clone()))
                .ok_or(DashboardError::NotConnected)?;
            precondition(&*state)?;
            if state.actions.len() >= ACTION_LOG_LIMIT {
                state.actions.remove(0);
            }
            state.actions.push(ActionRecord {
                id,
                kind: kind.clone(),
                status: ActionStatus::Pending,
                submitted_at: Utc::now(),
                completed_at: None,
            });
            target
        };
        match &kind {
            ActionKind::Harvest { minimum } => {
                info!(%session, %id, minimum = %format_units(*minimum, REWARD_DECIMALS), "harvesting all pools")
            }
            ActionKind::ExitInactive => info!(%session, %id, "exiting inactive pools"),
        }

        let call = call(manager);
        let dashboard = self.clone();
        tokio::spawn(async move {
            let result = call.await;
            let status = match &result {
                Ok(()) => ActionStatus::Succeeded,
                Err(e) => ActionStatus::Failed {
                    reason: e.to_string(),
                },
            };
            dashboard.finish_action(session, id, status.clone()).await;
            if let Err(e) = result {
                warn!(%id, "action failed: {}", e);
                dashboard
                    .raise_for(Some(session), FailureKind::RemoteCall, &DashboardError::Manager(e))
                    .await;
            } else {
                info!(%id, "action succeeded");
            }
            // The caller may have dropped its handle.
            let _ = tx.send(status);
        });

        Ok(ActionHandle { id, status: rx })
    }

    async fn finish_action(&self, session: SessionId, id: Uuid, status: ActionStatus) {
        let mut state = self.write().await;
        if !state.is_current(session) {
            return;
        }
        if let Some(record) = state.actions.iter_mut().find(|a| a.id == id) {
            record.status = status;
            record.completed_at = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::default_min_harvest;

    fn units(s: &str) -> TokenAmount {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_threshold_uses_default() {
        assert_eq!(
            min_harvest_threshold("", default_min_harvest()).unwrap(),
            units("100000000000000000")
        );
    }

    #[test]
    fn test_whitespace_threshold_is_not_empty() {
        for input in ["   ", "\t", " 3 ", "3 "] {
            assert!(
                matches!(
                    min_harvest_threshold(input, default_min_harvest()),
                    Err(ParseUnitsError::InvalidNumber(_))
                ),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_threshold_parsed_in_reward_units() {
        assert_eq!(
            min_harvest_threshold("2.5", default_min_harvest()).unwrap(),
            units("2500000000000000000")
        );
        assert_eq!(
            min_harvest_threshold("100000000000", default_min_harvest()).unwrap(),
            units("100000000000000000000000000000")
        );
    }

    #[test]
    fn test_invalid_threshold_is_an_error_not_the_default() {
        assert!(matches!(
            min_harvest_threshold("abc", default_min_harvest()),
            Err(ParseUnitsError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_action_status_serialization() {
        assert_eq!(
            serde_json::to_value(ActionStatus::Failed {
                reason: "reverted".to_string()
            })
            .unwrap(),
            serde_json::json!({"status": "failed", "reason": "reverted"})
        );
        assert!(!ActionStatus::Pending.is_finished());
        assert!(ActionStatus::Succeeded.is_finished());
    }
}
