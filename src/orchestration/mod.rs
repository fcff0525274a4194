//! Connection, aggregation and action state machine.
//!
//! A `Dashboard` owns the wallet session, the derived portfolio views and the
//! blocking error state. All state sits behind one lock and is only ever
//! replaced wholesale, so readers never see positions from one refresh next
//! to a total from another, and a session reset is observed as one step.
//!
//! Async results are tagged with the session they were started under (and,
//! for refreshes, a sequence number) and are dropped at commit time if the
//! session has ended or a newer result has already been applied.

use crate::config::Config;
use crate::domain::{
    default_min_harvest, ParseUnitsError, SessionId, TokenAmount, UnderlyingHolding,
};
use crate::engine::Portfolio;
use crate::manager::{ManagerError, PoolManagerFactory};
use crate::wallet::WalletError;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::warn;

pub mod actions;
pub mod error_surface;
pub mod refresh;
pub mod session;
pub mod view;

pub use actions::{min_harvest_threshold, ActionHandle, ActionKind, ActionRecord, ActionStatus};
pub use error_surface::{ErrorState, FailureKind};
pub use refresh::{BranchOutcome, RefreshReport};
pub use session::{Connected, Session};
pub use view::{DashboardView, SessionView};

/// Tunables that come from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    /// Harvest threshold used when the user leaves the field empty.
    pub default_min_harvest: TokenAmount,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            default_min_harvest: default_min_harvest(),
        }
    }
}

impl From<&Config> for DashboardSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_min_harvest: config.default_min_harvest,
        }
    }
}

/// Application context shared by the HTTP layer and background tasks.
/// Cloning is cheap; clones share state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    factory: Arc<dyn PoolManagerFactory>,
    settings: DashboardSettings,
    state: RwLock<DashboardState>,
    last_session_id: AtomicU64,
    last_refresh_seq: AtomicU64,
}

/// Everything a session reset clears.
#[derive(Debug, Default)]
struct DashboardState {
    session: Option<Session>,
    portfolio: Portfolio,
    portfolio_seq: u64,
    underlyings: Vec<UnderlyingHolding>,
    underlyings_seq: u64,
    error: ErrorState,
    actions: Vec<ActionRecord>,
}

impl DashboardState {
    fn is_current(&self, session: SessionId) -> bool {
        self.session.as_ref().map(|s| s.id) == Some(session)
    }
}

impl Dashboard {
    pub fn new(factory: Arc<dyn PoolManagerFactory>, settings: DashboardSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                factory,
                settings,
                state: RwLock::new(DashboardState::default()),
                last_session_id: AtomicU64::new(0),
                last_refresh_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Id of the live session, if any.
    pub async fn session_id(&self) -> Option<SessionId> {
        self.shared.state.read().await.session.as_ref().map(|s| s.id)
    }

    /// Clear the blocking error. Returns false if nothing was blocking.
    pub async fn dismiss_error(&self) -> bool {
        self.shared.state.write().await.error.dismiss()
    }

    async fn write(&self) -> RwLockWriteGuard<'_, DashboardState> {
        self.shared.state.write().await
    }

    /// Raise the blocking error, unless `session` has already ended.
    async fn raise_for(&self, session: Option<SessionId>, kind: FailureKind, error: &DashboardError) {
        let mut state = self.write().await;
        if let Some(id) = session {
            if !state.is_current(id) {
                warn!(session = %id, "dropping error from ended session: {}", error);
                return;
            }
        }
        if state.error.raise(kind, error.to_string()) {
            warn!(?kind, "dashboard blocked: {}", error);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("no wallet session")]
    NotConnected,
    #[error("wallet address not resolved yet")]
    AddressUnresolved,
    #[error("session ended before the operation completed")]
    SessionEnded,
    #[error("no stake left in inactive pools")]
    NoInactiveStake,
    #[error("invalid harvest amount: {0}")]
    InvalidAmount(#[from] ParseUnitsError),
    #[error("could not resolve wallet address: {0}")]
    AddressResolution(WalletError),
    #[error("pool manager call failed: {0}")]
    Manager(#[from] ManagerError),
}
