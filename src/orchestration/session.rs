use super::{Dashboard, DashboardError, DashboardState, FailureKind, RefreshReport, Shared};
use crate::domain::{Address, SessionId};
use crate::manager::PoolManager;
use crate::wallet::{AccountChange, ChainAccess, Connection, Signer, WalletProvider};
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// A live wallet connection and the manager handle bound to it.
///
/// Dropping the session stops its account-change listener and wakes every
/// in-flight query started under it.
#[derive(Debug)]
pub struct Session {
    pub(super) id: SessionId,
    pub(super) connection: Connection,
    pub(super) signer: Option<Arc<dyn Signer>>,
    pub(super) address: Option<Address>,
    pub(super) manager: Arc<dyn PoolManager>,
    pub(super) alive: watch::Sender<()>,
    _subscription: AccountSubscription,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn network(&self) -> &str {
        self.connection.network()
    }

    pub fn is_read_only(&self) -> bool {
        self.signer.is_none()
    }
}

/// Account-change listener owned by exactly one session.
#[derive(Debug)]
struct AccountSubscription {
    task: JoinHandle<()>,
}

impl AccountSubscription {
    fn spawn(
        session: SessionId,
        mut changes: broadcast::Receiver<AccountChange>,
        shared: Weak<Shared>,
    ) -> Self {
        let task = tokio::spawn(async move {
            // A lagged receiver still means the accounts changed.
            if let Err(RecvError::Closed) = changes.recv().await {
                return;
            }
            if let Some(shared) = shared.upgrade() {
                let dashboard = Dashboard { shared };
                if dashboard.end_session(session).await {
                    info!(%session, "wallet accounts changed, session reset");
                }
            }
        });
        Self { task }
    }
}

impl Drop for AccountSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Result of a successful `connect`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connected {
    pub session: SessionId,
    pub address: Address,
    pub read_only: bool,
    pub initial_refresh: RefreshReport,
}

impl Dashboard {
    /// Open a session on `provider`, replacing any existing one, then resolve
    /// the active address and run the first refresh.
    ///
    /// A provider that cannot sign still yields a read-only session. Failing
    /// to bind the pool manager or to resolve the address blocks the
    /// dashboard and is returned; neither is retried.
    pub async fn connect(
        &self,
        provider: Arc<dyn WalletProvider>,
    ) -> Result<Connected, DashboardError> {
        let connection = Connection::new(provider);
        let signer = match connection.signer() {
            Ok(signer) => Some(signer),
            Err(e) => {
                warn!(network = connection.network(), "{}, continuing read-only", e);
                None
            }
        };
        let access = match &signer {
            Some(signer) => ChainAccess::Signer(signer.clone()),
            None => ChainAccess::ReadOnly(connection.clone()),
        };

        let manager = match self.shared.factory.all_past_pools(access) {
            Ok(manager) => manager,
            Err(e) => {
                let err = DashboardError::Manager(e);
                self.raise_for(None, FailureKind::ManagerUnavailable, &err)
                    .await;
                return Err(err);
            }
        };

        let id = SessionId(self.shared.last_session_id.fetch_add(1, Ordering::SeqCst) + 1);
        let read_only = signer.is_none();

        // The listener can only act once this lock is released, by which time
        // the session it watches is the current one.
        let previous = {
            let mut state = self.write().await;
            let subscription = AccountSubscription::spawn(
                id,
                connection.subscribe_account_changes(),
                Arc::downgrade(&self.shared),
            );
            let (alive, _) = watch::channel(());
            let previous = std::mem::take(&mut *state);
            state.session = Some(Session {
                id,
                connection: connection.clone(),
                signer: signer.clone(),
                address: None,
                manager,
                alive,
                _subscription: subscription,
            });
            previous
        };
        if let Some(old) = &previous.session {
            info!(old = %old.id, new = %id, "replacing wallet session");
        }
        drop(previous);
        info!(session = %id, network = connection.network(), read_only, "wallet session opened");

        let resolved = match &signer {
            Some(signer) => signer.address().await,
            None => connection.first_account().await,
        };
        let address = match resolved {
            Ok(address) => address,
            Err(e) => {
                error!(session = %id, "address resolution failed: {}", e);
                let err = DashboardError::AddressResolution(e);
                self.raise_for(Some(id), FailureKind::AddressResolution, &err)
                    .await;
                return Err(err);
            }
        };

        {
            let mut state = self.write().await;
            match state.session.as_mut().filter(|s| s.id == id) {
                Some(session) => session.address = Some(address.clone()),
                None => return Err(DashboardError::SessionEnded),
            }
        }
        info!(session = %id, %address, "wallet address resolved");

        let initial_refresh = self.refresh_session(id).await?;
        Ok(Connected {
            session: id,
            address,
            read_only,
            initial_refresh,
        })
    }

    /// Tear down the session and clear every derived view.
    /// Returns false if there was no session.
    pub async fn disconnect(&self) -> bool {
        let previous = {
            let mut state = self.write().await;
            if state.session.is_none() {
                return false;
            }
            std::mem::take(&mut *state)
        };
        if let Some(session) = &previous.session {
            info!(session = %session.id, "wallet session closed");
        }
        true
    }

    /// Reset everything if `session` is still the live one.
    async fn end_session(&self, session: SessionId) -> bool {
        let previous: DashboardState = {
            let mut state = self.write().await;
            if !state.is_current(session) {
                return false;
            }
            std::mem::take(&mut *state)
        };
        drop(previous);
        true
    }
}
