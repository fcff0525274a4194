//! Wallet provider abstraction: connection, signer capability and account
//! change notifications.

use crate::domain::Address;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

pub mod static_wallet;

pub use static_wallet::StaticWallet;

/// Source of accounts and signing capability, usually injected by the
/// environment the dashboard runs in.
#[async_trait]
pub trait WalletProvider: Send + Sync + fmt::Debug {
    /// Name of the network the provider is connected to.
    fn network(&self) -> String;

    /// Obtain a signer for the active account.
    ///
    /// Read-only providers return `WalletError::SignerUnavailable`.
    fn signer(&self) -> Result<Arc<dyn Signer>, WalletError>;

    /// Accounts exposed by the provider, active account first.
    async fn accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Subscribe to account-change notifications.
    fn subscribe_account_changes(&self) -> broadcast::Receiver<AccountChange>;
}

/// Opaque signing capability. Only address resolution is consumed here;
/// transaction signing stays inside the pool manager.
#[async_trait]
pub trait Signer: Send + Sync + fmt::Debug {
    async fn address(&self) -> Result<Address, WalletError>;
}

/// Emitted whenever the provider's active account set changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountChange {
    pub accounts: Vec<Address>,
}

/// Typed wrapper over a raw wallet provider.
#[derive(Debug, Clone)]
pub struct Connection {
    provider: Arc<dyn WalletProvider>,
    network: String,
}

impl Connection {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        let network = provider.network();
        Self { provider, network }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn signer(&self) -> Result<Arc<dyn Signer>, WalletError> {
        self.provider.signer()
    }

    /// The provider's active account.
    pub async fn first_account(&self) -> Result<Address, WalletError> {
        self.provider
            .accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(WalletError::NoAccounts)
    }

    pub fn subscribe_account_changes(&self) -> broadcast::Receiver<AccountChange> {
        self.provider.subscribe_account_changes()
    }
}

/// What a pool manager is bound to: a signer when one is available,
/// otherwise the read-only connection.
#[derive(Debug, Clone)]
pub enum ChainAccess {
    Signer(Arc<dyn Signer>),
    ReadOnly(Connection),
}

impl ChainAccess {
    pub fn is_read_only(&self) -> bool {
        matches!(self, ChainAccess::ReadOnly(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("signer unavailable: {0}")]
    SignerUnavailable(String),
    #[error("address resolution failed: {0}")]
    AddressResolution(String),
    #[error("wallet exposes no accounts")]
    NoAccounts,
}
