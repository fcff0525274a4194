//! In-process wallet provider with a configured account.

use super::{AccountChange, Signer, WalletError, WalletProvider};
use crate::domain::Address;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::info;

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Wallet provider backed by a fixed account that can be switched at runtime.
///
/// Switching the account broadcasts an `AccountChange` to every subscriber,
/// the same way a browser wallet reports `accountsChanged`.
#[derive(Debug, Clone)]
pub struct StaticWallet {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    network: String,
    account: Mutex<Option<Address>>,
    can_sign: bool,
    fail_address_resolution: AtomicBool,
    changes: broadcast::Sender<AccountChange>,
}

impl Inner {
    fn account(&self) -> Option<Address> {
        self.account
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StaticWallet {
    pub fn new(network: impl Into<String>, account: Option<Address>) -> Self {
        Self::build(network.into(), account, true)
    }

    /// A provider that exposes accounts but refuses to hand out a signer.
    pub fn read_only(network: impl Into<String>, account: Option<Address>) -> Self {
        Self::build(network.into(), account, false)
    }

    fn build(network: String, account: Option<Address>, can_sign: bool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                network,
                account: Mutex::new(account),
                can_sign,
                fail_address_resolution: AtomicBool::new(false),
                changes,
            }),
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.inner.account()
    }

    /// Replace the active account and notify subscribers.
    pub fn switch_account(&self, account: Option<Address>) {
        *self
            .inner
            .account
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = account.clone();
        info!(account = ?account, "wallet account changed");
        // No subscribers is fine: nobody is connected yet.
        let _ = self.inner.changes.send(AccountChange {
            accounts: account.into_iter().collect(),
        });
    }

    /// Make subsequent address lookups fail.
    pub fn set_address_resolution_failing(&self, failing: bool) {
        self.inner
            .fail_address_resolution
            .store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl WalletProvider for StaticWallet {
    fn network(&self) -> String {
        self.inner.network.clone()
    }

    fn signer(&self) -> Result<Arc<dyn Signer>, WalletError> {
        if !self.inner.can_sign {
            return Err(WalletError::SignerUnavailable(
                "wallet is read-only".to_string(),
            ));
        }
        Ok(Arc::new(StaticSigner {
            inner: self.inner.clone(),
        }))
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        if self.inner.fail_address_resolution.load(Ordering::SeqCst) {
            return Err(WalletError::AddressResolution(
                "wallet did not answer".to_string(),
            ));
        }
        Ok(self.inner.account().into_iter().collect())
    }

    fn subscribe_account_changes(&self) -> broadcast::Receiver<AccountChange> {
        self.inner.changes.subscribe()
    }
}

#[derive(Debug)]
struct StaticSigner {
    inner: Arc<Inner>,
}

#[async_trait]
impl Signer for StaticSigner {
    async fn address(&self) -> Result<Address, WalletError> {
        if self.inner.fail_address_resolution.load(Ordering::SeqCst) {
            return Err(WalletError::AddressResolution(
                "signer did not answer".to_string(),
            ));
        }
        self.inner.account().ok_or(WalletError::NoAccounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::Connection;

    fn addr() -> Address {
        "0x00000000000000000000000000000000000000a1".parse().unwrap()
    }

    #[tokio::test]
    async fn test_signer_resolves_active_account() {
        let wallet = StaticWallet::new("mainnet", Some(addr()));
        let signer = wallet.signer().unwrap();
        assert_eq!(signer.address().await.unwrap(), addr());
    }

    #[tokio::test]
    async fn test_read_only_wallet_has_no_signer() {
        let wallet = StaticWallet::read_only("mainnet", Some(addr()));
        assert!(matches!(
            wallet.signer(),
            Err(WalletError::SignerUnavailable(_))
        ));
        let conn = Connection::new(Arc::new(wallet));
        assert_eq!(conn.first_account().await.unwrap(), addr());
    }

    #[tokio::test]
    async fn test_switch_account_notifies_subscribers() {
        let wallet = StaticWallet::new("mainnet", None);
        let mut rx = wallet.subscribe_account_changes();
        wallet.switch_account(Some(addr()));
        let change = rx.recv().await.unwrap();
        assert_eq!(change.accounts, vec![addr()]);
        assert_eq!(wallet.account(), Some(addr()));
    }

    #[tokio::test]
    async fn test_failing_address_resolution() {
        let wallet = StaticWallet::new("mainnet", Some(addr()));
        wallet.set_address_resolution_failing(true);
        let signer = wallet.signer().unwrap();
        assert!(matches!(
            signer.address().await,
            Err(WalletError::AddressResolution(_))
        ));
        let conn = Connection::new(Arc::new(wallet));
        assert!(conn.first_account().await.is_err());
    }

    #[tokio::test]
    async fn test_empty_wallet_has_no_accounts() {
        let conn = Connection::new(Arc::new(StaticWallet::new("mainnet", None)));
        assert_eq!(conn.first_account().await, Err(WalletError::NoAccounts));
    }
}
