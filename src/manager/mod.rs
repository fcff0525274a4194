//! Pool manager abstraction: the external aggregator that knows every farming
//! pool and answers per-user queries and actions.

use crate::domain::{Address, PoolPosition, TokenAmount, Underlyings};
use crate::wallet::ChainAccess;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod http;
pub mod mock;

pub use http::{HttpPoolManager, HttpPoolManagerFactory};
pub use mock::{ManagerCall, MockPoolManager, MockPoolManagerFactory};

/// Per-user view of every pool the manager tracks.
///
/// Handles are bound to the `ChainAccess` they were created with; write
/// operations on a read-only handle fail with `ManagerError::ReadOnly`.
#[async_trait]
pub trait PoolManager: Send + Sync + fmt::Debug {
    /// Underlying assets redeemable from the user's LP positions, summed
    /// across pools.
    async fn aggregate_underlyings(&self, address: &Address)
        -> Result<Underlyings, ManagerError>;

    /// One summary per pool, including pools the user never touched.
    async fn summary(&self, address: &Address) -> Result<Vec<PoolPosition>, ManagerError>;

    /// Claim rewards from every pool whose pending rewards are at least
    /// `minimum` smallest units.
    async fn get_rewards(&self, minimum: TokenAmount) -> Result<(), ManagerError>;

    /// Withdraw all stake from pools that are no longer active.
    async fn exit_inactive(&self) -> Result<(), ManagerError>;
}

/// Builds manager handles. Mirrors the aggregator's `allPastPools`
/// constructor: the handle covers every historical pool, not just the
/// currently active ones.
pub trait PoolManagerFactory: Send + Sync + fmt::Debug {
    fn all_past_pools(&self, access: ChainAccess) -> Result<Arc<dyn PoolManager>, ManagerError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("operation requires a signer but the manager is read-only")]
    ReadOnly,
    #[error("rate limited")]
    RateLimited,
    #[error("manager rejected the call: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_error_display() {
        assert_eq!(
            ManagerError::Network("connection reset".to_string()).to_string(),
            "network error: connection reset"
        );
        assert_eq!(
            ManagerError::Http {
                status: 503,
                message: "Server error".to_string()
            }
            .to_string(),
            "HTTP error 503: Server error"
        );
        assert_eq!(
            ManagerError::ReadOnly.to_string(),
            "operation requires a signer but the manager is read-only"
        );
    }
}
