//! Scriptable in-memory pool manager for tests and local runs.

use super::{ManagerError, PoolManager, PoolManagerFactory};
use crate::domain::{Address, PoolPosition, TokenAmount, Underlyings};
use crate::wallet::ChainAccess;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A call observed by the mock, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerCall {
    AllPastPools { read_only: bool },
    AggregateUnderlyings(Address),
    Summary(Address),
    GetRewards(TokenAmount),
    ExitInactive,
}

#[derive(Debug, Default)]
struct MockState {
    positions: Vec<PoolPosition>,
    underlyings: Underlyings,
    summary_delays: VecDeque<Duration>,
    underlyings_delays: VecDeque<Duration>,
    action_delays: VecDeque<Duration>,
    summary_error: Option<ManagerError>,
    underlyings_error: Option<ManagerError>,
    action_error: Option<ManagerError>,
    factory_error: Option<ManagerError>,
    calls: Vec<ManagerCall>,
}

/// Mock pool manager returning predefined data.
///
/// Clones share state, so a test can keep one copy to script responses while
/// the dashboard holds handles produced by `MockPoolManagerFactory`. Queries
/// snapshot the data when called and answer after the next scripted delay.
#[derive(Debug, Clone, Default)]
pub struct MockPoolManager {
    state: Arc<Mutex<MockState>>,
    read_only: bool,
}

impl MockPoolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_positions(self, positions: Vec<PoolPosition>) -> Self {
        self.set_positions(positions);
        self
    }

    pub fn with_underlyings(self, underlyings: Underlyings) -> Self {
        self.set_underlyings(underlyings);
        self
    }

    pub fn set_positions(&self, positions: Vec<PoolPosition>) {
        self.lock().positions = positions;
    }

    pub fn set_underlyings(&self, underlyings: Underlyings) {
        self.lock().underlyings = underlyings;
    }

    /// Delay the answer of the next `summary` call.
    pub fn push_summary_delay(&self, delay: Duration) {
        self.lock().summary_delays.push_back(delay);
    }

    /// Delay the answer of the next `aggregate_underlyings` call.
    pub fn push_underlyings_delay(&self, delay: Duration) {
        self.lock().underlyings_delays.push_back(delay);
    }

    /// Delay the answer of the next write call.
    pub fn push_action_delay(&self, delay: Duration) {
        self.lock().action_delays.push_back(delay);
    }

    pub fn fail_summary(&self, error: Option<ManagerError>) {
        self.lock().summary_error = error;
    }

    pub fn fail_underlyings(&self, error: Option<ManagerError>) {
        self.lock().underlyings_error = error;
    }

    pub fn fail_actions(&self, error: Option<ManagerError>) {
        self.lock().action_error = error;
    }

    pub fn fail_construction(&self, error: Option<ManagerError>) {
        self.lock().factory_error = error;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn calls(&self) -> Vec<ManagerCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bound(&self, read_only: bool) -> Self {
        Self {
            state: self.state.clone(),
            read_only,
        }
    }

    async fn pause(delay: Option<Duration>) {
        if let Some(delay) = delay.filter(|d| !d.is_zero()) {
            tokio::time::sleep(delay).await;
        }
    }

    async fn write_call(&self, call: ManagerCall) -> Result<(), ManagerError> {
        let (delay, error) = {
            let mut state = self.lock();
            state.calls.push(call);
            (state.action_delays.pop_front(), state.action_error.clone())
        };
        Self::pause(delay).await;
        if self.read_only {
            return Err(ManagerError::ReadOnly);
        }
        error.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl PoolManager for MockPoolManager {
    async fn aggregate_underlyings(
        &self,
        address: &Address,
    ) -> Result<Underlyings, ManagerError> {
        let (delay, result) = {
            let mut state = self.lock();
            state
                .calls
                .push(ManagerCall::AggregateUnderlyings(address.clone()));
            let result = match &state.underlyings_error {
                Some(e) => Err(e.clone()),
                None => Ok(state.underlyings.clone()),
            };
            (state.underlyings_delays.pop_front(), result)
        };
        Self::pause(delay).await;
        result
    }

    async fn summary(&self, address: &Address) -> Result<Vec<PoolPosition>, ManagerError> {
        let (delay, result) = {
            let mut state = self.lock();
            state.calls.push(ManagerCall::Summary(address.clone()));
            let result = match &state.summary_error {
                Some(e) => Err(e.clone()),
                None => Ok(state.positions.clone()),
            };
            (state.summary_delays.pop_front(), result)
        };
        Self::pause(delay).await;
        result
    }

    async fn get_rewards(&self, minimum: TokenAmount) -> Result<(), ManagerError> {
        self.write_call(ManagerCall::GetRewards(minimum)).await
    }

    async fn exit_inactive(&self) -> Result<(), ManagerError> {
        self.write_call(ManagerCall::ExitInactive).await
    }
}

/// Hands out handles onto a shared `MockPoolManager`.
#[derive(Debug, Clone, Default)]
pub struct MockPoolManagerFactory {
    manager: MockPoolManager,
}

impl MockPoolManagerFactory {
    pub fn new(manager: MockPoolManager) -> Self {
        Self { manager }
    }
}

impl PoolManagerFactory for MockPoolManagerFactory {
    fn all_past_pools(&self, access: ChainAccess) -> Result<Arc<dyn PoolManager>, ManagerError> {
        let read_only = access.is_read_only();
        let error = {
            let mut state = self.manager.lock();
            state.calls.push(ManagerCall::AllPastPools { read_only });
            state.factory_error.clone()
        };
        if let Some(e) = error {
            return Err(e);
        }
        Ok(Arc::new(self.manager.bound(read_only)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, PoolRef, PositionSummary};
    use crate::wallet::{Connection, StaticWallet, WalletProvider};

    fn addr(tail: &str) -> Address {
        format!("0x{:0>40}", tail).parse().unwrap()
    }

    fn position(name: &str, staked: u64) -> PoolPosition {
        PoolPosition {
            pool: PoolRef {
                name: name.to_string(),
                address: addr("f1"),
            },
            summary: PositionSummary {
                staked_balance: staked.into(),
                unstaked_balance: TokenAmount::zero(),
                earned_rewards: TokenAmount::zero(),
                is_active: true,
                usd_value_of: Decimal::zero(),
            },
        }
    }

    #[tokio::test]
    async fn test_mock_returns_scripted_positions() {
        let mock = MockPoolManager::new().with_positions(vec![position("A", 1)]);
        let positions = mock.summary(&addr("1")).await.unwrap();
        assert_eq!(positions, vec![position("A", 1)]);
        assert_eq!(mock.calls(), vec![ManagerCall::Summary(addr("1"))]);
    }

    #[tokio::test]
    async fn test_mock_scripted_failure() {
        let mock = MockPoolManager::new();
        mock.fail_underlyings(Some(ManagerError::RateLimited));
        assert_eq!(
            mock.aggregate_underlyings(&addr("1")).await,
            Err(ManagerError::RateLimited)
        );
    }

    #[tokio::test]
    async fn test_factory_binds_read_only_handles() {
        let mock = MockPoolManager::new();
        let factory = MockPoolManagerFactory::new(mock.clone());
        let wallet: Arc<dyn WalletProvider> = Arc::new(StaticWallet::new("mainnet", None));
        let handle = factory
            .all_past_pools(ChainAccess::ReadOnly(Connection::new(wallet)))
            .unwrap();

        assert_eq!(handle.exit_inactive().await, Err(ManagerError::ReadOnly));
        assert_eq!(
            mock.calls(),
            vec![
                ManagerCall::AllPastPools { read_only: true },
                ManagerCall::ExitInactive
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_delay_snapshots_data_at_call_time() {
        let mock = MockPoolManager::new().with_positions(vec![position("old", 1)]);
        mock.push_summary_delay(Duration::from_millis(50));

        let pending = {
            let mock = mock.clone();
            tokio::spawn(async move { mock.summary(&addr("1")).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;
        mock.set_positions(vec![position("new", 2)]);

        let answered = pending.await.unwrap().unwrap();
        assert_eq!(answered[0].pool.name, "old");
    }
}
