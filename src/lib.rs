pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod manager;
pub mod orchestration;
pub mod wallet;

pub use config::Config;
pub use domain::{
    Address, Decimal, PoolPosition, PoolRef, PositionSummary, SessionId, TokenAmount,
    UnderlyingHolding, Underlyings,
};
pub use error::AppError;
pub use manager::{
    HttpPoolManagerFactory, ManagerError, MockPoolManager, MockPoolManagerFactory, PoolManager,
    PoolManagerFactory,
};
pub use orchestration::{Dashboard, DashboardError, DashboardSettings, DashboardView};
pub use wallet::{StaticWallet, WalletProvider};
