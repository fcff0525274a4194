//! Domain types for the farming dashboard.
//!
//! This module provides:
//! - 256-bit token amounts (`TokenAmount`) and fixed-point USD values (`Decimal`)
//! - Token unit conversion (`parse_units` / `format_units`)
//! - Addresses and session identifiers
//! - Pool position and underlying holding shapes returned by the pool manager

pub mod amount;
pub mod decimal;
pub mod position;
pub mod primitives;
pub mod underlying;
pub mod units;

pub use amount::{AmountError, AmountOverflow, TokenAmount};
pub use decimal::Decimal;
pub use position::{PoolPosition, PoolRef, PositionSummary};
pub use primitives::{Address, AddressParseError, SessionId};
pub use underlying::{AssetMetadata, UnderlyingEntry, UnderlyingHolding, Underlyings};
pub use units::{default_min_harvest, format_units, parse_units, ParseUnitsError, REWARD_DECIMALS};
