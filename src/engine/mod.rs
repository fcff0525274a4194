//! Pure derivations from raw pool manager results to display-ready state.

pub mod portfolio;

pub use portfolio::{
    has_stranded_stake, redeemable_holdings, total_usd, Portfolio, TotalOverflow,
};
