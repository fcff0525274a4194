use crate::domain::{Decimal, PoolPosition, UnderlyingHolding, Underlyings};
use serde::Serialize;
use thiserror::Error;

/// Positions worth displaying, together with the USD total derived from
/// exactly that list. The two are only ever built and replaced together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub positions: Vec<PoolPosition>,
    pub total_usd: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("USD total overflowed after {summed} positions")]
pub struct TotalOverflow {
    pub summed: usize,
}

impl Portfolio {
    /// Filter the raw `summary` result and total what remains.
    pub fn from_summaries(raw: Vec<PoolPosition>) -> Result<Self, TotalOverflow> {
        let positions: Vec<PoolPosition> = raw
            .into_iter()
            .filter(|p| p.summary.is_displayable())
            .collect();
        let total_usd = total_usd(&positions)?;
        Ok(Self {
            positions,
            total_usd,
        })
    }

    /// True when some pool holds stake that can only be withdrawn.
    pub fn has_stranded_stake(&self) -> bool {
        has_stranded_stake(&self.positions)
    }
}

/// Exact sum of `usd_value_of`, starting from zero.
pub fn total_usd(positions: &[PoolPosition]) -> Result<Decimal, TotalOverflow> {
    positions
        .iter()
        .enumerate()
        .try_fold(Decimal::zero(), |acc, (i, p)| {
            acc.checked_add(p.summary.usd_value_of)
                .ok_or(TotalOverflow { summed: i })
        })
}

pub fn has_stranded_stake(positions: &[PoolPosition]) -> bool {
    positions.iter().any(|p| p.summary.is_stranded())
}

/// Flatten aggregated underlyings, dropping assets with a zero balance.
pub fn redeemable_holdings(underlyings: &Underlyings) -> Vec<UnderlyingHolding> {
    underlyings
        .to_list()
        .into_iter()
        .filter(|h| !h.balance.is_zero())
        .collect()
}
