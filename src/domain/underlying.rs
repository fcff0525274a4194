use super::{Address, AmountOverflow, TokenAmount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A redeemable base asset backing the user's LP positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderlyingHolding {
    pub asset: Address,
    pub symbol: String,
    pub decimals: u32,
    /// Smallest-unit balance.
    pub balance: TokenAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadata {
    pub symbol: String,
    pub decimals: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderlyingEntry {
    #[serde(flatten)]
    pub metadata: AssetMetadata,
    pub balance: TokenAmount,
}

/// Underlying balances aggregated across every pool, keyed by asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Underlyings(BTreeMap<Address, UnderlyingEntry>);

impl Underlyings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `balance` of `asset` to the aggregate, merging with any balance of
    /// the same asset already present.
    pub fn add(
        mut self,
        asset: Address,
        metadata: AssetMetadata,
        balance: TokenAmount,
    ) -> Result<Self, AmountOverflow> {
        match self.0.get_mut(&asset) {
            Some(entry) => {
                entry.balance = entry.balance.checked_add(balance).ok_or(AmountOverflow)?;
            }
            None => {
                self.0.insert(asset, UnderlyingEntry { metadata, balance });
            }
        }
        Ok(self)
    }

    /// Flatten into one holding per asset, ordered by asset address.
    pub fn to_list(&self) -> Vec<UnderlyingHolding> {
        self.0
            .iter()
            .map(|(asset, entry)| UnderlyingHolding {
                asset: asset.clone(),
                symbol: entry.metadata.symbol.clone(),
                decimals: entry.metadata.decimals,
                balance: entry.balance,
            })
            .collect()
    }
}
