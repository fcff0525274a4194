use super::{Address, Decimal, TokenAmount};
use serde::{Deserialize, Serialize};

/// Identity of a farming pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRef {
    pub name: String,
    pub address: Address,
}

/// A user's stake, rewards and activity status in one pool.
///
/// Balances are uint256 smallest-unit integers; `usd_value_of` is the
/// fixed-point USD value of the whole position as reported by the pool manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSummary {
    pub staked_balance: TokenAmount,
    pub unstaked_balance: TokenAmount,
    pub earned_rewards: TokenAmount,
    pub is_active: bool,
    pub usd_value_of: Decimal,
}

impl PositionSummary {
    /// Whether this position is worth displaying: it has rewards to claim,
    /// has stake, or holds unstaked tokens in a pool that still accepts them.
    pub fn is_displayable(&self) -> bool {
        !self.earned_rewards.is_zero()
            || !self.staked_balance.is_zero()
            || (self.is_active && !self.unstaked_balance.is_zero())
    }

    /// Stake left behind in a pool that no longer accepts deposits.
    pub fn is_stranded(&self) -> bool {
        !self.staked_balance.is_zero() && !self.is_active
    }
}

/// One entry of the manager's `summary` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolPosition {
    pub pool: PoolRef,
    pub summary: PositionSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(earned: u64, staked: u64, unstaked: u64, active: bool) -> PositionSummary {
        PositionSummary {
            staked_balance: staked.into(),
            unstaked_balance: unstaked.into(),
            earned_rewards: earned.into(),
            is_active: active,
            usd_value_of: Decimal::zero(),
        }
    }

    #[test]
    fn test_displayable_truth_table() {
        // (earned, staked, unstaked, active) -> shown
        let cases = [
            ((0, 0, 0, true), false),
            ((0, 0, 0, false), false),
            ((1, 0, 0, false), true),
            ((0, 1, 0, false), true),
            ((0, 0, 1, true), true),
            ((0, 0, 1, false), false),
        ];
        for ((earned, staked, unstaked, active), expected) in cases {
            assert_eq!(
                summary(earned, staked, unstaked, active).is_displayable(),
                expected,
                "earned={earned} staked={staked} unstaked={unstaked} active={active}"
            );
        }
    }

    #[test]
    fn test_stranded_requires_stake_in_inactive_pool() {
        assert!(summary(0, 5, 0, false).is_stranded());
        assert!(!summary(0, 0, 0, false).is_stranded());
        assert!(!summary(0, 5, 0, true).is_stranded());
    }

    #[test]
    fn test_pool_position_json_shape() {
        let json = serde_json::json!({
            "pool": {"name": "FARM_USDC", "address": "0x00000000000000000000000000000000000000aa"},
            "summary": {
                "stakedBalance": "5",
                "unstakedBalance": "0",
                "earnedRewards": "12",
                "isActive": false,
                "usdValueOf": "1.25"
            }
        });
        let pos: PoolPosition = serde_json::from_value(json).unwrap();
        assert_eq!(pos.pool.name, "FARM_USDC");
        assert!(pos.summary.is_stranded());
        assert_eq!(pos.summary.usd_value_of.to_string(), "1.25");
    }

    #[test]
    fn test_balances_beyond_96_bits_deserialize() {
        let json = serde_json::json!({
            "stakedBalance": "100000000000000000000000000000",
            "unstakedBalance": "1000000000000000000000000000000000",
            "earnedRewards": "0",
            "isActive": true,
            "usdValueOf": "0"
        });
        let summary: PositionSummary = serde_json::from_value(json).unwrap();
        assert_eq!(
            summary.staked_balance.to_string(),
            "100000000000000000000000000000"
        );
        assert!(summary.is_displayable());
    }
}
