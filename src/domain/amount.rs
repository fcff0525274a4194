//! Unsigned 256-bit token amounts, the width balances have on chain.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Integer token amount in smallest units, as a uint256.
///
/// Serialized as a base-10 JSON string.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TokenAmount(U256);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("invalid integer amount {0:?}")]
    InvalidDigits(String),
    #[error("{0:?} does not fit in 256 bits")]
    Overflow(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("token amount overflowed 256 bits")]
pub struct AmountOverflow;

impl TokenAmount {
    pub fn zero() -> Self {
        TokenAmount(U256::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_add(rhs.0).map(TokenAmount)
    }

    /// Parse plain base-10 digits. Signs, `0x` prefixes and separators are
    /// rejected.
    pub fn from_dec_str(s: &str) -> Result<Self, AmountError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::InvalidDigits(s.to_string()));
        }
        U256::from_str_radix(s, 10)
            .map(TokenAmount)
            .map_err(|_| AmountError::Overflow(s.to_string()))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dec_str(s)
    }
}

impl TryFrom<String> for TokenAmount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_dec_str(&value)
    }
}

impl From<TokenAmount> for String {
    fn from(value: TokenAmount) -> Self {
        value.to_string()
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        TokenAmount(U256::from(value))
    }
}

impl From<U256> for TokenAmount {
    fn from(value: U256) -> Self {
        TokenAmount(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const U256_MAX: &str =
        "115792089237316195423570985008687907853269984665640564039457584007913129639935";

    #[test]
    fn test_parses_full_uint256_range() {
        let max: TokenAmount = U256_MAX.parse().unwrap();
        assert_eq!(max, TokenAmount::from(U256::MAX));
        assert_eq!(max.to_string(), U256_MAX);

        let past_max = format!("{}0", U256_MAX);
        assert!(matches!(
            TokenAmount::from_dec_str(&past_max),
            Err(AmountError::Overflow(_))
        ));
    }

    #[test]
    fn test_rejects_non_decimal_forms() {
        for bad in ["", "-1", "+1", "0x10", "1_000", "1.5", " 1", "1e18"] {
            assert!(
                matches!(TokenAmount::from_dec_str(bad), Err(AmountError::InvalidDigits(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_json_form_is_decimal_string() {
        let amount: TokenAmount =
            serde_json::from_value(serde_json::json!("100000000000000000000000000000")).unwrap();
        assert_eq!(
            serde_json::to_value(amount).unwrap(),
            serde_json::json!("100000000000000000000000000000")
        );
        let bad: Result<TokenAmount, _> = serde_json::from_value(serde_json::json!("12abc"));
        assert!(bad.is_err());
    }

    #[test]
    fn test_checked_add_reports_overflow() {
        let max = TokenAmount::from(U256::MAX);
        assert_eq!(max.checked_add(TokenAmount::from(1u64)), None);
        assert_eq!(
            TokenAmount::from(2u64).checked_add(TokenAmount::from(3u64)),
            Some(TokenAmount::from(5u64))
        );
        assert!(TokenAmount::zero().is_zero());
    }
}
