//! Conversion between human-readable token amounts and smallest-unit integers.

use super::TokenAmount;
use thiserror::Error;

/// Fixed precision of the reward token.
pub const REWARD_DECIMALS: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseUnitsError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid decimal numeral: {0:?}")]
    InvalidNumber(String),
    #[error("{input:?} has more than {decimals} fractional digits")]
    TooManyDecimals { input: String, decimals: u32 },
    #[error("{0:?} is out of range")]
    Overflow(String),
}

/// Parse a decimal numeral such as `"2.5"` into an integer count of smallest
/// units, i.e. `2.5 * 10^decimals`.
///
/// Only plain unsigned numerals are accepted: digits with at most one `.`.
/// Signs, exponents, separators and surrounding whitespace are rejected.
pub fn parse_units(input: &str, decimals: u32) -> Result<TokenAmount, ParseUnitsError> {
    if input.is_empty() {
        return Err(ParseUnitsError::Empty);
    }

    let (whole, fraction) = match input.split_once('.') {
        Some((w, f)) => (w, f),
        None => (input, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) || (whole.is_empty() && fraction.is_empty()) {
        return Err(ParseUnitsError::InvalidNumber(input.to_string()));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(ParseUnitsError::TooManyDecimals {
            input: input.to_string(),
            decimals,
        });
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(decimals as usize - fraction.len()));
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(TokenAmount::zero());
    }

    TokenAmount::from_dec_str(digits).map_err(|_| ParseUnitsError::Overflow(input.to_string()))
}

/// Render a smallest-unit integer as a human-readable amount.
pub fn format_units(amount: TokenAmount, decimals: u32) -> String {
    let digits = amount.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    match fraction.trim_end_matches('0') {
        "" => whole.to_string(),
        fraction => format!("{}.{}", whole, fraction),
    }
}

/// One tenth of a whole reward token, in smallest units.
pub fn default_min_harvest() -> TokenAmount {
    TokenAmount::from(10u64.pow(REWARD_DECIMALS - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(s: &str) -> TokenAmount {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_fractional_amount() {
        assert_eq!(
            parse_units("2.5", REWARD_DECIMALS).unwrap(),
            units("2500000000000000000")
        );
    }

    #[test]
    fn test_parse_edge_forms() {
        assert_eq!(parse_units("1", 18).unwrap(), units("1000000000000000000"));
        assert_eq!(parse_units(".5", 18).unwrap(), units("500000000000000000"));
        assert_eq!(parse_units("5.", 18).unwrap(), units("5000000000000000000"));
        assert_eq!(parse_units("0.000000000000000001", 18).unwrap(), units("1"));
        assert_eq!(parse_units("000.0", 18).unwrap(), TokenAmount::zero());
        assert_eq!(parse_units("1.5000000000000000000000", 18).unwrap(), units("1500000000000000000"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["abc", ".", "1.2.3", "-1", "+1", "1e18", "1_000", " 1", "1,5"] {
            assert!(
                matches!(parse_units(bad, 18), Err(ParseUnitsError::InvalidNumber(_))),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(parse_units("", 18), Err(ParseUnitsError::Empty));
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        let err = parse_units("0.0000000000000000001", 18).unwrap_err();
        assert!(matches!(err, ParseUnitsError::TooManyDecimals { decimals: 18, .. }));
    }

    #[test]
    fn test_parse_large_amounts_at_uint256_scale() {
        assert_eq!(
            parse_units("100000000000", 18).unwrap(),
            units("100000000000000000000000000000")
        );
        assert_eq!(
            parse_units(
                "115792089237316195423570985008687907853269984665640564039457.584007913129639935",
                18
            )
            .unwrap(),
            units("115792089237316195423570985008687907853269984665640564039457584007913129639935")
        );
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let err = parse_units(
            "115792089237316195423570985008687907853269984665640564039457.584007913129639936",
            18,
        )
        .unwrap_err();
        assert!(matches!(err, ParseUnitsError::Overflow(_)));
        let err = parse_units(&format!("1{}", "0".repeat(60)), 18).unwrap_err();
        assert!(matches!(err, ParseUnitsError::Overflow(_)));
    }

    #[test]
    fn test_default_min_harvest_is_one_tenth_token() {
        assert_eq!(default_min_harvest(), units("100000000000000000"));
        assert_eq!(default_min_harvest(), parse_units("0.1", 18).unwrap());
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(units("2500000000000000000"), 18), "2.5");
        assert_eq!(format_units(units("1"), 18), "0.000000000000000001");
        assert_eq!(format_units(TokenAmount::zero(), 18), "0");
        assert_eq!(format_units(units("100000000000000000000000000000"), 18), "100000000000");
        assert_eq!(format_units(units("42"), 0), "42");
    }
}
