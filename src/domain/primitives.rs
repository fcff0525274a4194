//! Domain primitives: Address, SessionId.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// EVM account or contract address, stored as lowercase `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid address {0:?}: expected 0x followed by 40 hex digits")]
pub struct AddressParseError(pub String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| AddressParseError(s.to_string()))?;
        let bytes = hex::decode(hex_part).map_err(|_| AddressParseError(s.to_string()))?;
        if bytes.len() != 20 {
            return Err(AddressParseError(s.to_string()));
        }
        Ok(Address(format!("0x{}", hex::encode(bytes))))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generation number of a wallet session. Strictly increasing per dashboard,
/// so a stale id never matches a later session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parse_normalizes_case() {
        let addr: Address = "0xAbCdEf0123456789abcdef0123456789ABCDEF01".parse().unwrap();
        assert_eq!(addr.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(addr.to_string(), addr.as_str());
    }

    #[test]
    fn test_address_parse_rejects_bad_input() {
        for bad in [
            "",
            "0x",
            "abcdef0123456789abcdef0123456789abcdef01",
            "0xabcdef0123456789abcdef0123456789abcdef",
            "0xzzcdef0123456789abcdef0123456789abcdef01",
        ] {
            assert!(bad.parse::<Address>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_address_serde_validates() {
        let ok: Result<Address, _> =
            serde_json::from_str("\"0x00000000000000000000000000000000000000aa\"");
        assert!(ok.is_ok());
        let bad: Result<Address, _> = serde_json::from_str("\"0x123\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_session_id_ordering() {
        assert!(SessionId(1) < SessionId(2));
        assert_eq!(SessionId(7).to_string(), "session-7");
    }
}
