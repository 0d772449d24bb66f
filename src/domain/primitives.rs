//! Domain primitives: Address, Wei, BlockNumber.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Ethereum address, validated and lowercase-normalized.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

#[derive(Debug, Clone, Error)]
pub enum AddressParseError {
    #[error("Address must start with 0x: {0}")]
    MissingPrefix(String),
    #[error("Address must be 20 bytes of hex: {0}")]
    InvalidHex(String),
}

impl Address {
    /// Parse and normalize an address. Accepts mixed-case hex, stores lowercase.
    pub fn parse(s: &str) -> Result<Self, AddressParseError> {
        let hex_part = s
            .strip_prefix("0x")
            .ok_or_else(|| AddressParseError::MissingPrefix(s.to_string()))?;
        let bytes = hex::decode(hex_part)
            .map_err(|_| AddressParseError::InvalidHex(s.to_string()))?;
        if bytes.len() != 20 {
            return Err(AddressParseError::InvalidHex(s.to_string()));
        }
        Ok(Address(format!("0x{}", hex_part.to_lowercase())))
    }

    /// The zero address (used by marketplaces to denote native ETH payment).
    pub fn zero() -> Self {
        Address("0x0000000000000000000000000000000000000000".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer amount in a token's smallest denomination (wei for ETH-family tokens).
///
/// Serialized as a decimal string because subgraph BigInt values and marketplace
/// prices exceed what JSON numbers can carry losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Wei(pub u128);

impl Wei {
    pub fn new(amount: u128) -> Self {
        Wei(amount)
    }

    pub fn zero() -> Self {
        Wei(0)
    }

    pub fn as_u128(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Truncating division, used for splitting a bundle price across tokens.
    pub fn div_floor(&self, divisor: u64) -> Wei {
        Wei(self.0 / divisor as u128)
    }

    /// Truncating percentage. `pct` is expected in 0..=100, so the result
    /// never exceeds `self` and the arithmetic cannot overflow even at
    /// `u128::MAX`.
    pub fn percent(&self, pct: u8) -> Wei {
        let whole = self.0 / 100;
        let remainder = self.0 % 100;
        Wei(whole * pct as u128 + remainder * pct as u128 / 100)
    }
}

impl std::ops::Add for Wei {
    type Output = Wei;

    fn add(self, rhs: Wei) -> Wei {
        Wei(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Wei {
    fn add_assign(&mut self, rhs: Wei) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Wei {
    type Output = Wei;

    fn sub(self, rhs: Wei) -> Wei {
        Wei(self.0 - rhs.0)
    }
}

impl std::str::FromStr for Wei {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>().map(Wei)
    }
}

impl std::fmt::Display for Wei {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Block number on the indexed chain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct BlockNumber(pub u64);

impl BlockNumber {
    pub fn new(n: u64) -> Self {
        BlockNumber(n)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
