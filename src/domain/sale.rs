//! Sale records: the unified shape both data sources normalize into.

use super::{Address, BlockNumber, Project, Wei};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between token ids in `Sale::summary_tokens_sold`.
pub const SUMMARY_SEPARATOR: &str = "::";

/// Marketplace contract a sale settled through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Exchange {
    #[serde(rename = "OS_V1")]
    OsV1,
    #[serde(rename = "OS_V2")]
    OsV2,
    #[serde(rename = "LR_V1")]
    LrV1,
}

/// Marketplace families group exchanges that share one fee schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketplaceFamily {
    OpenSea,
    LooksRare,
}

impl Exchange {
    pub fn family(&self) -> MarketplaceFamily {
        match self {
            Exchange::OsV1 | Exchange::OsV2 => MarketplaceFamily::OpenSea,
            Exchange::LrV1 => MarketplaceFamily::LooksRare,
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Exchange::OsV1 => write!(f, "OS_V1"),
            Exchange::OsV2 => write!(f, "OS_V2"),
            Exchange::LrV1 => write!(f, "LR_V1"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unknown exchange tag: {0}")]
pub struct ExchangeParseError(String);

impl std::str::FromStr for Exchange {
    type Err = ExchangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OS_V1" => Ok(Exchange::OsV1),
            "OS_V2" => Ok(Exchange::OsV2),
            "LR_V1" => Ok(Exchange::LrV1),
            other => Err(ExchangeParseError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unknown sale type: {0}")]
pub struct SaleTypeParseError(String);

impl std::str::FromStr for SaleType {
    type Err = SaleTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Single" => Ok(SaleType::Single),
            "Bundle" => Ok(SaleType::Bundle),
            other => Err(SaleTypeParseError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleType {
    Single,
    Bundle,
}

/// One sold token, as indexed by the subgraph or normalized from a
/// marketplace asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// `"{contract}-{token_number}"`.
    pub id: String,
    pub contract: Address,
    pub project: Project,
}

/// Binds one sold token to its sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLookupTable {
    /// `"{sale_id}::{token_id}"`.
    pub id: String,
    pub token: Token,
}

/// A single marketplace transaction, possibly selling several tokens at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    /// Transaction hash; the cross-source deduplication key.
    pub id: String,
    pub exchange: Exchange,
    pub sale_type: SaleType,
    pub block_number: BlockNumber,
    /// Epoch seconds.
    pub block_timestamp: i64,
    pub seller: Address,
    pub buyer: Address,
    pub payment_token: Address,
    /// Total price paid for the whole transaction, smallest denomination.
    pub price: Wei,
    pub is_private: bool,
    /// `::`-joined token ids. Only the segment count is meaningful: it records
    /// how many tokens the sale originally covered, and survives any later
    /// narrowing of `sale_lookup_tables`.
    pub summary_tokens_sold: String,
    pub sale_lookup_tables: Vec<SaleLookupTable>,
}

impl Sale {
    /// Number of tokens the sale originally sold.
    ///
    /// Derived from the summary encoding, never from `sale_lookup_tables`,
    /// so price splitting stays fair after filtering prunes entries.
    pub fn token_count(&self) -> u64 {
        self.summary_tokens_sold
            .split(SUMMARY_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .count() as u64
    }
}
