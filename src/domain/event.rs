//! Typed marketplace events, as returned by the marketplace source before
//! normalization into [`Sale`](super::Sale) records.

use super::{Address, BlockNumber, Wei};

/// One successful-sale event from the marketplace API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceEvent {
    pub transaction_hash: String,
    pub block_number: BlockNumber,
    /// Epoch seconds.
    pub timestamp: i64,
    pub seller: Address,
    pub buyer: Address,
    pub payment_token: Address,
    pub total_price: Wei,
    pub is_private: bool,
    pub is_bundle: bool,
    /// Constituent assets: one for a single sale, several for a bundle.
    pub assets: Vec<EventAsset>,
}

/// One asset inside a marketplace event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAsset {
    pub contract: Address,
    pub token_number: u64,
    /// Collection slug as reported by the marketplace. Missing when the
    /// marketplace has no collection data for the asset.
    pub collection_slug: Option<String>,
}

/// One page of marketplace events plus the cursor for the next page.
#[derive(Debug, Clone, Default)]
pub struct EventsPage {
    pub events: Vec<MarketplaceEvent>,
    pub next_cursor: Option<String>,
}
