//! The sale aggregation and royalty computation engine.

pub mod aggregator;
pub mod filter;
pub mod importer;
pub mod range_fetcher;

pub use aggregator::{
    AggregationError, CryptoRepartition, PaymentTokenVolume, ProjectReport, RoyaltyAggregator,
    OPENSEA_FEE_PERCENT,
};
pub use filter::{
    filter_sales, has_royalties, ContractFilter, FilterSpec, PRIVATE_SALES_ROYALTY_START_BLOCK,
};
pub use importer::{ImportError, MarketplaceImporter, EXCLUDED_COLLECTION};
pub use range_fetcher::{FetchError, RangeFetcher, PAGE_SIZE};
