//! Data source abstraction over the two upstream systems: the indexed
//! subgraph and the marketplace event API.

use crate::domain::{Address, EventsPage, ProjectRecord, Sale};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod mock;
pub mod opensea;
pub mod retry;
pub mod subgraph;

pub use mock::{MockMarketplaceSource, MockSalesSource};
pub use opensea::OpenSeaSource;
pub use retry::FixedDelayPolicy;
pub use subgraph::SubgraphSource;

/// Indexed subgraph source for sales and project reference data.
///
/// Implementations must handle retry/backoff internally; pagination is the
/// caller's concern because page boundaries carry domain meaning (block
/// boundary splitting, see the range fetcher).
#[async_trait]
pub trait SalesSource: Send + Sync + fmt::Debug {
    /// Fetch one page of sales with block number in `[block_gte, block_lt)`,
    /// ordered descending by block number.
    ///
    /// `skip` exists because the upstream query supports it, but callers keep
    /// it at 0: deep skip-based pagination is known to return inconsistent
    /// results from the subgraph.
    async fn fetch_sales_page(
        &self,
        block_gte: u64,
        block_lt: u64,
        first: usize,
        skip: usize,
    ) -> Result<Vec<Sale>, SourceError>;

    /// Fetch all projects hosted on the given core contracts.
    async fn fetch_projects(
        &self,
        contracts: &[Address],
    ) -> Result<Vec<ProjectRecord>, SourceError>;
}

/// Marketplace REST event source.
#[async_trait]
pub trait MarketplaceSource: Send + Sync + fmt::Debug {
    /// Fetch one page of successful-sale events for a collection, newest
    /// first, occurring strictly before `occurred_before` (epoch seconds).
    async fn fetch_events_page(
        &self,
        collection_slug: &str,
        occurred_before: i64,
        cursor: Option<&str>,
    ) -> Result<EventsPage, SourceError>;

    /// Resolve the collection slug the marketplace uses for a token.
    async fn resolve_collection_slug(
        &self,
        contract: &Address,
        token_number: u64,
    ) -> Result<String, SourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Network error (connection timeout, DNS failure).
    #[error("Network error: {0}")]
    Network(String),
    /// Non-2xx HTTP response that is not retryable.
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    /// Invalid JSON or a response that does not parse into domain types.
    #[error("Parse error: {0}")]
    Parse(String),
    /// Rate limited by the upstream (retried internally until exhaustion).
    #[error("Rate limited")]
    RateLimited,
    /// GraphQL-level errors returned with a 200 response.
    #[error("Query error: {0}")]
    Query(String),
}
