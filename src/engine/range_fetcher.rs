//! Exact pagination over the block-ordered subgraph source.
//!
//! The subgraph caps page sizes and its skip-based scrolling is unreliable at
//! depth, so paging is driven purely by shrinking the block range. A full
//! page may have been truncated mid-block; rows from the last (oldest) block
//! on the page are discarded and re-fetched so no sale is dropped or
//! double-counted across page boundaries.

use crate::datasource::{SalesSource, SourceError};
use crate::domain::Sale;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Rows requested per page. The subgraph caps `first` at 1000.
pub const PAGE_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum FetchError {
    /// A full page where every row shares one block number: the block holds
    /// at least PAGE_SIZE sales and the boundary cannot be split. The source
    /// data violates its own invariant, so no trustworthy result exists.
    #[error("Block {block} fills an entire page ({page_size} sales); cannot split page boundary")]
    PageOverflow { block: u64, page_size: usize },
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Fetches every sale in a half-open block range, exactly once each.
#[derive(Debug, Clone)]
pub struct RangeFetcher {
    source: Arc<dyn SalesSource>,
}

impl RangeFetcher {
    pub fn new(source: Arc<dyn SalesSource>) -> Self {
        Self { source }
    }

    /// Fetch all sales with block number in `[lo, hi)`, ordered descending
    /// by block number.
    pub async fn fetch_sales(&self, lo: u64, hi: u64) -> Result<Vec<Sale>, FetchError> {
        let mut sales = Vec::new();
        let mut upper = hi;

        while lo < upper {
            let page = self
                .source
                .fetch_sales_page(lo, upper, PAGE_SIZE, 0)
                .await?;

            if page.len() < PAGE_SIZE {
                sales.extend(page);
                break;
            }

            // Full page: the oldest block on it may be truncated. Drop every
            // row from that block and resume the next query just above it.
            let boundary_block = page
                .last()
                .map(|sale| sale.block_number.as_u64())
                .unwrap_or(lo);
            let split_at = page
                .iter()
                .rposition(|sale| sale.block_number.as_u64() > boundary_block)
                .ok_or(FetchError::PageOverflow {
                    block: boundary_block,
                    page_size: PAGE_SIZE,
                })?;

            let next_upper = page[split_at].block_number.as_u64();
            debug!(
                "Full page at [{}, {}): keeping {} rows, re-querying below block {}",
                lo,
                upper,
                split_at + 1,
                next_upper
            );
            sales.extend(page.into_iter().take(split_at + 1));
            upper = next_upper;
        }

        Ok(sales)
    }
}
