//! Marketplace event import: cursor pagination, early stop at the minimum
//! block, and normalization of single and bundle events into [`Sale`] records.

use crate::datasource::{MarketplaceSource, SourceError};
use crate::domain::sale::SUMMARY_SEPARATOR;
use crate::domain::{
    Address, EventAsset, Exchange, MarketplaceEvent, ProjectCatalog, Sale, SaleLookupTable,
    SaleType, Token,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Royalties for this collection route through a separate, untracked
/// contract; importing its marketplace events would double-count them.
pub const EXCLUDED_COLLECTION: &str = "art-blocks-explorations";

/// Pause between successful page fetches, to stay under published rate limits.
const PAGE_THROTTLE: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum ImportError {
    /// A single-asset event whose collection cannot be reconciled with the
    /// one being imported.
    #[error("Sale {sale}: asset belongs to collection {found:?}, expected {expected}")]
    CollectionMismatch {
        sale: String,
        expected: String,
        found: Option<String>,
    },
    /// A bundle where no asset could be attributed to any collection at all.
    #[error("Sale {sale}: bundle assets carry no usable collection data")]
    IrreconcilableBundle { sale: String },
    /// An asset whose token does not resolve to a project in the catalog.
    #[error("No known project for token {token_number} on contract {contract}")]
    UnknownProject {
        contract: Address,
        token_number: u64,
    },
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Imports and normalizes marketplace events for one collection at a time.
#[derive(Debug, Clone)]
pub struct MarketplaceImporter {
    source: Arc<dyn MarketplaceSource>,
    catalog: ProjectCatalog,
}

/// How an asset's reported slug relates to the collection being imported.
enum SlugMatch {
    Exact,
    /// Reported slug strictly contains the expected one; treated as a
    /// marketplace naming variant of the same collection.
    Coalesced,
    Foreign,
    Missing,
}

fn classify_slug(expected: &str, reported: Option<&str>) -> SlugMatch {
    match reported {
        None => SlugMatch::Missing,
        Some(slug) if slug == expected => SlugMatch::Exact,
        Some(slug) if slug.contains(expected) => SlugMatch::Coalesced,
        Some(_) => SlugMatch::Foreign,
    }
}

impl MarketplaceImporter {
    pub fn new(source: Arc<dyn MarketplaceSource>, catalog: ProjectCatalog) -> Self {
        Self { source, catalog }
    }

    /// Import all successful sales for `collection_slug` occurring before
    /// `occurred_before` (epoch seconds) and at or above `min_block`.
    ///
    /// Events arrive newest-first, so the first event below `min_block` ends
    /// the import: it and everything after it are discarded.
    pub async fn import_collection(
        &self,
        collection_slug: &str,
        occurred_before: i64,
        min_block: u64,
    ) -> Result<Vec<Sale>, ImportError> {
        if collection_slug == EXCLUDED_COLLECTION {
            debug!(
                "Skipping marketplace import for excluded collection {}",
                collection_slug
            );
            return Ok(Vec::new());
        }

        let mut sales = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .source
                .fetch_events_page(collection_slug, occurred_before, cursor.as_deref())
                .await?;

            for event in page.events {
                if event.block_number.as_u64() < min_block {
                    debug!(
                        "Reached block {} below minimum {}; stopping import of {}",
                        event.block_number, min_block, collection_slug
                    );
                    return Ok(sales);
                }
                sales.push(self.normalize_event(collection_slug, event)?);
            }

            match page.next_cursor {
                Some(next) => {
                    cursor = Some(next);
                    tokio::time::sleep(PAGE_THROTTLE).await;
                }
                None => break,
            }
        }

        debug!(
            "Imported {} marketplace sales for {}",
            sales.len(),
            collection_slug
        );
        Ok(sales)
    }

    /// Normalize one event into a [`Sale`], unbundling multi-asset events.
    ///
    /// Only assets belonging to the imported collection become lookup tables;
    /// the summary string still records every constituent so that price
    /// splitting uses the original bundle size.
    fn normalize_event(
        &self,
        collection_slug: &str,
        event: MarketplaceEvent,
    ) -> Result<Sale, ImportError> {
        let mut kept = Vec::new();
        let mut foreign = 0usize;
        let mut missing = 0usize;
        let mut foreign_slug = None;

        for asset in &event.assets {
            match classify_slug(collection_slug, asset.collection_slug.as_deref()) {
                SlugMatch::Exact => kept.push(asset),
                SlugMatch::Coalesced => {
                    warn!(
                        "Sale {}: coalescing collection slug {:?} to {}",
                        event.transaction_hash, asset.collection_slug, collection_slug
                    );
                    kept.push(asset);
                }
                SlugMatch::Foreign => {
                    foreign += 1;
                    foreign_slug = asset.collection_slug.clone();
                }
                SlugMatch::Missing => missing += 1,
            }
        }

        if kept.is_empty() {
            if !event.is_bundle {
                return Err(ImportError::CollectionMismatch {
                    sale: event.transaction_hash,
                    expected: collection_slug.to_string(),
                    found: event
                        .assets
                        .first()
                        .and_then(|a| a.collection_slug.clone()),
                });
            }
            if missing > 0 {
                return Err(ImportError::IrreconcilableBundle {
                    sale: event.transaction_hash,
                });
            }
            // Every constituent belongs to some other collection; those are
            // imported when that collection is processed.
            warn!(
                "Sale {}: bundle contains no {} assets (e.g. {:?}); recording with no lookup tables",
                event.transaction_hash, collection_slug, foreign_slug
            );
        } else if foreign > 0 || missing > 0 {
            warn!(
                "Sale {}: dropping {} foreign-collection asset(s) from bundle",
                event.transaction_hash,
                foreign + missing
            );
        }

        let sale_lookup_tables = kept
            .into_iter()
            .map(|asset| self.lookup_table(&event.transaction_hash, asset))
            .collect::<Result<Vec<_>, ImportError>>()?;

        // Original bundle size, independent of how many assets were kept.
        let summary_tokens_sold = event
            .assets
            .iter()
            .map(|asset| asset.token_number.to_string())
            .collect::<Vec<_>>()
            .join(SUMMARY_SEPARATOR);

        Ok(Sale {
            id: event.transaction_hash,
            exchange: Exchange::OsV2,
            sale_type: if event.is_bundle {
                SaleType::Bundle
            } else {
                SaleType::Single
            },
            block_number: event.block_number,
            block_timestamp: event.timestamp,
            seller: event.seller,
            buyer: event.buyer,
            payment_token: event.payment_token,
            price: event.total_price,
            is_private: event.is_private,
            summary_tokens_sold,
            sale_lookup_tables,
        })
    }

    fn lookup_table(
        &self,
        sale_id: &str,
        asset: &EventAsset,
    ) -> Result<SaleLookupTable, ImportError> {
        let project = self
            .catalog
            .resolve(&asset.contract, asset.token_number)
            .ok_or_else(|| ImportError::UnknownProject {
                contract: asset.contract.clone(),
                token_number: asset.token_number,
            })?
            .clone();

        let token_id = format!("{}-{}", asset.contract, asset.token_number);
        Ok(SaleLookupTable {
            id: format!("{}{}{}", sale_id, SUMMARY_SEPARATOR, token_id),
            token: Token {
                id: token_id,
                contract: asset.contract.clone(),
                project,
            },
        })
    }
}
