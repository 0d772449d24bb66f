//! Run-level sequencing: fetch both sources, merge, filter, aggregate,
//! finalize.

use crate::datasource::{MarketplaceSource, SalesSource};
use crate::domain::{Address, ProjectCatalog, Sale, TOKENS_PER_PROJECT};
use crate::engine::{
    filter_sales, FilterSpec, MarketplaceImporter, RangeFetcher, RoyaltyAggregator,
    EXCLUDED_COLLECTION, ProjectReport,
};
use crate::error::RunError;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Everything that parameterizes one batch run.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Half-open block range `[lo, hi)` the run covers.
    pub block_range_lo: u64,
    pub block_range_hi: u64,
    /// Core token contracts whose projects are under analysis.
    pub core_contracts: Vec<Address>,
    pub filter: FilterSpec,
    /// Royalty fee percentage charged by the LooksRare exchange family.
    pub looks_rare_fee_percent: u8,
    /// Marketplace event cursor start, epoch seconds (normally "now").
    pub occurred_before: i64,
}

/// Owns both sources and sequences one batch computation.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    sales_source: Arc<dyn SalesSource>,
    marketplace_source: Arc<dyn MarketplaceSource>,
}

impl Orchestrator {
    pub fn new(
        sales_source: Arc<dyn SalesSource>,
        marketplace_source: Arc<dyn MarketplaceSource>,
    ) -> Self {
        Self {
            sales_source,
            marketplace_source,
        }
    }

    /// Fetch the unified, deduplicated sale list for the run's block range,
    /// combining the subgraph and the marketplace importer upstream of any
    /// filtering.
    pub async fn fetch_sales(&self, params: &RunParams) -> Result<Vec<Sale>, RunError> {
        let records = self
            .sales_source
            .fetch_projects(&params.core_contracts)
            .await?;
        info!("Loaded {} projects from the subgraph", records.len());
        let catalog = ProjectCatalog::new(&records);

        // One slug per project; distinct projects can share a collection.
        let mut slugs = BTreeSet::new();
        for record in &records {
            let slug = self
                .marketplace_source
                .resolve_collection_slug(
                    &record.contract,
                    record.project.project_id * TOKENS_PER_PROJECT,
                )
                .await?;
            if slug == EXCLUDED_COLLECTION {
                continue;
            }
            slugs.insert(slug);
        }
        info!("Importing {} marketplace collections", slugs.len());

        let fetcher = RangeFetcher::new(self.sales_source.clone());
        let importer = MarketplaceImporter::new(self.marketplace_source.clone(), catalog);

        // The two sources are independent; each one's pagination stays
        // strictly sequential internally.
        let (subgraph_sales, marketplace_sales) = futures::try_join!(
            async {
                fetcher
                    .fetch_sales(params.block_range_lo, params.block_range_hi)
                    .await
                    .map_err(RunError::from)
            },
            async {
                let mut sales = Vec::new();
                for slug in &slugs {
                    sales.extend(
                        importer
                            .import_collection(
                                slug,
                                params.occurred_before,
                                params.block_range_lo,
                            )
                            .await?,
                    );
                }
                Ok::<_, RunError>(sales)
            }
        )?;
        info!(
            "Fetched {} subgraph sales and {} marketplace sales",
            subgraph_sales.len(),
            marketplace_sales.len()
        );

        // Dedup by transaction hash; the subgraph record wins because it
        // carries the indexed lookup tables.
        let mut seen: HashSet<String> = HashSet::new();
        let mut merged = Vec::new();
        for sale in subgraph_sales.into_iter().chain(marketplace_sales) {
            if seen.insert(sale.id.clone()) {
                merged.push(sale);
            } else {
                debug!("Dropping cross-source duplicate sale {}", sale.id);
            }
        }

        // Marketplace events are cursored by timestamp, so some may fall
        // outside the block range; the range is enforced on the merged list.
        merged.retain(|sale| {
            let block = sale.block_number.as_u64();
            block >= params.block_range_lo && block < params.block_range_hi
        });
        Ok(merged)
    }

    /// Run the full pipeline and return finalized reports keyed by project
    /// name. Zero sales after filtering yields an empty map, not an error.
    pub async fn run(
        &self,
        params: &RunParams,
    ) -> Result<BTreeMap<String, ProjectReport>, RunError> {
        let sales = self.fetch_sales(params).await?;
        let filtered = filter_sales(sales, &params.filter);
        if filtered.is_empty() {
            info!("No sales left after filtering; nothing to report");
            return Ok(BTreeMap::new());
        }
        info!("Aggregating {} sales", filtered.len());

        let mut reports = RoyaltyAggregator::build_reports(&filtered)?;
        for report in reports.values_mut() {
            report.compute_crypto_due(params.looks_rare_fee_percent);
        }
        Ok(reports)
    }
}
