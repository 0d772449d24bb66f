use artroyalty::datasource::{OpenSeaSource, SubgraphSource};
use artroyalty::orchestration::{Orchestrator, RunParams};
use artroyalty::{report, Config};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let sales_source = Arc::new(SubgraphSource::new(config.subgraph_url.clone()));
    let marketplace_source = Arc::new(OpenSeaSource::new(
        config.opensea_api_url.clone(),
        config.opensea_api_key.clone(),
    ));
    let orchestrator = Orchestrator::new(sales_source, marketplace_source);

    let params = RunParams {
        block_range_lo: config.block_range_lo,
        block_range_hi: config.block_range_hi,
        core_contracts: config.core_contracts.clone(),
        filter: config.filter.clone(),
        looks_rare_fee_percent: config.looks_rare_fee_percent,
        occurred_before: config
            .occurred_before
            .unwrap_or_else(|| chrono::Utc::now().timestamp()),
    };

    tracing::info!(
        "Computing royalties for blocks [{}, {})",
        params.block_range_lo,
        params.block_range_hi
    );

    let reports = match orchestrator.run(&params).await {
        Ok(reports) => reports,
        Err(e) => {
            eprintln!("Run failed: {}", e);
            std::process::exit(1);
        }
    };

    if reports.is_empty() {
        tracing::info!("No royalties due for this range; skipping CSV export");
        return;
    }

    if let Err(e) = report::write_reports_file(Path::new(&config.output_path), &reports) {
        eprintln!("Failed to write report: {}", e);
        std::process::exit(1);
    }
}
