use artroyalty::datasource::{MockMarketplaceSource, MockSalesSource};
use artroyalty::domain::{
    Address, BlockNumber, CurationStatus, EventAsset, Exchange, MarketplaceEvent, Project,
    ProjectRecord, Sale, SaleLookupTable, SaleType, Token, Wei,
};
use artroyalty::engine::FilterSpec;
use artroyalty::orchestration::{Orchestrator, RunParams};
use std::sync::Arc;

const SLUG: &str = "genesis-by-demo";

fn addr(n: u8) -> Address {
    Address::parse(&format!("0x{:040x}", n)).unwrap()
}

fn core_contract() -> Address {
    addr(0x01)
}

fn genesis() -> Project {
    Project {
        project_id: 0,
        name: "Genesis".to_string(),
        artist_address: addr(0xaa),
        curation_status: CurationStatus::Curated,
        additional_payee: None,
        additional_payee_percentage: None,
    }
}

fn subgraph_sale(id: &str, block: u64, price: u128, exchange: Exchange) -> Sale {
    Sale {
        id: id.to_string(),
        exchange,
        sale_type: SaleType::Single,
        block_number: BlockNumber(block),
        block_timestamp: 1_640_000_000,
        seller: addr(0x02),
        buyer: addr(0x03),
        payment_token: Address::zero(),
        price: Wei(price),
        is_private: false,
        summary_tokens_sold: "123".to_string(),
        sale_lookup_tables: vec![SaleLookupTable {
            id: format!("{}::token", id),
            token: Token {
                id: format!("{}-123", core_contract()),
                contract: core_contract(),
                project: genesis(),
            },
        }],
    }
}

fn marketplace_event(tx: &str, block: u64, price: u128) -> MarketplaceEvent {
    MarketplaceEvent {
        transaction_hash: tx.to_string(),
        block_number: BlockNumber(block),
        timestamp: 1_643_673_600,
        seller: addr(0x02),
        buyer: addr(0x03),
        payment_token: Address::zero(),
        total_price: Wei(price),
        is_private: false,
        is_bundle: false,
        assets: vec![EventAsset {
            contract: core_contract(),
            token_number: 123,
            collection_slug: Some(SLUG.to_string()),
        }],
    }
}

fn params() -> RunParams {
    RunParams {
        block_range_lo: 14_000_000,
        block_range_hi: 14_100_000,
        core_contracts: vec![core_contract()],
        filter: FilterSpec::default(),
        looks_rare_fee_percent: 2,
        occurred_before: 2_000_000_000,
    }
}

fn orchestrator(
    sales: MockSalesSource,
    marketplace: MockMarketplaceSource,
) -> Orchestrator {
    let sales = sales.with_project(ProjectRecord {
        contract: core_contract(),
        project: genesis(),
    });
    // Project 0's slug resolves via its first token (number 0).
    let marketplace = marketplace.with_slug(core_contract(), 0, SLUG);
    Orchestrator::new(Arc::new(sales), Arc::new(marketplace))
}

#[tokio::test]
async fn test_merges_both_sources_and_dedupes_by_id() {
    // "0xdup" exists in both sources with different prices; the subgraph
    // record must win. "0xos" is marketplace-only.
    let sales_source = MockSalesSource::new()
        .with_sale(subgraph_sale("0xdup", 14_000_500, 10_000, Exchange::OsV2));
    let marketplace = MockMarketplaceSource::new().with_page(
        SLUG,
        vec![
            marketplace_event("0xdup", 14_000_500, 99_999),
            marketplace_event("0xos", 14_000_600, 5_000),
        ],
    );

    let orchestrator = orchestrator(sales_source, marketplace);
    let sales = orchestrator.fetch_sales(&params()).await.unwrap();

    assert_eq!(sales.len(), 2);
    let dup = sales.iter().find(|s| s.id == "0xdup").unwrap();
    assert_eq!(dup.price, Wei(10_000));
    assert!(sales.iter().any(|s| s.id == "0xos"));
}

#[tokio::test]
async fn test_block_range_enforced_on_merged_sales() {
    // Marketplace pagination is timestamp-cursored, so an event past the
    // range's upper bound can arrive; the merge must drop it.
    let sales_source = MockSalesSource::new();
    let marketplace = MockMarketplaceSource::new().with_page(
        SLUG,
        vec![
            marketplace_event("0xhigh", 14_200_000, 5_000),
            marketplace_event("0xin", 14_000_500, 5_000),
        ],
    );

    let orchestrator = orchestrator(sales_source, marketplace);
    let sales = orchestrator.fetch_sales(&params()).await.unwrap();
    let ids: Vec<&str> = sales.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["0xin"]);
}

#[tokio::test]
async fn test_run_produces_finalized_reports() {
    let sales_source = MockSalesSource::new()
        .with_sale(subgraph_sale("0xa", 14_000_500, 20_000, Exchange::OsV1))
        .with_sale(subgraph_sale("0xb", 14_000_600, 10_000, Exchange::LrV1));
    let marketplace = MockMarketplaceSource::new();

    let orchestrator = orchestrator(sales_source, marketplace);
    let reports = orchestrator.run(&params()).await.unwrap();

    assert_eq!(reports.len(), 1);
    let report = &reports["Genesis"];
    assert_eq!(report.total_sales, 2);
    assert_eq!(report.payment_token_volumes["ETH"].total, Wei(30_000));
    // 5% of 20000 plus 2% of 10000, finalized without a separate call.
    assert_eq!(report.crypto_due["ETH"].to_artist, Wei(1_200));
}

#[tokio::test]
async fn test_empty_result_is_success() {
    let orchestrator = orchestrator(MockSalesSource::new(), MockMarketplaceSource::new());
    let reports = orchestrator.run(&params()).await.unwrap();
    assert!(reports.is_empty());
}

#[tokio::test]
async fn test_run_fails_on_unknown_payment_token() {
    let mut bad = subgraph_sale("0xbad", 14_000_500, 20_000, Exchange::OsV1);
    bad.payment_token = addr(0xee);
    let sales_source = MockSalesSource::new().with_sale(bad);

    let orchestrator = orchestrator(sales_source, MockMarketplaceSource::new());
    assert!(orchestrator.run(&params()).await.is_err());
}
