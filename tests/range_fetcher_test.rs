use artroyalty::datasource::MockSalesSource;
use artroyalty::domain::{
    Address, BlockNumber, CurationStatus, Exchange, Project, Sale, SaleLookupTable, SaleType,
    Token, Wei,
};
use artroyalty::engine::{FetchError, RangeFetcher};
use std::collections::HashSet;
use std::sync::Arc;

fn addr(n: u8) -> Address {
    Address::parse(&format!("0x{:040x}", n)).unwrap()
}

fn project() -> Project {
    Project {
        project_id: 0,
        name: "Genesis".to_string(),
        artist_address: addr(0xaa),
        curation_status: CurationStatus::Curated,
        additional_payee: None,
        additional_payee_percentage: None,
    }
}

fn sale(id: &str, block: u64) -> Sale {
    let token = Token {
        id: format!("{}-{}", addr(0x01), 1),
        contract: addr(0x01),
        project: project(),
    };
    Sale {
        id: id.to_string(),
        exchange: Exchange::OsV1,
        sale_type: SaleType::Single,
        block_number: BlockNumber(block),
        block_timestamp: 1_640_000_000,
        seller: addr(0x02),
        buyer: addr(0x03),
        payment_token: Address::zero(),
        price: Wei(1_000_000_000_000_000_000),
        is_private: false,
        summary_tokens_sold: "1".to_string(),
        sale_lookup_tables: vec![SaleLookupTable {
            id: format!("{}::token", id),
            token,
        }],
    }
}

/// Build `count` sales all sharing one block number.
fn block_of_sales(block: u64, count: usize) -> Vec<Sale> {
    (0..count)
        .map(|i| sale(&format!("0x{}-{}", block, i), block))
        .collect()
}

#[tokio::test]
async fn test_short_page_needs_single_query() {
    let source = Arc::new(
        MockSalesSource::new().with_sales(vec![sale("0xa", 150), sale("0xb", 120)]),
    );
    let fetcher = RangeFetcher::new(source.clone());

    let sales = fetcher.fetch_sales(100, 200).await.unwrap();
    assert_eq!(sales.len(), 2);
    assert_eq!(source.recorded_queries(), vec![(100, 200)]);
}

#[tokio::test]
async fn test_full_page_splits_on_block_boundary() {
    // 600 sales at block 200 and 600 at block 100: the first page truncates
    // mid-block-100, so the fetcher must discard the partial block and
    // re-query below block 200.
    let mut sales = block_of_sales(200, 600);
    sales.extend(block_of_sales(100, 600));
    let source = Arc::new(MockSalesSource::new().with_sales(sales));
    let fetcher = RangeFetcher::new(source.clone());

    let fetched = fetcher.fetch_sales(0, 1000).await.unwrap();

    assert_eq!(source.recorded_queries(), vec![(0, 1000), (0, 200)]);
    assert_eq!(fetched.len(), 1200);

    // Exactly once each: no sale dropped, none double-counted.
    let ids: HashSet<&str> = fetched.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids.len(), 1200);
    assert_eq!(
        fetched
            .iter()
            .filter(|s| s.block_number == BlockNumber(200))
            .count(),
        600
    );
    assert_eq!(
        fetched
            .iter()
            .filter(|s| s.block_number == BlockNumber(100))
            .count(),
        600
    );
}

#[tokio::test]
async fn test_multiple_boundary_iterations() {
    // Three blocks of 700 sales each force two boundary splits.
    let mut sales = block_of_sales(300, 700);
    sales.extend(block_of_sales(200, 700));
    sales.extend(block_of_sales(100, 700));
    let source = Arc::new(MockSalesSource::new().with_sales(sales));
    let fetcher = RangeFetcher::new(source.clone());

    let fetched = fetcher.fetch_sales(0, 1000).await.unwrap();
    assert_eq!(fetched.len(), 2100);
    let ids: HashSet<&str> = fetched.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids.len(), 2100);

    let queries = source.recorded_queries();
    assert_eq!(queries[0], (0, 1000));
    // Each follow-up query upper bound strictly decreases.
    for pair in queries.windows(2) {
        assert!(pair[1].1 < pair[0].1);
    }
}

#[tokio::test]
async fn test_result_ordered_descending_by_block() {
    let mut sales = block_of_sales(500, 400);
    sales.extend(block_of_sales(400, 700));
    sales.extend(block_of_sales(300, 200));
    let source = Arc::new(MockSalesSource::new().with_sales(sales));
    let fetcher = RangeFetcher::new(source);

    let fetched = fetcher.fetch_sales(0, 1000).await.unwrap();
    assert_eq!(fetched.len(), 1300);
    for pair in fetched.windows(2) {
        assert!(pair[0].block_number >= pair[1].block_number);
    }
}

#[tokio::test]
async fn test_single_block_filling_page_is_fatal() {
    // 1000 sales in one block: no splittable boundary exists.
    let source = Arc::new(MockSalesSource::new().with_sales(block_of_sales(50, 1000)));
    let fetcher = RangeFetcher::new(source);

    let result = fetcher.fetch_sales(0, 100).await;
    assert!(matches!(
        result,
        Err(FetchError::PageOverflow { block: 50, .. })
    ));
}

#[tokio::test]
async fn test_empty_range_returns_nothing() {
    let source = Arc::new(MockSalesSource::new().with_sale(sale("0xa", 150)));
    let fetcher = RangeFetcher::new(source.clone());

    let fetched = fetcher.fetch_sales(200, 200).await.unwrap();
    assert!(fetched.is_empty());
    assert!(source.recorded_queries().is_empty());
}

#[tokio::test]
async fn test_range_bounds_are_half_open() {
    let source = Arc::new(MockSalesSource::new().with_sales(vec![
        sale("0xlo", 100),
        sale("0xmid", 150),
        sale("0xhi", 200),
    ]));
    let fetcher = RangeFetcher::new(source);

    let fetched = fetcher.fetch_sales(100, 200).await.unwrap();
    let ids: Vec<&str> = fetched.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["0xmid", "0xlo"]);
}
