use artroyalty::domain::{
    Address, BlockNumber, CurationStatus, Exchange, Project, Sale, SaleLookupTable, SaleType,
    Token, Wei,
};
use artroyalty::engine::{
    filter_sales, ContractFilter, FilterSpec, PRIVATE_SALES_ROYALTY_START_BLOCK,
};

fn addr(n: u8) -> Address {
    Address::parse(&format!("0x{:040x}", n)).unwrap()
}

fn project(name: &str, status: CurationStatus) -> Project {
    Project {
        project_id: 0,
        name: name.to_string(),
        artist_address: addr(0xaa),
        curation_status: status,
        additional_payee: None,
        additional_payee_percentage: None,
    }
}

fn lookup(sale_id: &str, contract: Address, name: &str, status: CurationStatus) -> SaleLookupTable {
    SaleLookupTable {
        id: format!("{}::{}-{}", sale_id, contract, name),
        token: Token {
            id: format!("{}-{}", contract, name),
            contract,
            project: project(name, status),
        },
    }
}

fn sale(id: &str, block: u64, is_private: bool, lookups: Vec<SaleLookupTable>) -> Sale {
    let summary = (0..lookups.len().max(1))
        .map(|i| (1_000_000 + i).to_string())
        .collect::<Vec<_>>()
        .join("::");
    Sale {
        id: id.to_string(),
        exchange: Exchange::OsV1,
        sale_type: if lookups.len() > 1 {
            SaleType::Bundle
        } else {
            SaleType::Single
        },
        block_number: BlockNumber(block),
        block_timestamp: 1_640_000_000,
        seller: addr(0x02),
        buyer: addr(0x03),
        payment_token: Address::zero(),
        price: Wei(1_000_000_000_000_000_000),
        is_private,
        summary_tokens_sold: summary,
        sale_lookup_tables: lookups,
    }
}

#[test]
fn test_private_sale_before_threshold_dropped() {
    let sales = vec![
        sale(
            "0xbefore",
            PRIVATE_SALES_ROYALTY_START_BLOCK - 1,
            true,
            vec![lookup("0xbefore", addr(1), "Genesis", CurationStatus::Curated)],
        ),
        sale(
            "0xat",
            PRIVATE_SALES_ROYALTY_START_BLOCK,
            true,
            vec![lookup("0xat", addr(1), "Genesis", CurationStatus::Curated)],
        ),
    ];

    let filtered = filter_sales(sales, &FilterSpec::default());
    let ids: Vec<&str> = filtered.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["0xat"]);
}

#[test]
fn test_public_sale_before_threshold_kept() {
    let sales = vec![sale(
        "0xpub",
        PRIVATE_SALES_ROYALTY_START_BLOCK - 1000,
        false,
        vec![lookup("0xpub", addr(1), "Genesis", CurationStatus::Curated)],
    )];
    assert_eq!(filter_sales(sales, &FilterSpec::default()).len(), 1);
}

#[test]
fn test_curation_filter_narrows_lookup_tables() {
    let sales = vec![sale(
        "0xmix",
        14_100_000,
        false,
        vec![
            lookup("0xmix", addr(1), "Genesis", CurationStatus::Curated),
            lookup("0xmix", addr(1), "Sketchpad", CurationStatus::Playground),
        ],
    )];

    let spec = FilterSpec {
        curation: Some(CurationStatus::Curated),
        contracts: None,
    };
    let filtered = filter_sales(sales, &spec);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].sale_lookup_tables.len(), 1);
    assert_eq!(
        filtered[0].sale_lookup_tables[0].token.project.name,
        "Genesis"
    );
}

#[test]
fn test_sale_dropped_when_narrowed_to_nothing() {
    let sales = vec![sale(
        "0xplay",
        14_100_000,
        false,
        vec![lookup("0xplay", addr(1), "Sketchpad", CurationStatus::Playground)],
    )];

    let spec = FilterSpec {
        curation: Some(CurationStatus::Curated),
        contracts: None,
    };
    assert!(filter_sales(sales, &spec).is_empty());
}

#[test]
fn test_contract_allow_list() {
    let sales = vec![sale(
        "0xab",
        14_100_000,
        false,
        vec![
            lookup("0xab", addr(1), "Genesis", CurationStatus::Curated),
            lookup("0xab", addr(2), "Other", CurationStatus::Curated),
        ],
    )];

    let spec = FilterSpec {
        curation: None,
        contracts: Some(ContractFilter::Allow(vec![addr(1)])),
    };
    let filtered = filter_sales(sales, &spec);
    assert_eq!(filtered[0].sale_lookup_tables.len(), 1);
    assert_eq!(filtered[0].sale_lookup_tables[0].token.contract, addr(1));
}

#[test]
fn test_contract_deny_list() {
    let sales = vec![sale(
        "0xcd",
        14_100_000,
        false,
        vec![
            lookup("0xcd", addr(1), "Genesis", CurationStatus::Curated),
            lookup("0xcd", addr(2), "Other", CurationStatus::Curated),
        ],
    )];

    let spec = FilterSpec {
        curation: None,
        contracts: Some(ContractFilter::Deny(vec![addr(1)])),
    };
    let filtered = filter_sales(sales, &spec);
    assert_eq!(filtered[0].sale_lookup_tables.len(), 1);
    assert_eq!(filtered[0].sale_lookup_tables[0].token.contract, addr(2));
}

#[test]
fn test_original_token_count_survives_narrowing() {
    let sales = vec![sale(
        "0xkeep",
        14_100_000,
        false,
        vec![
            lookup("0xkeep", addr(1), "Genesis", CurationStatus::Curated),
            lookup("0xkeep", addr(1), "Sketchpad", CurationStatus::Playground),
        ],
    )];

    let spec = FilterSpec {
        curation: Some(CurationStatus::Curated),
        contracts: None,
    };
    let filtered = filter_sales(sales, &spec);
    assert_eq!(filtered[0].sale_lookup_tables.len(), 1);
    // The summary encoding is untouched, so price splitting still sees 2.
    assert_eq!(filtered[0].token_count(), 2);
}

#[test]
fn test_filtering_is_idempotent() {
    let sales = vec![
        sale(
            "0x1",
            14_100_000,
            false,
            vec![
                lookup("0x1", addr(1), "Genesis", CurationStatus::Curated),
                lookup("0x1", addr(2), "Other", CurationStatus::Factory),
            ],
        ),
        sale(
            "0x2",
            PRIVATE_SALES_ROYALTY_START_BLOCK - 1,
            true,
            vec![lookup("0x2", addr(1), "Genesis", CurationStatus::Curated)],
        ),
    ];

    let spec = FilterSpec {
        curation: Some(CurationStatus::Curated),
        contracts: Some(ContractFilter::Allow(vec![addr(1)])),
    };
    let once = filter_sales(sales, &spec);
    let twice = filter_sales(once.clone(), &spec);
    assert_eq!(once, twice);
}

#[test]
fn test_empty_input_is_not_an_error() {
    assert!(filter_sales(Vec::new(), &FilterSpec::default()).is_empty());
}
