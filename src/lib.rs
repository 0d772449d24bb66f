pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod report;

pub use config::Config;
pub use datasource::{
    MarketplaceSource, MockMarketplaceSource, MockSalesSource, OpenSeaSource, SalesSource,
    SourceError, SubgraphSource,
};
pub use domain::{
    Address, BlockNumber, CurationStatus, Exchange, MarketplaceFamily, Project, ProjectCatalog,
    ProjectRecord, Sale, SaleLookupTable, SaleType, Token, Wei,
};
pub use engine::{
    filter_sales, ContractFilter, FilterSpec, MarketplaceImporter, ProjectReport, RangeFetcher,
    RoyaltyAggregator,
};
pub use error::RunError;
pub use orchestration::{Orchestrator, RunParams};
