//! Domain types for the royalty reconciliation engine.
//!
//! This module provides:
//! - Validated primitives: Address, Wei (integer amounts), BlockNumber
//! - Sale, SaleLookupTable, Token: the unified sale shape both sources feed
//! - Project reference data and the catalog used to resolve marketplace assets
//! - The static payment-token registry

pub mod event;
pub mod payment;
pub mod primitives;
pub mod project;
pub mod sale;

pub use event::{EventAsset, EventsPage, MarketplaceEvent};
pub use primitives::{Address, AddressParseError, BlockNumber, Wei};
pub use project::{
    CurationStatus, Project, ProjectCatalog, ProjectRecord, TOKENS_PER_PROJECT,
};
pub use sale::{Exchange, MarketplaceFamily, Sale, SaleLookupTable, SaleType, Token};

/// Numeric project id within a core contract.
pub type ProjectId = u64;
