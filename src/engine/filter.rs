//! Sale filtering: curation and contract narrowing plus royalty eligibility.
//!
//! Filtering is a pure transformation producing new sale values. The original
//! per-token count lives in the untouched summary string, so narrowing the
//! lookup tables never skews downstream price splitting.

use crate::domain::{Address, CurationStatus, Sale};

/// Private sales before this block predate royalty enforcement and paid none.
pub const PRIVATE_SALES_ROYALTY_START_BLOCK: u64 = 13_984_372;

/// Contract allow/deny list. The two variants make the lists structurally
/// mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractFilter {
    Allow(Vec<Address>),
    Deny(Vec<Address>),
}

impl ContractFilter {
    fn passes(&self, contract: &Address) -> bool {
        match self {
            ContractFilter::Allow(list) => list.contains(contract),
            ContractFilter::Deny(list) => !list.contains(contract),
        }
    }
}

/// Narrowing predicates applied to a sale set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub curation: Option<CurationStatus>,
    pub contracts: Option<ContractFilter>,
}

/// Whether a sale owes royalties at all. Evaluated on the original sale,
/// independent of any curation or contract narrowing.
pub fn has_royalties(sale: &Sale) -> bool {
    !sale.is_private || sale.block_number.as_u64() >= PRIVATE_SALES_ROYALTY_START_BLOCK
}

/// Apply the filter spec: drop royalty-ineligible sales, narrow each
/// remaining sale's lookup tables, and drop sales narrowed to nothing.
pub fn filter_sales(sales: Vec<Sale>, spec: &FilterSpec) -> Vec<Sale> {
    sales
        .into_iter()
        .filter(has_royalties)
        .filter_map(|sale| {
            let sale_lookup_tables: Vec<_> = sale
                .sale_lookup_tables
                .iter()
                .filter(|lt| {
                    spec.curation
                        .map_or(true, |status| lt.token.project.curation_status == status)
                })
                .filter(|lt| {
                    spec.contracts
                        .as_ref()
                        .map_or(true, |f| f.passes(&lt.token.contract))
                })
                .cloned()
                .collect();

            if sale_lookup_tables.is_empty() {
                return None;
            }
            Some(Sale {
                sale_lookup_tables,
                ..sale
            })
        })
        .collect()
}
