//! Projects: the royalty beneficiary unit, and the catalog used to resolve
//! marketplace assets back to their project.

use super::{Address, ProjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Tokens are numbered `project_id * 1_000_000 + mint_index` within a contract.
pub const TOKENS_PER_PROJECT: u64 = 1_000_000;

/// Curation tier of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurationStatus {
    Curated,
    Playground,
    Factory,
}

#[derive(Debug, Clone, Error)]
#[error("Unknown curation status: {0}")]
pub struct CurationStatusParseError(String);

impl std::str::FromStr for CurationStatus {
    type Err = CurationStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "curated" => Ok(CurationStatus::Curated),
            "playground" => Ok(CurationStatus::Playground),
            "factory" => Ok(CurationStatus::Factory),
            other => Err(CurationStatusParseError(other.to_string())),
        }
    }
}

impl std::fmt::Display for CurationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurationStatus::Curated => write!(f, "curated"),
            CurationStatus::Playground => write!(f, "playground"),
            CurationStatus::Factory => write!(f, "factory"),
        }
    }
}

/// Read-only reference data for a project. Never mutated by the engine.
///
/// `name` is the aggregation key and must be unique per on-chain project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: ProjectId,
    pub name: String,
    pub artist_address: Address,
    pub curation_status: CurationStatus,
    pub additional_payee: Option<Address>,
    /// Percentage (0-100) of royalties routed to the additional payee.
    pub additional_payee_percentage: Option<u8>,
}

/// A project together with the core contract it lives on, as returned by the
/// subgraph projects query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub contract: Address,
    pub project: Project,
}

/// Lookup from (contract, token number) to the owning project.
///
/// Built once per run from the subgraph projects query; the marketplace
/// importer uses it to normalize assets that arrive without project data.
#[derive(Debug, Clone, Default)]
pub struct ProjectCatalog {
    by_contract_and_project: HashMap<(Address, ProjectId), Project>,
}

impl ProjectCatalog {
    pub fn new(records: &[ProjectRecord]) -> Self {
        let mut by_contract_and_project = HashMap::new();
        for record in records {
            by_contract_and_project.insert(
                (record.contract.clone(), record.project.project_id),
                record.project.clone(),
            );
        }
        Self {
            by_contract_and_project,
        }
    }

    /// Resolve a token number within a contract to its project.
    pub fn resolve(&self, contract: &Address, token_number: u64) -> Option<&Project> {
        let project_id = token_number / TOKENS_PER_PROJECT;
        self.by_contract_and_project
            .get(&(contract.clone(), project_id))
    }

    pub fn is_empty(&self) -> bool {
        self.by_contract_and_project.is_empty()
    }
}
