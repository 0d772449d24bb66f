use crate::domain::{Address, CurationStatus};
use crate::engine::{ContractFilter, FilterSpec};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub subgraph_url: String,
    pub opensea_api_url: String,
    pub opensea_api_key: String,
    pub block_range_lo: u64,
    pub block_range_hi: u64,
    pub core_contracts: Vec<Address>,
    pub looks_rare_fee_percent: u8,
    pub filter: FilterSpec,
    pub output_path: String,
    /// Marketplace cursor start, epoch seconds. Defaults to "now" at run time.
    pub occurred_before: Option<i64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let subgraph_url = env_map
            .get("SUBGRAPH_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("SUBGRAPH_URL".to_string()))?;

        let opensea_api_url = env_map
            .get("OPENSEA_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://api.opensea.io".to_string());

        let opensea_api_key = env_map
            .get("OPENSEA_API_KEY")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("OPENSEA_API_KEY".to_string()))?;

        let block_range_lo = parse_u64_var(&env_map, "BLOCK_RANGE_START")?;
        let block_range_hi = parse_u64_var(&env_map, "BLOCK_RANGE_END")?;
        if block_range_lo >= block_range_hi {
            return Err(ConfigError::InvalidValue(
                "BLOCK_RANGE_END".to_string(),
                format!(
                    "must be greater than BLOCK_RANGE_START ({} >= {})",
                    block_range_lo, block_range_hi
                ),
            ));
        }

        let core_contracts = parse_address_list(&env_map, "CORE_CONTRACTS")?
            .ok_or_else(|| ConfigError::MissingEnv("CORE_CONTRACTS".to_string()))?;
        if core_contracts.is_empty() {
            return Err(ConfigError::InvalidValue(
                "CORE_CONTRACTS".to_string(),
                "must list at least one contract address".to_string(),
            ));
        }

        let looks_rare_fee_percent = env_map
            .get("LOOKS_RARE_FEE_PERCENT")
            .map(|s| s.as_str())
            .unwrap_or("5")
            .parse::<u8>()
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "LOOKS_RARE_FEE_PERCENT".to_string(),
                    "must be an integer percentage in 0..=100".to_string(),
                )
            })?;

        let curation = env_map
            .get("CURATION_FILTER")
            .map(|s| {
                s.parse::<CurationStatus>().map_err(|_| {
                    ConfigError::InvalidValue(
                        "CURATION_FILTER".to_string(),
                        format!("must be curated, playground, or factory, got {}", s),
                    )
                })
            })
            .transpose()?;

        let allow_list = parse_address_list(&env_map, "CONTRACT_ALLOW_LIST")?;
        let deny_list = parse_address_list(&env_map, "CONTRACT_DENY_LIST")?;
        let contracts = match (allow_list, deny_list) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::InvalidValue(
                    "CONTRACT_ALLOW_LIST".to_string(),
                    "cannot be combined with CONTRACT_DENY_LIST".to_string(),
                ))
            }
            (Some(list), None) => Some(ContractFilter::Allow(list)),
            (None, Some(list)) => Some(ContractFilter::Deny(list)),
            (None, None) => None,
        };

        let output_path = env_map
            .get("OUTPUT_CSV")
            .cloned()
            .unwrap_or_else(|| "royalties.csv".to_string());

        let occurred_before = env_map
            .get("OCCURRED_BEFORE")
            .map(|s| {
                s.parse::<i64>().map_err(|_| {
                    ConfigError::InvalidValue(
                        "OCCURRED_BEFORE".to_string(),
                        "must be an epoch-seconds timestamp".to_string(),
                    )
                })
            })
            .transpose()?;

        Ok(Config {
            subgraph_url,
            opensea_api_url,
            opensea_api_key,
            block_range_lo,
            block_range_hi,
            core_contracts,
            looks_rare_fee_percent,
            filter: FilterSpec {
                curation,
                contracts,
            },
            output_path,
            occurred_before,
        })
    }
}

fn parse_u64_var(env_map: &HashMap<String, String>, name: &str) -> Result<u64, ConfigError> {
    env_map
        .get(name)
        .ok_or_else(|| ConfigError::MissingEnv(name.to_string()))?
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue(name.to_string(), "must be a valid u64".to_string()))
}

fn parse_address_list(
    env_map: &HashMap<String, String>,
    name: &str,
) -> Result<Option<Vec<Address>>, ConfigError> {
    match env_map.get(name) {
        None => Ok(None),
        Some(value) => value
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                Address::parse(s)
                    .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
    }
}
