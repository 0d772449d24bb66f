//! GraphQL client for the indexed sales subgraph.

use super::{FixedDelayPolicy, SalesSource, SourceError};
use crate::domain::{
    Address, BlockNumber, CurationStatus, Exchange, Project, ProjectRecord, Sale, SaleLookupTable,
    SaleType, Token, Wei,
};
use async_trait::async_trait;
use backoff::future::retry;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Page size for the paginated projects query. Sales paging is driven by the
/// range fetcher, which passes its own `first`.
const PROJECTS_PAGE_SIZE: usize = 1000;

/// Subgraph data source speaking GraphQL over POST.
#[derive(Debug, Clone)]
pub struct SubgraphSource {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SaleDto {
    id: String,
    exchange: String,
    #[serde(rename = "saleType")]
    sale_type: String,
    #[serde(rename = "blockNumber")]
    block_number: String,
    #[serde(rename = "blockTimestamp")]
    block_timestamp: String,
    seller: String,
    buyer: String,
    #[serde(rename = "paymentToken")]
    payment_token: String,
    price: String,
    #[serde(rename = "isPrivate")]
    is_private: bool,
    #[serde(rename = "summaryTokensSold")]
    summary_tokens_sold: String,
    #[serde(rename = "saleLookUpTables")]
    sale_look_up_tables: Vec<SaleLookupTableDto>,
}

#[derive(Debug, Deserialize)]
struct SaleLookupTableDto {
    id: String,
    token: TokenDto,
}

#[derive(Debug, Deserialize)]
struct TokenDto {
    id: String,
    contract: ContractDto,
    project: ProjectDto,
}

#[derive(Debug, Deserialize)]
struct ContractDto {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProjectDto {
    #[serde(rename = "projectId")]
    project_id: String,
    name: String,
    #[serde(rename = "artistAddress")]
    artist_address: String,
    #[serde(rename = "curationStatus")]
    curation_status: String,
    #[serde(rename = "additionalPayee")]
    additional_payee: Option<String>,
    #[serde(rename = "additionalPayeePercentage")]
    additional_payee_percentage: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectRecordDto {
    id: String,
    contract: ContractDto,
    #[serde(flatten)]
    project: ProjectDto,
}

const SALE_FIELDS: &str = r#"
    id
    exchange
    saleType
    blockNumber
    blockTimestamp
    seller
    buyer
    paymentToken
    price
    isPrivate
    summaryTokensSold
    saleLookUpTables {
      id
      token {
        id
        contract { id }
        project {
          projectId
          name
          artistAddress
          curationStatus
          additionalPayee
          additionalPayeePercentage
        }
      }
    }
"#;

impl SubgraphSource {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }

    async fn post_query(&self, query: String) -> Result<serde_json::Value, SourceError> {
        let policy = FixedDelayPolicy::default();

        let response = retry(policy, || async {
            let response = self
                .client
                .post(&self.url)
                .json(&serde_json::json!({ "query": query }))
                .send()
                .await
                .map_err(|e| backoff::Error::transient(SourceError::Network(e.to_string())))?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(SourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(SourceError::Http {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(SourceError::Http {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<GraphQlResponse>()
                .await
                .map_err(|e| backoff::Error::permanent(SourceError::Parse(e.to_string())))
        })
        .await?;

        if let Some(errors) = response.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(SourceError::Query(messages.join("; ")));
        }
        response
            .data
            .ok_or_else(|| SourceError::Parse("GraphQL response without data".to_string()))
    }
}

#[async_trait]
impl SalesSource for SubgraphSource {
    async fn fetch_sales_page(
        &self,
        block_gte: u64,
        block_lt: u64,
        first: usize,
        skip: usize,
    ) -> Result<Vec<Sale>, SourceError> {
        debug!(
            "Fetching sales page block_gte={}, block_lt={}, first={}, skip={}",
            block_gte, block_lt, first, skip
        );

        let query = format!(
            r#"{{
  sales(
    where: {{ blockNumber_gte: {block_gte}, blockNumber_lt: {block_lt} }}
    first: {first}
    skip: {skip}
    orderBy: blockNumber
    orderDirection: desc
  ) {{{SALE_FIELDS}}}
}}"#
        );

        let data = self.post_query(query).await?;
        let dtos: Vec<SaleDto> = serde_json::from_value(
            data.get("sales")
                .cloned()
                .ok_or_else(|| SourceError::Parse("missing sales field".to_string()))?,
        )
        .map_err(|e| SourceError::Parse(e.to_string()))?;

        dtos.into_iter().map(parse_sale).collect()
    }

    async fn fetch_projects(
        &self,
        contracts: &[Address],
    ) -> Result<Vec<ProjectRecord>, SourceError> {
        let contract_list = contracts
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut records = Vec::new();
        let mut last_id = String::new();
        loop {
            let query = format!(
                r#"{{
  projects(
    where: {{ contract_in: [{contract_list}], id_gt: "{last_id}" }}
    first: {PROJECTS_PAGE_SIZE}
    orderBy: id
    orderDirection: asc
  ) {{
    id
    contract {{ id }}
    projectId
    name
    artistAddress
    curationStatus
    additionalPayee
    additionalPayeePercentage
  }}
}}"#
            );

            let data = self.post_query(query).await?;
            let dtos: Vec<ProjectRecordDto> = serde_json::from_value(
                data.get("projects")
                    .cloned()
                    .ok_or_else(|| SourceError::Parse("missing projects field".to_string()))?,
            )
            .map_err(|e| SourceError::Parse(e.to_string()))?;

            let page_len = dtos.len();
            for dto in dtos {
                last_id = dto.id.clone();
                records.push(parse_project_record(dto)?);
            }
            if page_len < PROJECTS_PAGE_SIZE {
                break;
            }
        }

        debug!("Fetched {} projects", records.len());
        Ok(records)
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address, SourceError> {
    Address::parse(value).map_err(|e| SourceError::Parse(format!("{}: {}", field, e)))
}

fn parse_u64(field: &str, value: &str) -> Result<u64, SourceError> {
    value
        .parse::<u64>()
        .map_err(|_| SourceError::Parse(format!("{}: not a u64: {}", field, value)))
}

fn parse_project(dto: ProjectDto) -> Result<Project, SourceError> {
    let additional_payee = dto
        .additional_payee
        .as_deref()
        .map(|s| parse_address("additionalPayee", s))
        .transpose()?;
    let additional_payee_percentage = dto
        .additional_payee_percentage
        .as_deref()
        .map(|s| {
            s.parse::<u8>().ok().filter(|p| *p <= 100).ok_or_else(|| {
                SourceError::Parse(format!("additionalPayeePercentage out of range: {}", s))
            })
        })
        .transpose()?;

    Ok(Project {
        project_id: parse_u64("projectId", &dto.project_id)?,
        name: dto.name,
        artist_address: parse_address("artistAddress", &dto.artist_address)?,
        curation_status: dto
            .curation_status
            .parse::<CurationStatus>()
            .map_err(|e| SourceError::Parse(e.to_string()))?,
        additional_payee,
        additional_payee_percentage,
    })
}

fn parse_project_record(dto: ProjectRecordDto) -> Result<ProjectRecord, SourceError> {
    Ok(ProjectRecord {
        contract: parse_address("contract.id", &dto.contract.id)?,
        project: parse_project(dto.project)?,
    })
}

fn parse_sale(dto: SaleDto) -> Result<Sale, SourceError> {
    let sale_lookup_tables = dto
        .sale_look_up_tables
        .into_iter()
        .map(|lt| {
            Ok(SaleLookupTable {
                id: lt.id,
                token: Token {
                    id: lt.token.id,
                    contract: parse_address("token.contract.id", &lt.token.contract.id)?,
                    project: parse_project(lt.token.project)?,
                },
            })
        })
        .collect::<Result<Vec<_>, SourceError>>()?;

    Ok(Sale {
        id: dto.id,
        exchange: dto
            .exchange
            .parse::<Exchange>()
            .map_err(|e| SourceError::Parse(e.to_string()))?,
        sale_type: dto
            .sale_type
            .parse::<SaleType>()
            .map_err(|e| SourceError::Parse(e.to_string()))?,
        block_number: BlockNumber(parse_u64("blockNumber", &dto.block_number)?),
        block_timestamp: parse_u64("blockTimestamp", &dto.block_timestamp)? as i64,
        seller: parse_address("seller", &dto.seller)?,
        buyer: parse_address("buyer", &dto.buyer)?,
        payment_token: parse_address("paymentToken", &dto.payment_token)?,
        price: dto
            .price
            .parse::<Wei>()
            .map_err(|_| SourceError::Parse(format!("price: not an integer: {}", dto.price)))?,
        is_private: dto.is_private,
        summary_tokens_sold: dto.summary_tokens_sold,
        sale_lookup_tables,
    })
}
