//! REST client for the OpenSea events API.

use super::{FixedDelayPolicy, MarketplaceSource, SourceError};
use crate::domain::{Address, BlockNumber, EventAsset, EventsPage, MarketplaceEvent, Wei};
use async_trait::async_trait;
use backoff::future::retry;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// OpenSea data source using the v1 REST API.
#[derive(Debug, Clone)]
pub struct OpenSeaSource {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct EventsResponseDto {
    asset_events: Vec<EventDto>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventDto {
    transaction: Option<TransactionDto>,
    seller: Option<AccountDto>,
    winner_account: Option<AccountDto>,
    payment_token: Option<PaymentTokenDto>,
    total_price: Option<String>,
    is_private: Option<bool>,
    asset: Option<AssetDto>,
    asset_bundle: Option<AssetBundleDto>,
}

#[derive(Debug, Deserialize)]
struct TransactionDto {
    transaction_hash: String,
    block_number: String,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct AccountDto {
    address: String,
}

#[derive(Debug, Deserialize)]
struct PaymentTokenDto {
    address: String,
}

#[derive(Debug, Deserialize)]
struct AssetDto {
    token_id: String,
    asset_contract: AssetContractDto,
    collection: Option<CollectionDto>,
}

#[derive(Debug, Deserialize)]
struct AssetContractDto {
    address: String,
}

#[derive(Debug, Deserialize)]
struct CollectionDto {
    slug: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssetBundleDto {
    assets: Vec<AssetDto>,
}

#[derive(Debug, Deserialize)]
struct SingleAssetResponseDto {
    collection: CollectionDto,
}

impl OpenSeaSource {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    /// Create with the default OpenSea API URL.
    pub fn default_url(api_key: String) -> Self {
        Self::new("https://api.opensea.io".to_string(), api_key)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: Vec<(String, String)>,
    ) -> Result<T, SourceError> {
        let policy = FixedDelayPolicy::default();

        retry(policy, || async {
            let response = self
                .client
                .get(&url)
                .header("X-API-KEY", &self.api_key)
                .query(&query)
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
                .json::<T>()
                .await
                .map_err(|e| backoff::Error::permanent(SourceError::Parse(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl MarketplaceSource for OpenSeaSource {
    async fn fetch_events_page(
        &self,
        collection_slug: &str,
        occurred_before: i64,
        cursor: Option<&str>,
    ) -> Result<EventsPage, SourceError> {
        debug!(
            "Fetching events page collection={}, occurred_before={}, cursor={:?}",
            collection_slug, occurred_before, cursor
        );

        let url = format!("{}/api/v1/events", self.base_url);
        let mut query = vec![
            ("collection_slug".to_string(), collection_slug.to_string()),
            ("event_type".to_string(), "successful".to_string()),
            ("occurred_before".to_string(), occurred_before.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor".to_string(), cursor.to_string()));
        }

        let response: EventsResponseDto = self.get_json(url, query).await?;
        let events = response
            .asset_events
            .into_iter()
            .map(parse_event)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EventsPage {
            events,
            next_cursor: response.next,
        })
    }

    async fn resolve_collection_slug(
        &self,
        contract: &Address,
        token_number: u64,
    ) -> Result<String, SourceError> {
        let url = format!(
            "{}/api/v1/asset/{}/{}/",
            self.base_url, contract, token_number
        );
        let response: SingleAssetResponseDto = self.get_json(url, Vec::new()).await?;
        response
            .collection
            .slug
            .ok_or_else(|| SourceError::Parse(format!("asset {}/{} has no slug", contract, token_number)))
    }
}

fn parse_timestamp(value: &str) -> Result<i64, SourceError> {
    // OpenSea renders timestamps without a timezone suffix; they are UTC.
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|_| SourceError::Parse(format!("timestamp: {}", value)))
}

fn parse_asset(dto: AssetDto) -> Result<EventAsset, SourceError> {
    Ok(EventAsset {
        contract: Address::parse(&dto.asset_contract.address)
            .map_err(|e| SourceError::Parse(format!("asset_contract.address: {}", e)))?,
        token_number: dto
            .token_id
            .parse::<u64>()
            .map_err(|_| SourceError::Parse(format!("token_id: {}", dto.token_id)))?,
        collection_slug: dto.collection.and_then(|c| c.slug),
    })
}

fn parse_event(dto: EventDto) -> Result<MarketplaceEvent, SourceError> {
    let transaction = dto
        .transaction
        .ok_or_else(|| SourceError::Parse("event without transaction".to_string()))?;
    let seller = dto
        .seller
        .ok_or_else(|| SourceError::Parse("event without seller".to_string()))?;
    let buyer = dto
        .winner_account
        .ok_or_else(|| SourceError::Parse("event without winner_account".to_string()))?;
    let payment_token = dto
        .payment_token
        .ok_or_else(|| SourceError::Parse("event without payment_token".to_string()))?;
    let total_price = dto
        .total_price
        .ok_or_else(|| SourceError::Parse("event without total_price".to_string()))?;

    let (is_bundle, assets) = match (dto.asset, dto.asset_bundle) {
        (Some(asset), _) => (false, vec![parse_asset(asset)?]),
        (None, Some(bundle)) => (
            true,
            bundle
                .assets
                .into_iter()
                .map(parse_asset)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        (None, None) => {
            return Err(SourceError::Parse(
                "event with neither asset nor asset_bundle".to_string(),
            ))
        }
    };

    Ok(MarketplaceEvent {
        transaction_hash: transaction.transaction_hash,
        block_number: BlockNumber(transaction.block_number.parse::<u64>().map_err(|_| {
            SourceError::Parse(format!("block_number: {}", transaction.block_number))
        })?),
        timestamp: parse_timestamp(&transaction.timestamp)?,
        seller: Address::parse(&seller.address)
            .map_err(|e| SourceError::Parse(format!("seller.address: {}", e)))?,
        buyer: Address::parse(&buyer.address)
            .map_err(|e| SourceError::Parse(format!("winner_account.address: {}", e)))?,
        payment_token: Address::parse(&payment_token.address)
            .map_err(|e| SourceError::Parse(format!("payment_token.address: {}", e)))?,
        total_price: total_price
            .parse::<Wei>()
            .map_err(|_| SourceError::Parse(format!("total_price: {}", total_price)))?,
        is_private: dto.is_private.unwrap_or(false),
        is_bundle,
        assets,
    })
}
