//! Mock data sources for testing without network calls.

use super::{MarketplaceSource, SalesSource, SourceError};
use crate::domain::{Address, EventsPage, MarketplaceEvent, ProjectRecord, Sale};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Mock subgraph source serving sales from an in-memory list.
///
/// Pages are produced the way the real subgraph does: filter to
/// `[block_gte, block_lt)`, order descending by block number, truncate to
/// `first`. Every query is recorded so tests can assert pagination behavior.
#[derive(Debug, Default)]
pub struct MockSalesSource {
    sales: Vec<Sale>,
    projects: Vec<ProjectRecord>,
    queries: Mutex<Vec<(u64, u64)>>,
}

impl MockSalesSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sale(mut self, sale: Sale) -> Self {
        self.sales.push(sale);
        self
    }

    pub fn with_sales(mut self, sales: Vec<Sale>) -> Self {
        self.sales.extend(sales);
        self
    }

    pub fn with_project(mut self, record: ProjectRecord) -> Self {
        self.projects.push(record);
        self
    }

    /// The `(block_gte, block_lt)` pairs of every sales query issued so far.
    pub fn recorded_queries(&self) -> Vec<(u64, u64)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SalesSource for MockSalesSource {
    async fn fetch_sales_page(
        &self,
        block_gte: u64,
        block_lt: u64,
        first: usize,
        skip: usize,
    ) -> Result<Vec<Sale>, SourceError> {
        self.queries.lock().unwrap().push((block_gte, block_lt));

        let mut page: Vec<Sale> = self
            .sales
            .iter()
            .filter(|s| s.block_number.as_u64() >= block_gte && s.block_number.as_u64() < block_lt)
            .cloned()
            .collect();
        page.sort_by(|a, b| {
            b.block_number
                .cmp(&a.block_number)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(page.into_iter().skip(skip).take(first).collect())
    }

    async fn fetch_projects(
        &self,
        contracts: &[Address],
    ) -> Result<Vec<ProjectRecord>, SourceError> {
        Ok(self
            .projects
            .iter()
            .filter(|r| contracts.contains(&r.contract))
            .cloned()
            .collect())
    }
}

/// Mock marketplace source serving pre-programmed event pages per collection.
///
/// Cursors are the page index rendered as a string; the last page carries no
/// next cursor.
#[derive(Debug, Default)]
pub struct MockMarketplaceSource {
    pages_by_slug: HashMap<String, Vec<Vec<MarketplaceEvent>>>,
    slugs_by_token: HashMap<(Address, u64), String>,
    page_fetches: Mutex<Vec<(String, Option<String>)>>,
}

impl MockMarketplaceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page of events for a collection.
    pub fn with_page(mut self, slug: &str, events: Vec<MarketplaceEvent>) -> Self {
        self.pages_by_slug
            .entry(slug.to_string())
            .or_default()
            .push(events);
        self
    }

    /// Register the slug returned by `resolve_collection_slug` for a token.
    pub fn with_slug(mut self, contract: Address, token_number: u64, slug: &str) -> Self {
        self.slugs_by_token
            .insert((contract, token_number), slug.to_string());
        self
    }

    /// The `(slug, cursor)` pairs of every events-page fetch so far.
    pub fn recorded_fetches(&self) -> Vec<(String, Option<String>)> {
        self.page_fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketplaceSource for MockMarketplaceSource {
    async fn fetch_events_page(
        &self,
        collection_slug: &str,
        _occurred_before: i64,
        cursor: Option<&str>,
    ) -> Result<EventsPage, SourceError> {
        self.page_fetches
            .lock()
            .unwrap()
            .push((collection_slug.to_string(), cursor.map(str::to_string)));

        let pages = match self.pages_by_slug.get(collection_slug) {
            Some(pages) => pages,
            None => return Ok(EventsPage::default()),
        };
        let index: usize = match cursor {
            None => 0,
            Some(c) => c
                .parse()
                .map_err(|_| SourceError::Parse(format!("bad cursor: {}", c)))?,
        };
        let events = pages.get(index).cloned().unwrap_or_default();
        let next_cursor = if index + 1 < pages.len() {
            Some((index + 1).to_string())
        } else {
            None
        };
        Ok(EventsPage {
            events,
            next_cursor,
        })
    }

    async fn resolve_collection_slug(
        &self,
        contract: &Address,
        token_number: u64,
    ) -> Result<String, SourceError> {
        self.slugs_by_token
            .get(&(contract.clone(), token_number))
            .cloned()
            .ok_or_else(|| SourceError::Http {
                status: 404,
                message: format!("no asset {}/{}", contract, token_number),
            })
    }
}
