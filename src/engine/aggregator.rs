//! Royalty aggregation: per-project sale volume by payment token and
//! exchange, and the final artist / additional-payee split.

use crate::domain::{
    payment, Address, CurationStatus, Exchange, MarketplaceFamily, Project, ProjectId, Sale, Wei,
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Fee the OpenSea exchange family collects for royalties, percent.
pub const OPENSEA_FEE_PERCENT: u8 = 5;

#[derive(Debug, Error)]
pub enum AggregationError {
    /// A sale paid in a token outside the static registry. Attributing it to
    /// a made-up symbol would corrupt the report, so the run aborts.
    #[error("Unknown payment token {address} on sale {sale}")]
    UnknownPaymentToken { sale: String, address: Address },
    /// A sale whose summary encodes zero tokens cannot split its price.
    #[error("Sale {sale} has a zero token count")]
    InvalidTokenCount { sale: String },
}

/// Sale volume in one payment token: total plus per-exchange sub-totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentTokenVolume {
    pub total: Wei,
    pub by_exchange: BTreeMap<Exchange, Wei>,
}

impl PaymentTokenVolume {
    fn add(&mut self, exchange: Exchange, amount: Wei) {
        self.total += amount;
        *self.by_exchange.entry(exchange).or_default() += amount;
    }

    /// Volume attributable to one marketplace family.
    pub fn family_total(&self, family: MarketplaceFamily) -> Wei {
        self.by_exchange
            .iter()
            .filter(|(exchange, _)| exchange.family() == family)
            .fold(Wei::zero(), |acc, (_, amount)| acc + *amount)
    }
}

/// Royalty amounts owed per payment token, split between the artist and the
/// additional payee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CryptoRepartition {
    pub to_artist: Wei,
    pub to_additional_payee: Wei,
}

/// Per-project aggregate built over one run. Created on the first sale
/// touching the project, mutated by every subsequent one, finalized once via
/// [`compute_crypto_due`](ProjectReport::compute_crypto_due).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReport {
    pub project_id: ProjectId,
    pub name: String,
    pub artist_address: Address,
    pub curation_status: CurationStatus,
    pub additional_payee: Option<Address>,
    pub additional_payee_percentage: Option<u8>,
    pub total_sales: u64,
    /// Keyed by payment-token symbol.
    pub payment_token_volumes: BTreeMap<String, PaymentTokenVolume>,
    /// Keyed by payment-token symbol. Empty until finalization.
    pub crypto_due: BTreeMap<String, CryptoRepartition>,
}

impl ProjectReport {
    fn new(project: &Project) -> Self {
        Self {
            project_id: project.project_id,
            name: project.name.clone(),
            artist_address: project.artist_address.clone(),
            curation_status: project.curation_status,
            additional_payee: project.additional_payee.clone(),
            additional_payee_percentage: project.additional_payee_percentage,
            total_sales: 0,
            payment_token_volumes: BTreeMap::new(),
            crypto_due: BTreeMap::new(),
        }
    }

    /// Derive the amounts due from the accumulated volumes.
    ///
    /// OpenSea-family volume pays the fixed 5% fee; LooksRare volume pays
    /// `looks_rare_fee_percent`. All divisions truncate. The artist and
    /// additional-payee amounts always sum exactly to the royalty due.
    pub fn compute_crypto_due(&mut self, looks_rare_fee_percent: u8) {
        let mut crypto_due = BTreeMap::new();
        for (symbol, volume) in &self.payment_token_volumes {
            let due = volume
                .family_total(MarketplaceFamily::OpenSea)
                .percent(OPENSEA_FEE_PERCENT)
                + volume
                    .family_total(MarketplaceFamily::LooksRare)
                    .percent(looks_rare_fee_percent);

            let to_additional_payee = match (&self.additional_payee, self.additional_payee_percentage)
            {
                (Some(_), Some(pct)) => due.percent(pct),
                _ => Wei::zero(),
            };
            crypto_due.insert(
                symbol.clone(),
                CryptoRepartition {
                    to_artist: due - to_additional_payee,
                    to_additional_payee,
                },
            );
        }
        self.crypto_due = crypto_due;
    }
}

/// Accumulates filtered sales into per-project reports, keyed by project name.
#[derive(Debug, Default)]
pub struct RoyaltyAggregator {
    reports: BTreeMap<String, ProjectReport>,
}

impl RoyaltyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one filtered sale.
    ///
    /// The sale's price is split evenly (truncating) across its original
    /// token count; each surviving lookup table adds one share to its
    /// project. The truncation remainder is an accepted rounding loss and is
    /// never redistributed.
    pub fn ingest(&mut self, sale: &Sale) -> Result<(), AggregationError> {
        let token_count = sale.token_count();
        if token_count == 0 {
            return Err(AggregationError::InvalidTokenCount {
                sale: sale.id.clone(),
            });
        }
        let symbol = payment::lookup(&sale.payment_token)
            .ok_or_else(|| AggregationError::UnknownPaymentToken {
                sale: sale.id.clone(),
                address: sale.payment_token.clone(),
            })?
            .symbol;
        let share = sale.price.div_floor(token_count);

        let touched: BTreeSet<&str> = sale
            .sale_lookup_tables
            .iter()
            .map(|lt| lt.token.project.name.as_str())
            .collect();

        for lookup_table in &sale.sale_lookup_tables {
            let project = &lookup_table.token.project;
            let report = self
                .reports
                .entry(project.name.clone())
                .or_insert_with(|| ProjectReport::new(project));
            report
                .payment_token_volumes
                .entry(symbol.to_string())
                .or_default()
                .add(sale.exchange, share);
        }

        // Each distinct project counts the sale once, regardless of how many
        // of its tokens the sale moved.
        for name in touched {
            if let Some(report) = self.reports.get_mut(name) {
                report.total_sales += 1;
            }
        }
        Ok(())
    }

    /// Consume the aggregator, yielding reports keyed by project name.
    pub fn into_reports(self) -> BTreeMap<String, ProjectReport> {
        self.reports
    }

    /// Aggregate a filtered sale list into un-finalized reports.
    pub fn build_reports(
        sales: &[Sale],
    ) -> Result<BTreeMap<String, ProjectReport>, AggregationError> {
        let mut aggregator = RoyaltyAggregator::new();
        for sale in sales {
            aggregator.ingest(sale)?;
        }
        Ok(aggregator.into_reports())
    }
}
