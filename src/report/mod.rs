//! CSV export of finalized project reports.

use crate::domain::{payment, MarketplaceFamily, Wei};
use crate::engine::{CryptoRepartition, ProjectReport};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown payment token symbol in report: {0}")]
    UnknownSymbol(String),
    #[error("Amount too large to render: {0}")]
    AmountOverflow(Wei),
}

const HEADER: &[&str] = &[
    "project",
    "artist_address",
    "additional_payee",
    "additional_payee_percentage",
    "total_sales",
    "payment_token",
    "total_volume",
    "opensea_volume",
    "looksrare_volume",
    "due_to_artist",
    "due_to_additional_payee",
];

/// Render a wei-denominated amount in token units (e.g. 1.5 for 1.5 ETH).
///
/// `Decimal` carries a 96-bit mantissa, so amounts at or above 2^96 cannot
/// be represented and surface as `AmountOverflow`.
fn to_token_units(amount: Wei, decimals: u32) -> Result<Decimal, ReportError> {
    let raw = i128::try_from(amount.as_u128()).map_err(|_| ReportError::AmountOverflow(amount))?;
    Decimal::try_from_i128_with_scale(raw, decimals)
        .map(|d| d.normalize())
        .map_err(|_| ReportError::AmountOverflow(amount))
}

/// Write one CSV row per (project, payment token). Row order is
/// deterministic because both report and volume maps are ordered.
pub fn write_reports<W: Write>(
    writer: W,
    reports: &BTreeMap<String, ProjectReport>,
) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for report in reports.values() {
        for (symbol, volume) in &report.payment_token_volumes {
            let info = payment::symbol_info(symbol)
                .ok_or_else(|| ReportError::UnknownSymbol(symbol.clone()))?;
            let due = report
                .crypto_due
                .get(symbol)
                .cloned()
                .unwrap_or_else(CryptoRepartition::default);

            csv_writer.write_record(&[
                report.name.clone(),
                report.artist_address.to_string(),
                report
                    .additional_payee
                    .as_ref()
                    .map(|a| a.to_string())
                    .unwrap_or_default(),
                report
                    .additional_payee_percentage
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
                report.total_sales.to_string(),
                symbol.clone(),
                to_token_units(volume.total, info.decimals)?.to_string(),
                to_token_units(volume.family_total(MarketplaceFamily::OpenSea), info.decimals)?
                    .to_string(),
                to_token_units(
                    volume.family_total(MarketplaceFamily::LooksRare),
                    info.decimals,
                )?
                .to_string(),
                to_token_units(due.to_artist, info.decimals)?.to_string(),
                to_token_units(due.to_additional_payee, info.decimals)?.to_string(),
            ])?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the reports to a CSV file at `path`.
pub fn write_reports_file(
    path: &Path,
    reports: &BTreeMap<String, ProjectReport>,
) -> Result<(), ReportError> {
    let file = std::fs::File::create(path)?;
    write_reports(file, reports)?;
    info!("Wrote {} project report(s) to {}", reports.len(), path.display());
    Ok(())
}
