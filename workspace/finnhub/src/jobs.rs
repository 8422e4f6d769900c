//! Bulk reference-data jobs run from the CLI.
//!
//! Both jobs upsert on the table's unique key, so a rerun refreshes existing
//! rows instead of failing on duplicates.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use model::entities::prelude::{SupportedExchange, SupportedSymbol};
use model::entities::{supported_exchange, supported_symbol};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::client::FinnhubClient;
use crate::error::{FinnhubError, Result};

const MAX_EXCHANGE_CODE_LEN: usize = 4;
const SYMBOL_BATCH_SIZE: usize = 100;

/// One row of the exchange reference file. Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
struct ExchangeRow {
    code: String,
    name: String,
    timezone: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub exchanges: usize,
    pub symbols: usize,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Upserts every exchange listed in `csv` (header row required).
#[instrument(skip(db, csv))]
pub async fn import_supported_exchanges<C, R>(db: &C, csv: R) -> Result<ImportReport>
where
    C: ConnectionTrait,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv);

    let mut report = ImportReport::default();
    for row in reader.deserialize::<ExchangeRow>() {
        let row = row?;
        if row.code.is_empty() || row.code.chars().count() > MAX_EXCHANGE_CODE_LEN {
            warn!("Skipping exchange with unusable code '{}'", row.code);
            report.skipped += 1;
            continue;
        }

        let exchange = supported_exchange::ActiveModel {
            code: Set(row.code.clone()),
            name: Set(row.name),
            timezone: Set(non_empty(row.timezone)),
            country: Set(non_empty(row.country)),
            ..Default::default()
        };

        SupportedExchange::insert(exchange)
            .on_conflict(
                OnConflict::column(supported_exchange::Column::Code)
                    .update_columns([
                        supported_exchange::Column::Name,
                        supported_exchange::Column::Timezone,
                        supported_exchange::Column::Country,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;

        debug!("Upserted exchange {}", row.code);
        report.imported += 1;
    }

    info!(
        "Imported {} exchanges ({} skipped)",
        report.imported, report.skipped
    );
    Ok(report)
}

pub async fn import_supported_exchanges_from_path<C: ConnectionTrait>(
    db: &C,
    path: impl AsRef<Path>,
) -> Result<ImportReport> {
    let file = File::open(path.as_ref())?;
    import_supported_exchanges(db, file).await
}

/// Fetches the symbol list of each exchange code and upserts it.
///
/// Every code must already be in `supported_exchanges`. `client` must be ready.
#[instrument(skip(client, db))]
pub async fn download_symbols<C: ConnectionTrait>(
    client: &FinnhubClient,
    db: &C,
    codes: &[String],
) -> Result<DownloadReport> {
    let mut report = DownloadReport::default();

    for code in codes {
        let exchange = SupportedExchange::find()
            .filter(supported_exchange::Column::Code.eq(code.as_str()))
            .one(db)
            .await?
            .ok_or_else(|| FinnhubError::UnknownExchange(code.clone()))?;

        let listed = client.stock_symbols(&exchange.code).await?;
        debug!("{} symbols listed for {}", listed.len(), exchange.code);

        let mut seen = HashSet::new();
        let rows: Vec<supported_symbol::ActiveModel> = listed
            .into_iter()
            .filter(|s| !s.symbol.trim().is_empty() && seen.insert(s.symbol.clone()))
            .map(|s| supported_symbol::ActiveModel {
                display_symbol: Set(if s.display_symbol.is_empty() {
                    s.symbol.clone()
                } else {
                    s.display_symbol
                }),
                symbol: Set(s.symbol),
                currency: Set(non_empty(Some(s.currency))),
                description: Set(non_empty(Some(s.description))),
                symbol_type: Set(non_empty(Some(s.symbol_type))),
                exchange_id: Set(exchange.id),
                ..Default::default()
            })
            .collect();

        for batch in rows.chunks(SYMBOL_BATCH_SIZE) {
            SupportedSymbol::insert_many(batch.iter().cloned())
                .on_conflict(
                    OnConflict::column(supported_symbol::Column::Symbol)
                        .update_columns([
                            supported_symbol::Column::DisplaySymbol,
                            supported_symbol::Column::Currency,
                            supported_symbol::Column::Description,
                            supported_symbol::Column::SymbolType,
                            supported_symbol::Column::ExchangeId,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(db)
                .await?;
        }

        info!("Stored {} symbols for exchange {}", rows.len(), exchange.code);
        report.exchanges += 1;
        report.symbols += rows.len();
    }

    Ok(report)
}
