use anyhow::{Context, Result};
use sea_orm::Database;
use tracing::{debug, info, trace};

pub async fn import_exchanges(csv_path: &str, database_url: &str) -> Result<()> {
    trace!("Entering import_exchanges function");
    info!("Importing supported exchanges from {}", csv_path);
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    let report = finnhub::import_supported_exchanges_from_path(&db, csv_path)
        .await
        .with_context(|| format!("Failed to import exchanges from '{}'", csv_path))?;

    info!(
        "Exchange import finished: {} imported, {} skipped",
        report.imported, report.skipped
    );
    Ok(())
}
