use anyhow::{bail, Context, Result};
use sea_orm::Database;
use tracing::{debug, error, info, trace};

use crate::config::Settings;

pub async fn download_symbols(exchanges: &[String], api_key: &str, database_url: &str) -> Result<()> {
    trace!("Entering download_symbols function");
    info!("Downloading symbols for exchanges {:?}", exchanges);
    debug!("Database URL: {}", database_url);

    let settings = Settings::load().context("Failed to load settings")?;
    run(&settings, exchanges, api_key, database_url).await
}

async fn run(settings: &Settings, exchanges: &[String], api_key: &str, database_url: &str) -> Result<()> {
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    let http = finnhub::build_http_client(settings.finnhub_timeout())?;
    let mut client = finnhub::FinnhubClient::new(http, settings.finnhub.base_url.clone());
    if let Err(e) = client.update_key(api_key).await {
        error!("Finnhub rejected the API key: {}", e);
        bail!("Cannot download symbols: {}", e);
    }

    let report = finnhub::download_symbols(&client, &db, exchanges)
        .await
        .context("Symbol download failed")?;

    info!(
        "Symbol download finished: {} symbols from {} exchanges",
        report.symbols, report.exchanges
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::initdb::init_database;
    use finnhub::testing::{FakeFinnhub, VALID_KEY};
    use model::entities::prelude::SupportedSymbol;
    use sea_orm::{EntityTrait, PaginatorTrait};

    async fn setup(fake: &FakeFinnhub) -> (tempfile::TempDir, String, Settings) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("guiana.db").display());
        init_database(&url).await.unwrap();

        let db = Database::connect(&url).await.unwrap();
        let csv = "code,name,mic,timezone,hour,close_date,country,source\nUS,US exchanges,XNYS,America/New_York,,,UNITED STATES,\n";
        finnhub::import_supported_exchanges(&db, csv.as_bytes()).await.unwrap();

        let mut settings = Settings::default();
        settings.finnhub.base_url = fake.base_url().to_string();
        (dir, url, settings)
    }

    #[tokio::test]
    async fn test_download_symbols_twice() {
        let fake = FakeFinnhub::start().await;
        let (_dir, url, settings) = setup(&fake).await;
        let exchanges = vec!["US".to_string()];

        run(&settings, &exchanges, VALID_KEY, &url).await.unwrap();
        run(&settings, &exchanges, VALID_KEY, &url).await.unwrap();

        let db = Database::connect(&url).await.unwrap();
        assert_eq!(SupportedSymbol::find().count(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_download_symbols_with_rejected_key() {
        let fake = FakeFinnhub::start().await;
        let (_dir, url, settings) = setup(&fake).await;

        let result = run(&settings, &["US".to_string()], "wrong", &url).await;
        assert!(result.is_err());
        assert_eq!(fake.hits(), 0);
    }
}
