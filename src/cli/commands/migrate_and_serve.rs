use anyhow::Result;
use tracing::{debug, info, trace};

use super::initdb::apply_migrations;
use super::serve::run_server;
use crate::config::Settings;
use crate::schemas::AppState;

pub async fn migrate_and_serve(database_url: &str, bind_address: &str) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");
    debug!("Database URL: {}", database_url);
    debug!("Bind address: {}", bind_address);

    // Reuse the migrated connection for serving
    let db = apply_migrations(database_url).await?;
    let state = AppState::new(db, Settings::load()?)?;
    debug!("Application state initialized successfully");

    run_server(state, bind_address).await
}
