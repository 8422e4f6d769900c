use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, ConfigError, Environment, File};
use sea_orm::Database;
use serde::Deserialize;
use tracing::{debug, info};

use crate::schemas::AppState;

/// Upstream API settings
#[derive(Debug, Clone, Deserialize)]
pub struct FinnhubSettings {
    pub base_url: String,
    /// Per-request timeout for upstream calls
    pub timeout_secs: u64,
    /// How far back company news reaches
    pub news_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSettings {
    pub latest_news_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Sessions unused for this long are dropped
    pub idle_timeout_secs: u64,
    pub max_sessions: u64,
}

/// Runtime settings layered from defaults, an optional `guiana.{toml,yaml,json}`
/// file and `GUIANA__SECTION__KEY` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub finnhub: FinnhubSettings,
    pub dashboard: DashboardSettings,
    pub session: SessionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            finnhub: FinnhubSettings {
                base_url: finnhub::DEFAULT_BASE_URL.to_string(),
                timeout_secs: 10,
                news_days: 7,
            },
            dashboard: DashboardSettings {
                latest_news_limit: 10,
            },
            session: SessionSettings {
                // two weeks
                idle_timeout_secs: 1_209_600,
                max_sessions: 10_000,
            },
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Settings::default();

        Config::builder()
            .set_default("finnhub.base_url", defaults.finnhub.base_url)?
            .set_default("finnhub.timeout_secs", defaults.finnhub.timeout_secs as i64)?
            .set_default("finnhub.news_days", defaults.finnhub.news_days)?
            .set_default("dashboard.latest_news_limit", defaults.dashboard.latest_news_limit as i64)?
            .set_default("session.idle_timeout_secs", defaults.session.idle_timeout_secs as i64)?
            .set_default("session.max_sessions", defaults.session.max_sessions as i64)?
            .add_source(File::with_name("guiana").required(false))
            .add_source(
                Environment::with_prefix("GUIANA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn finnhub_timeout(&self) -> Duration {
        Duration::from_secs(self.finnhub.timeout_secs)
    }
}

/// Initialize application configuration and state
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    let settings = Settings::load().context("Failed to load settings")?;
    debug!("Loaded settings: {:?}", settings);

    // Connect to database
    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    AppState::new(db, settings)
}
