use std::sync::Arc;

use anyhow::{Context, Result};
use common::{
    Candlesticks, CompanyProfile, FinancialMetric, NewsDigest, NewsItem, SymbolOverview,
};
use finnhub::FinnhubClient;
use minijinja::Environment;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::config::Settings;
use crate::session::SessionStore;
use crate::templates;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Live login sessions
    pub sessions: SessionStore,
    /// HTTP client shared by every request's Finnhub client
    pub http: reqwest::Client,
    pub settings: Arc<Settings>,
    pub templates: Arc<Environment<'static>>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, settings: Settings) -> Result<Self> {
        let http = finnhub::build_http_client(settings.finnhub_timeout())
            .context("Failed to build HTTP client")?;
        let templates = templates::environment().context("Failed to load templates")?;

        Ok(Self {
            db,
            sessions: SessionStore::new(&settings.session),
            http,
            settings: Arc::new(settings),
            templates: Arc::new(templates),
        })
    }

    /// A fresh, not yet ready client for the current request.
    pub fn finnhub_client(&self) -> FinnhubClient {
        FinnhubClient::new(self.http.clone(), self.settings.finnhub.base_url.clone())
            .with_news_days(self.settings.finnhub.news_days)
    }
}

/// Query parameters for the latest news endpoint
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct LatestNewsQuery {
    /// Number of items, 1 to 50 (default 10)
    pub limit: Option<usize>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
#[aliases(NewsListResponse = ApiResponse<Vec<NewsItem>>, SymbolOverviewResponse = ApiResponse<SymbolOverview>)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }
    }
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::api::latest_news,
        crate::handlers::api::symbol_overview,
    ),
    components(
        schemas(
            NewsListResponse,
            SymbolOverviewResponse,
            ErrorResponse,
            HealthResponse,
            LatestNewsQuery,
            SymbolOverview,
            CompanyProfile,
            Candlesticks,
            FinancialMetric,
            NewsDigest,
            NewsItem,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "news", description = "Market news endpoints"),
        (name = "symbols", description = "Symbol search endpoints"),
    ),
    info(
        title = "Guiana API",
        description = "Stock dashboard API backed by Finnhub market data",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
