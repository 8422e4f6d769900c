//! Request-scoped Finnhub client.
//!
//! A `FinnhubClient` is cheap to build: it borrows the process-wide
//! `reqwest::Client` and only holds an API key once `ready` (or
//! `update_key`) has validated one.

use std::time::Duration;

use chrono::{DateTime, Utc};
use common::{CompanyProfile, NewsDigest, NewsItem, Quote, SymbolOverview};
use model::entities::{prelude::SupportedSymbol, user};
use reqwest::StatusCode;
use sea_orm::ConnectionTrait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{FinnhubError, Result};
use crate::reshape::{self, RawCandles, RawFinancials};
use crate::sentiment::SentimentAnalyzer;
use crate::time::{HISTORY_START, news_window, previous_close_window};

pub const DEFAULT_NEWS_DAYS: i64 = 7;

/// One row of `/stock/symbol`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct StockSymbol {
    pub symbol: String,
    pub display_symbol: String,
    pub description: String,
    pub currency: String,
    #[serde(rename = "type")]
    pub symbol_type: String,
}

/// Builds the shared HTTP client handed to every `FinnhubClient`.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Authenticated handle to the upstream API.
#[derive(Clone)]
struct Upstream {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upstream")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Upstream {
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        trace!("GET {}", path);
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Finnhub {} answered {}", path, status);
            return Err(FinnhubError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Undecodable body from {}: {}", path, e);
            FinnhubError::Decode(format!("{}: {}", path, e))
        })
    }
}

#[derive(Debug, Clone)]
pub struct FinnhubClient {
    http: reqwest::Client,
    base_url: String,
    news_days: i64,
    analyzer: SentimentAnalyzer,
    upstream: Option<Upstream>,
}

impl FinnhubClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            news_days: DEFAULT_NEWS_DAYS,
            analyzer: SentimentAnalyzer::new(),
            upstream: None,
        }
    }

    /// How many days back `symbol_news` looks.
    pub fn with_news_days(mut self, days: i64) -> Self {
        self.news_days = days.max(1);
        self
    }

    pub fn is_ready(&self) -> bool {
        self.upstream.is_some()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.upstream.as_ref().map(|u| u.api_key.as_str())
    }

    /// Probes the upstream root with `key`.
    ///
    /// Only a 401 means the key is bad; every other status counts as valid.
    /// Transport failures are errors.
    #[instrument(skip(self, key))]
    pub async fn validate_key(&self, key: &str) -> Result<bool> {
        trace!("Probing Finnhub with candidate key");
        let response = self
            .http
            .get(format!("{}/", self.base_url))
            .query(&[("token", key)])
            .send()
            .await?;

        let valid = response.status() != StatusCode::UNAUTHORIZED;
        debug!("Key probe answered {} (valid: {})", response.status(), valid);
        Ok(valid)
    }

    /// Validates `key` and, if accepted, makes the client ready with it.
    pub async fn update_key(&mut self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() || !self.validate_key(key).await? {
            return Err(FinnhubError::InvalidKey);
        }
        self.connect(key);
        Ok(())
    }

    /// True when `user` is signed in, active and carries a key the upstream
    /// accepts. Initializes the upstream handle as a side effect.
    #[instrument(skip(self, user), fields(user = user.map(|u| u.username.as_str())))]
    pub async fn ready(&mut self, user: Option<&user::Model>) -> Result<bool> {
        let Some(user) = user.filter(|u| u.is_active) else {
            debug!("No active user; client not ready");
            return Ok(false);
        };

        let Some(key) = user
            .finnhub_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        else {
            debug!("User has no API key stored");
            return Ok(false);
        };

        if !self.validate_key(key).await? {
            info!("Stored API key for {} was rejected upstream", user.username);
            self.upstream = None;
            return Ok(false);
        }

        self.connect(key);
        Ok(true)
    }

    fn connect(&mut self, key: &str) {
        self.upstream = Some(Upstream {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            api_key: key.to_string(),
        });
    }

    fn upstream(&self) -> Result<&Upstream> {
        self.upstream.as_ref().ok_or(FinnhubError::NotReady)
    }

    /// First `n` general market news items, in upstream order.
    #[instrument(skip(self))]
    pub async fn latest_news(&self, n: usize) -> Result<Vec<NewsItem>> {
        let mut items: Vec<NewsItem> = self
            .upstream()?
            .get_json(
                "/news",
                &[("category", "general".to_string()), ("minId", "0".to_string())],
            )
            .await?;
        items.truncate(n);
        debug!("Fetched {} latest news items", items.len());
        Ok(items)
    }

    pub async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile> {
        self.upstream()?
            .get_json("/stock/profile2", &[("symbol", symbol.to_string())])
            .await
    }

    pub async fn quote(&self, symbol: &str) -> Result<Quote> {
        self.upstream()?
            .get_json("/quote", &[("symbol", symbol.to_string())])
            .await
    }

    async fn candles(&self, symbol: &str, from: i64, to: i64) -> Result<RawCandles> {
        self.upstream()?
            .get_json(
                "/stock/candle",
                &[
                    ("symbol", symbol.to_string()),
                    ("resolution", "D".to_string()),
                    ("from", from.to_string()),
                    ("to", to.to_string()),
                ],
            )
            .await
    }

    /// Daily candles since 2010-01-01, shaped for charting.
    pub async fn candlesticks(&self, symbol: &str) -> Result<common::Candlesticks> {
        let raw = self.candles(symbol, HISTORY_START, Utc::now().timestamp()).await?;
        Ok(reshape::candlesticks(&raw))
    }

    pub async fn financials(&self, symbol: &str) -> Result<Vec<common::FinancialMetric>> {
        let raw: RawFinancials = self
            .upstream()?
            .get_json(
                "/stock/metric",
                &[("symbol", symbol.to_string()), ("metric", "all".to_string())],
            )
            .await?;
        Ok(reshape::financial_metrics(&raw))
    }

    /// Company news for the configured window, with sentiment.
    pub async fn symbol_news(&self, symbol: &str) -> Result<NewsDigest> {
        self.symbol_news_at(symbol, Utc::now()).await
    }

    #[instrument(skip(self, now))]
    pub async fn symbol_news_at(&self, symbol: &str, now: DateTime<Utc>) -> Result<NewsDigest> {
        let (from, to) = news_window(now, self.news_days);
        let items: Vec<NewsItem> = self
            .upstream()?
            .get_json(
                "/company-news",
                &[("symbol", symbol.to_string()), ("from", from), ("to", to)],
            )
            .await?;
        debug!("{} company news items for {}", items.len(), symbol);
        Ok(reshape::news_digest(items, &self.analyzer, now))
    }

    /// Close of the last completed trading day.
    pub async fn ytd_close(&self, symbol: &str) -> Result<Option<f64>> {
        self.ytd_close_at(symbol, Utc::now()).await
    }

    pub async fn ytd_close_at(&self, symbol: &str, now: DateTime<Utc>) -> Result<Option<f64>> {
        let (from, to) = previous_close_window(now);
        let raw = self.candles(symbol, from, to).await?;
        if !raw.has_data() {
            debug!("No candle in previous-close window for {}", symbol);
            return Ok(None);
        }
        Ok(raw.c.first().copied())
    }

    /// Every symbol Finnhub lists for one exchange.
    #[instrument(skip(self))]
    pub async fn stock_symbols(&self, exchange: &str) -> Result<Vec<StockSymbol>> {
        self.upstream()?
            .get_json("/stock/symbol", &[("exchange", exchange.to_string())])
            .await
    }

    /// Looks `symbol` up locally and, when supported, gathers its overview.
    ///
    /// Unknown symbols return `Ok(None)` without touching the upstream.
    #[instrument(skip(self, db))]
    pub async fn search_symbol<C: ConnectionTrait>(
        &self,
        db: &C,
        symbol: &str,
    ) -> Result<Option<SymbolOverview>> {
        self.upstream()?;

        let symbol = symbol.trim().to_uppercase();
        let Some(found) = SupportedSymbol::find_by_symbol(db, &symbol).await? else {
            info!("Symbol {} is not supported", symbol);
            return Ok(None);
        };

        debug!("Fetching overview for {}", found.symbol);
        let (profile, quote, candlesticks, financials, news, previous_close) = tokio::try_join!(
            self.company_profile(&found.symbol),
            self.quote(&found.symbol),
            self.candlesticks(&found.symbol),
            self.financials(&found.symbol),
            self.symbol_news(&found.symbol),
            self.ytd_close(&found.symbol),
        )?;

        info!("Built overview for {}", found.symbol);
        Ok(Some(SymbolOverview {
            symbol: found.symbol,
            display_symbol: found.display_symbol,
            description: found.description,
            profile,
            last_close: quote.current,
            previous_close,
            candlesticks,
            financials,
            news,
        }))
    }
}
