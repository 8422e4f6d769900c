//! Common transport-layer types shared between the Finnhub client and the web
//! layer. The client produces them, the HTML views and the JSON API render them.

mod market;
mod news;

pub use market::{Candlesticks, CompanyProfile, FinancialMetric, Quote};
pub use news::{NewsDigest, NewsItem};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Everything the search results page shows for one ticker.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SymbolOverview {
    /// Ticker as stored in the supported-symbols table
    pub symbol: String,
    pub display_symbol: String,
    pub description: Option<String>,
    pub profile: CompanyProfile,
    /// Current price from the latest quote
    pub last_close: f64,
    /// Close of the most recent completed trading day, if upstream has one
    pub previous_close: Option<f64>,
    pub candlesticks: Candlesticks,
    pub financials: Vec<FinancialMetric>,
    pub news: NewsDigest,
}
