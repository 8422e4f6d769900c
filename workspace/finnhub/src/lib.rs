//! Finnhub market-data integration: a request-scoped API client, local
//! sentiment scoring of news, and the bulk jobs that fill the
//! supported-exchange and supported-symbol tables.

pub mod client;
pub mod error;
pub mod jobs;
pub mod reshape;
pub mod sentiment;
pub mod time;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use client::{FinnhubClient, StockSymbol, build_http_client};
pub use error::{FinnhubError, Result};
pub use jobs::{
    DownloadReport, ImportReport, download_symbols, import_supported_exchanges,
    import_supported_exchanges_from_path,
};
pub use sentiment::{SentimentAnalyzer, SentimentScore};

/// Public Finnhub REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";
