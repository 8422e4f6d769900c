use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Company profile as returned by Finnhub's `/stock/profile2`.
/// Unknown tickers come back as an empty object, hence the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CompanyProfile {
    pub country: String,
    pub currency: String,
    pub exchange: String,
    pub name: String,
    pub ticker: String,
    pub weburl: String,
    pub logo: String,
    pub finnhub_industry: String,
    /// In millions of `currency`
    pub market_capitalization: Option<f64>,
    pub ipo: Option<String>,
}

/// Latest quote from `/quote`. Upstream uses one-letter keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(default)]
pub struct Quote {
    #[serde(alias = "c")]
    pub current: f64,
    #[serde(alias = "d")]
    pub change: Option<f64>,
    #[serde(alias = "dp")]
    pub percent_change: Option<f64>,
    #[serde(alias = "h")]
    pub high: f64,
    #[serde(alias = "l")]
    pub low: f64,
    #[serde(alias = "o")]
    pub open: f64,
    #[serde(alias = "pc")]
    pub previous_close: f64,
    #[serde(alias = "t")]
    pub timestamp: i64,
}

/// Daily candles shaped for a candlestick chart.
///
/// `t` holds one `YYYY-MM-DD` label per candle and `data` the matching
/// `[open, close, low, high]` rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Candlesticks {
    pub t: Vec<String>,
    pub data: Vec<Vec<f64>>,
}

impl Candlesticks {
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// One labelled row of the key-financials table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FinancialMetric {
    pub label: String,
    /// `None` when upstream does not report the metric
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_upstream_json() {
        let json = r#"{
            "country": "US",
            "currency": "USD",
            "exchange": "NASDAQ NMS - GLOBAL MARKET",
            "finnhubIndustry": "Technology",
            "ipo": "1980-12-12",
            "logo": "https://static2.finnhub.io/file/publicdatany/finnhubimage/stock_logo/AAPL.png",
            "marketCapitalization": 2836151.5,
            "name": "Apple Inc",
            "phone": "14089961010",
            "shareOutstanding": 15634.23,
            "ticker": "AAPL",
            "weburl": "https://www.apple.com/"
        }"#;

        let profile: CompanyProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name, "Apple Inc");
        assert_eq!(profile.finnhub_industry, "Technology");
        assert_eq!(profile.market_capitalization, Some(2836151.5));
        assert_eq!(profile.ipo.as_deref(), Some("1980-12-12"));
    }

    #[test]
    fn test_profile_for_unknown_ticker_is_empty() {
        let profile: CompanyProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile, CompanyProfile::default());
    }

    #[test]
    fn test_quote_reads_short_keys_and_writes_long_ones() {
        let json = r#"{"c":261.74,"d":-0.96,"dp":-0.3654,"h":263.31,"l":260.68,"o":261.07,"pc":262.7,"t":1582641000}"#;
        let quote: Quote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.current, 261.74);
        assert_eq!(quote.previous_close, 262.7);
        assert_eq!(quote.percent_change, Some(-0.3654));

        let written = serde_json::to_value(&quote).unwrap();
        assert_eq!(written["current"], 261.74);
        assert!(written.get("c").is_none());
    }
}
