//! In-process stand-in for the Finnhub API, for tests only.
//!
//! Keys: [`VALID_KEY`] is accepted everywhere, [`FORBIDDEN_KEY`] makes the
//! probe answer 403, anything else gets 401. Symbols: [`NO_DATA_SYMBOL`] has
//! no candles, [`QUIET_SYMBOL`] has no news, [`FAIL_SYMBOL`] answers 500 and
//! [`GARBLED_SYMBOL`] answers a body that is not JSON.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::client::FinnhubClient;

pub const VALID_KEY: &str = "valid-test-key";
pub const FORBIDDEN_KEY: &str = "forbidden-test-key";
pub const NO_DATA_SYMBOL: &str = "NODATA";
pub const QUIET_SYMBOL: &str = "QUIET";
pub const FAIL_SYMBOL: &str = "FAIL";
pub const GARBLED_SYMBOL: &str = "GARBLED";

/// Closes of the canned candles, oldest first.
pub const CANDLE_CLOSES: [f64; 3] = [187.0, 189.5, 190.3];
pub const QUOTE_CURRENT: f64 = 189.5;
pub const GENERAL_NEWS_COUNT: usize = 12;

type Params = Query<HashMap<String, String>>;

#[derive(Clone, Default)]
struct FakeState {
    hits: Arc<AtomicUsize>,
}

pub struct FakeFinnhub {
    base_url: String,
    hits: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl FakeFinnhub {
    pub async fn start() -> Self {
        let state = FakeState::default();
        let hits = state.hits.clone();

        let router = Router::new()
            .route("/api/v1", get(probe))
            .route("/api/v1/", get(probe))
            .route("/api/v1/stock/profile2", get(profile))
            .route("/api/v1/quote", get(quote))
            .route("/api/v1/stock/candle", get(candle))
            .route("/api/v1/stock/metric", get(metric))
            .route("/api/v1/company-news", get(company_news))
            .route("/api/v1/news", get(general_news))
            .route("/api/v1/stock/symbol", get(stock_symbols))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake finnhub");
        let addr = listener.local_addr().expect("fake finnhub address");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            base_url: format!("http://{}/api/v1", addr),
            hits,
            task,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests served by data endpoints. Key probes are not counted.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn client(&self) -> FinnhubClient {
        FinnhubClient::new(reqwest::Client::new(), self.base_url.clone())
    }

    pub async fn ready_client(&self) -> FinnhubClient {
        let mut client = self.client();
        client
            .update_key(VALID_KEY)
            .await
            .expect("fake finnhub accepts the valid key");
        client
    }
}

impl Drop for FakeFinnhub {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn probe(Query(params): Params) -> StatusCode {
    match params.get("token").map(String::as_str) {
        Some(VALID_KEY) => StatusCode::OK,
        Some(FORBIDDEN_KEY) => StatusCode::FORBIDDEN,
        _ => StatusCode::UNAUTHORIZED,
    }
}

/// Counts the hit and rejects bad keys and failing symbols.
fn gate(state: &FakeState, params: &HashMap<String, String>) -> Result<String, Response> {
    state.hits.fetch_add(1, Ordering::SeqCst);

    if params.get("token").map(String::as_str) != Some(VALID_KEY) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid API key"})),
        )
            .into_response());
    }

    let symbol = params.get("symbol").cloned().unwrap_or_default();
    match symbol.as_str() {
        FAIL_SYMBOL => Err((StatusCode::INTERNAL_SERVER_ERROR, "upstream failure").into_response()),
        GARBLED_SYMBOL => Err((StatusCode::OK, "<html>maintenance</html>").into_response()),
        _ => Ok(symbol),
    }
}

fn reply(state: &FakeState, params: &HashMap<String, String>, body: impl FnOnce(&str) -> Value) -> Response {
    match gate(state, params) {
        Ok(symbol) => Json(body(&symbol)).into_response(),
        Err(response) => response,
    }
}

async fn profile(State(state): State<FakeState>, Query(params): Params) -> Response {
    reply(&state, &params, |symbol| {
        json!({
            "country": "US",
            "currency": "USD",
            "exchange": "NASDAQ NMS - GLOBAL MARKET",
            "finnhubIndustry": "Technology",
            "ipo": "1980-12-12",
            "logo": format!("https://static.finnhub.io/logo/{}.png", symbol),
            "marketCapitalization": 2_913_000.5,
            "name": format!("{} Inc", symbol),
            "ticker": symbol,
            "weburl": "https://www.example.com/"
        })
    })
}

async fn quote(State(state): State<FakeState>, Query(params): Params) -> Response {
    reply(&state, &params, |_| {
        json!({
            "c": QUOTE_CURRENT,
            "d": 1.2,
            "dp": 0.64,
            "h": 190.1,
            "l": 187.9,
            "o": 188.0,
            "pc": 188.3,
            "t": 1_717_617_600
        })
    })
}

async fn candle(State(state): State<FakeState>, Query(params): Params) -> Response {
    reply(&state, &params, |symbol| {
        if symbol == NO_DATA_SYMBOL {
            return json!({"s": "no_data"});
        }
        json!({
            "s": "ok",
            "t": [1_717_545_600, 1_717_632_000, 1_717_718_400],
            "o": [186.0, 187.5, 189.0],
            "h": [188.0, 190.0, 191.0],
            "l": [185.0, 186.9, 188.2],
            "c": CANDLE_CLOSES,
            "v": [51_000_000.0, 48_500_000.0, 52_300_000.0]
        })
    })
}

async fn metric(State(state): State<FakeState>, Query(params): Params) -> Response {
    reply(&state, &params, |symbol| {
        json!({
            "symbol": symbol,
            "metricType": "all",
            "metric": {
                "52WeekHigh": 199.62,
                "52WeekLow": 164.08,
                "beta": 1.29,
                "epsExclExtraItemsTTM": 6.43,
                "payoutRatioAnnual": 15.87,
                "payoutRatioTTM": 15.5
            }
        })
    })
}

async fn company_news(State(state): State<FakeState>, Query(params): Params) -> Response {
    reply(&state, &params, |symbol| {
        if symbol == QUIET_SYMBOL {
            return json!([]);
        }
        let now = chrono::Utc::now().timestamp();
        json!([
            {
                "category": "company",
                "datetime": now - 2 * 3_600,
                "headline": format!("{} beats estimates", symbol),
                "id": 101,
                "image": "",
                "related": symbol,
                "source": "Reuters",
                "summary": "Strong demand drives record profit.",
                "url": "https://www.example.com/news/101"
            },
            {
                "category": "company",
                "datetime": now - 26 * 3_600,
                "headline": format!("Analysts cautious on {}", symbol),
                "id": 102,
                "image": "",
                "related": symbol,
                "source": "Bloomberg",
                "summary": "Analysts warn of weak guidance and rising costs.",
                "url": "https://www.example.com/news/102"
            }
        ])
    })
}

async fn general_news(State(state): State<FakeState>, Query(params): Params) -> Response {
    reply(&state, &params, |_| {
        let items: Vec<Value> = (1..=GENERAL_NEWS_COUNT)
            .map(|i| {
                json!({
                    "category": "top news",
                    "datetime": 1_717_600_000 - i as i64 * 600,
                    "headline": format!("Market headline {}", i),
                    "id": i,
                    "image": "",
                    "related": "",
                    "source": "CNBC",
                    "summary": format!("Summary of story {}", i),
                    "url": format!("https://www.example.com/market/{}", i)
                })
            })
            .collect();
        Value::Array(items)
    })
}

async fn stock_symbols(State(state): State<FakeState>, Query(params): Params) -> Response {
    let exchange = params.get("exchange").cloned().unwrap_or_default();
    reply(&state, &params, move |_| match exchange.as_str() {
        "US" => json!([
            {"currency": "USD", "description": "APPLE INC", "displaySymbol": "AAPL", "symbol": "AAPL", "type": "Common Stock"},
            {"currency": "USD", "description": "MICROSOFT CORP", "displaySymbol": "MSFT", "symbol": "MSFT", "type": "Common Stock"},
            {"currency": "USD", "description": "APPLE INC", "displaySymbol": "AAPL", "symbol": "AAPL", "type": "Common Stock"}
        ]),
        "L" => json!([
            {"currency": "GBP", "description": "VODAFONE GROUP PLC", "displaySymbol": "VOD.L", "symbol": "VOD.L", "type": "Common Stock"}
        ]),
        _ => json!([]),
    })
}
