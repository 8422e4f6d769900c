//! Turns raw upstream payloads into the shapes the views render.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::{Candlesticks, FinancialMetric, NewsDigest, NewsItem};
use serde::Deserialize;
use serde_json::Value;

use crate::sentiment::SentimentAnalyzer;
use crate::time::{candle_date, elapsed_text};

/// Raw `/stock/candle` payload. `s` is "ok" or "no_data".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCandles {
    pub s: String,
    pub o: Vec<f64>,
    pub h: Vec<f64>,
    pub l: Vec<f64>,
    pub c: Vec<f64>,
    pub v: Vec<f64>,
    pub t: Vec<i64>,
}

impl RawCandles {
    pub fn has_data(&self) -> bool {
        self.s == "ok" && !self.t.is_empty()
    }
}

/// Raw `/stock/metric` payload; only the `metric` map is used.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFinancials {
    pub metric: HashMap<String, Value>,
}

/// Chart shape: date labels plus `[open, close, low, high]` rows.
pub fn candlesticks(raw: &RawCandles) -> Candlesticks {
    if !raw.has_data() {
        return Candlesticks::default();
    }

    let mut shaped = Candlesticks::default();
    for (i, &timestamp) in raw.t.iter().enumerate() {
        let (Some(date), Some(&open), Some(&close), Some(&low), Some(&high)) = (
            candle_date(timestamp),
            raw.o.get(i),
            raw.c.get(i),
            raw.l.get(i),
            raw.h.get(i),
        ) else {
            continue;
        };
        shaped.t.push(date);
        shaped.data.push(vec![open, close, low, high]);
    }
    shaped
}

fn metric(raw: &RawFinancials, key: &str) -> Option<f64> {
    raw.metric.get(key).and_then(Value::as_f64)
}

fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// The key-financials table, in display order.
pub fn financial_metrics(raw: &RawFinancials) -> Vec<FinancialMetric> {
    let range = match (metric(raw, "52WeekLow"), metric(raw, "52WeekHigh")) {
        (Some(low), Some(high)) => Some(format!("{} - {}", format_number(low), format_number(high))),
        _ => None,
    };

    let rows = [
        ("52-week range", range),
        ("Beta (5Y, monthly)", metric(raw, "beta").map(format_number)),
        ("EPS (TTM)", metric(raw, "epsExclExtraItemsTTM").or_else(|| metric(raw, "epsTTM")).map(format_number)),
        ("Payout Ratio (Annual)", metric(raw, "payoutRatioAnnual").map(format_number)),
        ("Payout Ratio (TTM)", metric(raw, "payoutRatioTTM").map(format_number)),
    ];

    rows.into_iter()
        .map(|(label, value)| FinancialMetric {
            label: label.to_string(),
            value,
        })
        .collect()
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Labels each article with its age and sentiment and averages the batch.
///
/// Per-article scores are rounded to 2 places, the averages to 4 places and
/// computed from the unrounded scores. An empty batch has no averages.
pub fn news_digest(
    mut items: Vec<NewsItem>,
    analyzer: &SentimentAnalyzer,
    now: DateTime<Utc>,
) -> NewsDigest {
    if items.is_empty() {
        return NewsDigest::empty();
    }

    let mut polarity_sum = 0.0;
    let mut subjectivity_sum = 0.0;
    for item in &mut items {
        let score = analyzer.analyze(&item.summary);
        item.upload_timedelta = Some(elapsed_text(now, item.datetime));
        item.polarity = Some(round_to(score.polarity, 2));
        item.subjectivity = Some(round_to(score.subjectivity, 2));
        polarity_sum += score.polarity;
        subjectivity_sum += score.subjectivity;
    }

    let count = items.len() as f64;
    NewsDigest {
        items,
        polarity_avg: Some(round_to(polarity_sum / count, 4)),
        subjectivity_avg: Some(round_to(subjectivity_sum / count, 4)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_candlesticks_reorders_rows_for_chart() {
        let raw: RawCandles = serde_json::from_value(json!({
            "s": "ok",
            "o": [10.0, 11.0],
            "h": [12.0, 13.0],
            "l": [9.0, 10.5],
            "c": [11.5, 12.5],
            "v": [100.0, 200.0],
            "t": [1_717_545_600, 1_717_632_000]
        }))
        .unwrap();

        let shaped = candlesticks(&raw);
        assert_eq!(shaped.t, vec!["2024-06-05", "2024-06-06"]);
        assert_eq!(shaped.data, vec![vec![10.0, 11.5, 9.0, 12.0], vec![11.0, 12.5, 10.5, 13.0]]);
    }

    #[test]
    fn test_candlesticks_without_data() {
        let raw: RawCandles = serde_json::from_value(json!({"s": "no_data"})).unwrap();
        assert!(!raw.has_data());
        assert!(candlesticks(&raw).is_empty());
    }

    #[test]
    fn test_candlesticks_skips_ragged_rows() {
        let raw: RawCandles = serde_json::from_value(json!({
            "s": "ok",
            "o": [10.0],
            "h": [12.0],
            "l": [9.0],
            "c": [11.5],
            "t": [1_717_545_600, 1_717_632_000]
        }))
        .unwrap();
        assert_eq!(candlesticks(&raw).t.len(), 1);
    }

    #[test]
    fn test_financial_metrics() {
        let raw: RawFinancials = serde_json::from_value(json!({
            "metric": {
                "52WeekHigh": 199.62,
                "52WeekLow": 164.08,
                "beta": 1.2,
                "epsExclExtraItemsTTM": 6.13,
                "payoutRatioAnnual": 15.5,
                "payoutRatioTTM": null
            }
        }))
        .unwrap();

        let metrics = financial_metrics(&raw);
        let labels: Vec<&str> = metrics.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["52-week range", "Beta (5Y, monthly)", "EPS (TTM)", "Payout Ratio (Annual)", "Payout Ratio (TTM)"]
        );
        assert_eq!(metrics[0].value.as_deref(), Some("164.08 - 199.62"));
        assert_eq!(metrics[1].value.as_deref(), Some("1.2"));
        assert_eq!(metrics[2].value.as_deref(), Some("6.13"));
        assert_eq!(metrics[4].value, None);
    }

    #[test]
    fn test_financial_metrics_when_upstream_has_nothing() {
        let metrics = financial_metrics(&RawFinancials::default());
        assert_eq!(metrics.len(), 5);
        assert!(metrics.iter().all(|m| m.value.is_none()));
    }

    #[test]
    fn test_news_digest_labels_and_averages() {
        let now = Utc.with_ymd_and_hms(2024, 6, 5, 12, 0, 0).unwrap();
        let items = vec![
            NewsItem {
                datetime: now.timestamp() - 3_600,
                summary: "good".to_string(),
                ..Default::default()
            },
            NewsItem {
                datetime: now.timestamp() - 86_400,
                summary: "bad".to_string(),
                ..Default::default()
            },
        ];

        let digest = news_digest(items, &SentimentAnalyzer::new(), now);
        assert_eq!(digest.items.len(), 2);
        assert_eq!(digest.items[0].upload_timedelta.as_deref(), Some("0 days, 1 hours ago"));
        assert_eq!(digest.items[1].upload_timedelta.as_deref(), Some("1 days, 0 hours ago"));
        assert_eq!(digest.items[0].polarity, Some(0.7));
        assert_eq!(digest.items[1].polarity, Some(-0.7));
        assert_eq!(digest.polarity_avg, Some(0.0));
        assert_eq!(digest.subjectivity_avg, Some(0.635));
    }

    #[test]
    fn test_news_digest_empty_batch() {
        let digest = news_digest(Vec::new(), &SentimentAnalyzer::new(), Utc::now());
        assert!(digest.is_empty());
        assert_eq!(digest.polarity_avg, None);
        assert_eq!(digest.subjectivity_avg, None);
    }
}
