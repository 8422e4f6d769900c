use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A news article from `/news` or `/company-news`.
///
/// The last three fields are filled in locally for company news only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(default)]
pub struct NewsItem {
    pub id: i64,
    pub category: String,
    /// Publication time as a UNIX timestamp
    pub datetime: i64,
    pub headline: String,
    pub image: String,
    pub related: String,
    pub source: String,
    pub summary: String,
    pub url: String,
    /// e.g. "2 days, 5 hours ago"
    pub upload_timedelta: Option<String>,
    pub polarity: Option<f64>,
    pub subjectivity: Option<f64>,
}

/// Company news for one symbol with the batch's mean sentiment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct NewsDigest {
    pub items: Vec<NewsItem>,
    /// `None` for an empty batch
    pub polarity_avg: Option<f64>,
    /// `None` for an empty batch
    pub subjectivity_avg: Option<f64>,
}

impl NewsDigest {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
