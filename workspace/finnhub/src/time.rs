//! Time arithmetic for upstream query windows and news labels.
//!
//! Every function takes "now" explicitly; the client passes `Utc::now()`.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use chrono_tz::Tz;

/// Timezone used to decide which trading day was the last completed one.
pub const MARKET_TZ: Tz = chrono_tz::US::Central;

/// 2010-01-01T00:00:00Z, first day of the charted price history.
pub const HISTORY_START: i64 = 1_262_304_000;

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;

/// Days to step back from `weekday` to land on the previous trading day.
pub fn previous_close_lookback_days(weekday: Weekday) -> i64 {
    match weekday {
        Weekday::Sun => 2,
        Weekday::Mon => 3,
        _ => 1,
    }
}

/// `(from, to)` UNIX timestamps of the candle window holding the previous close.
///
/// The weekday is taken in US/Central, so late Sunday evening in Chicago is
/// still Sunday even when it is already Monday in UTC.
pub fn previous_close_window(now: DateTime<Utc>) -> (i64, i64) {
    let local = now.with_timezone(&MARKET_TZ);
    let days = previous_close_lookback_days(local.weekday());
    let to = local.timestamp();
    (to - days * SECONDS_PER_DAY, to)
}

/// `(from, to)` as `YYYY-MM-DD` strings covering the last `days` days.
pub fn news_window(now: DateTime<Utc>, days: i64) -> (String, String) {
    let from = now - Duration::days(days);
    (
        from.format("%Y-%m-%d").to_string(),
        now.format("%Y-%m-%d").to_string(),
    )
}

/// Renders the age of a publication as "N days, M hours ago".
pub fn elapsed_text(now: DateTime<Utc>, published: i64) -> String {
    let delta = now.timestamp() - published;
    let days = delta.div_euclid(SECONDS_PER_DAY);
    let hours = (delta - days * SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    format!("{} days, {} hours ago", days, hours)
}

/// Formats a candle timestamp as its UTC calendar date.
pub fn candle_date(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}
