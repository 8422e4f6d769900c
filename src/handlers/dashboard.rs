use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use minijinja::context;
use serde::Deserialize;
use tracing::{debug, info, instrument, trace};

use crate::error::AppError;
use crate::schemas::AppState;
use crate::session::CurrentUser;
use crate::templates::render;

pub const NOT_READY_MESSAGE: &str =
    "Please log in and set a valid Finnhub API key to use the dashboard.";

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub symbol: Option<String>,
}

fn is_ticker(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol.len() <= 20
        && symbol.chars().any(|c| c.is_ascii_alphanumeric())
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '^' | '='))
}

pub async fn index() -> Redirect {
    Redirect::to("/dashboard/")
}

/// Latest market news and the symbol search box.
#[instrument(skip(state, current))]
pub async fn dashboard(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    trace!("Entering dashboard handler");
    let username = current.user().map(|u| u.username.clone());

    let search = query.symbol.as_deref().map(str::trim).unwrap_or_default();
    if is_ticker(search) {
        debug!("Redirecting search for {}", search);
        return Ok(Redirect::to(&format!("/search_results/{}/", search.to_uppercase())).into_response());
    }

    let mut client = state.finnhub_client();
    if !client.ready(current.user()).await? {
        let page = render(
            &state,
            "dashboard/dashboard.html",
            context! { username, ready => false, error => NOT_READY_MESSAGE },
        )?;
        return Ok(page.into_response());
    }

    let news = client
        .latest_news(state.settings.dashboard.latest_news_limit)
        .await?;
    info!("Dashboard rendered with {} news items", news.len());

    let invalid_search = (!search.is_empty()).then(|| format!("'{}' is not a valid symbol.", search));
    let page = render(
        &state,
        "dashboard/dashboard.html",
        context! { username, ready => true, news, error => invalid_search },
    )?;
    Ok(page.into_response())
}

/// Overview of one supported symbol.
#[instrument(skip(state, current))]
pub async fn search_results(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(symbol): Path<String>,
) -> Result<Response, AppError> {
    let username = current.user().map(|u| u.username.clone());

    let mut client = state.finnhub_client();
    if !client.ready(current.user()).await? {
        let page = render(
            &state,
            "dashboard/search_results.html",
            context! { username, symbol, ready => false, error => NOT_READY_MESSAGE },
        )?;
        return Ok(page.into_response());
    }

    let Some(overview) = client.search_symbol(&state.db, &symbol).await? else {
        info!("No results for {}", symbol);
        let page = render(
            &state,
            "dashboard/search_results.html",
            context! { username, symbol, ready => true, overview => (), no_results => true },
        )?;
        return Ok(page.into_response());
    };

    let candles_json = serde_json::to_string(&overview.candlesticks).unwrap_or_else(|_| "{}".to_string());
    let page = render(
        &state,
        "dashboard/search_results.html",
        context! { username, symbol, ready => true, overview, candles_json, no_results => false },
    )?;
    Ok(page.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ticker() {
        assert!(is_ticker("AAPL"));
        assert!(is_ticker("BRK.A"));
        assert!(is_ticker("VOD.L"));
        assert!(!is_ticker(""));
        assert!(!is_ticker("AA PL"));
        assert!(!is_ticker("../admin"));
        assert!(!is_ticker(".."));
    }
}
