use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use common::{NewsItem, SymbolOverview};
use finnhub::FinnhubError;
use tracing::{debug, error, info, instrument, warn};

use crate::schemas::{
    ApiResponse, AppState, ErrorResponse, LatestNewsQuery, NewsListResponse, SymbolOverviewResponse,
};
use crate::session::CurrentUser;

pub const MAX_NEWS_LIMIT: usize = 50;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message, code)))
}

fn upstream_error(e: FinnhubError) -> ApiError {
    error!("Finnhub request failed: {}", e);
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "UPSTREAM_ERROR",
        "Market data is temporarily unavailable",
    )
}

async fn ready_client(state: &AppState, current: &CurrentUser) -> Result<finnhub::FinnhubClient, ApiError> {
    let mut client = state.finnhub_client();
    if !client.ready(current.user()).await.map_err(upstream_error)? {
        warn!("API call without a ready Finnhub client");
        return Err(api_error(
            StatusCode::UNAUTHORIZED,
            "NOT_READY",
            "Log in and set a valid Finnhub API key first",
        ));
    }
    Ok(client)
}

/// Latest general market news
#[utoipa::path(
    get,
    path = "/api/v1/news/latest",
    tag = "news",
    params(LatestNewsQuery),
    responses(
        (status = 200, description = "Latest news retrieved successfully", body = NewsListResponse),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
        (status = 401, description = "No session or no valid API key", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn latest_news(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<LatestNewsQuery>,
) -> Result<Json<ApiResponse<Vec<NewsItem>>>, ApiError> {
    let limit = query.limit.unwrap_or(state.settings.dashboard.latest_news_limit);
    if !(1..=MAX_NEWS_LIMIT).contains(&limit) {
        debug!("Rejected news limit {}", limit);
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_LIMIT",
            format!("limit must be between 1 and {}", MAX_NEWS_LIMIT),
        ));
    }

    let client = ready_client(&state, &current).await?;
    let news = client.latest_news(limit).await.map_err(upstream_error)?;
    info!("Returning {} news items", news.len());

    Ok(Json(ApiResponse {
        data: news,
        message: "Latest news retrieved successfully".to_string(),
        success: true,
    }))
}

/// Overview of a supported symbol
#[utoipa::path(
    get,
    path = "/api/v1/symbols/{symbol}",
    tag = "symbols",
    params(
        ("symbol" = String, Path, description = "Ticker symbol, e.g. AAPL")
    ),
    responses(
        (status = 200, description = "Symbol overview retrieved successfully", body = SymbolOverviewResponse),
        (status = 401, description = "No session or no valid API key", body = ErrorResponse),
        (status = 404, description = "Symbol is not supported", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn symbol_overview(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<SymbolOverview>>, ApiError> {
    let client = ready_client(&state, &current).await?;

    let Some(overview) = client
        .search_symbol(&state.db, &symbol)
        .await
        .map_err(upstream_error)?
    else {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            "SYMBOL_NOT_FOUND",
            format!("Symbol '{}' is not supported", symbol),
        ));
    };

    Ok(Json(ApiResponse {
        data: overview,
        message: "Symbol overview retrieved successfully".to_string(),
        success: true,
    }))
}
