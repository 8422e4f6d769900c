use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use finnhub::FinnhubError;
use model::accounts::AccountError;
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

const FAILURE_PAGE: &str = include_str!("../templates/error.html");

/// Failures that end a request with the generic failure page.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    #[error("Finnhub error: {0}")]
    Finnhub(#[from] FinnhubError),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, Html(FAILURE_PAGE)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_render_generic_page() {
        let response = AppError::Finnhub(FinnhubError::NotReady).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::Database(DbErr::Custom("boom".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
