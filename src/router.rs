use crate::handlers::{
    accounts::{
        api_key_page, api_key_submit, login_page, login_submit, logout, register_page,
        register_submit,
    },
    api::{latest_news, symbol_overview},
    dashboard::{dashboard, index, search_results},
    health::health_check,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{routing::get, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        // Health check
        .route("/health", get(health_check))
        // Accounts
        .route("/register/", get(register_page).post(register_submit))
        .route("/login/", get(login_page).post(login_submit))
        .route("/logout/", get(logout).post(logout))
        .route("/account/api-key/", get(api_key_page).post(api_key_submit))
        // Dashboard pages
        .route("/dashboard/", get(dashboard))
        .route("/search_results/:symbol/", get(search_results))
        // JSON API
        .route("/api/v1/news/latest", get(latest_news))
        .route("/api/v1/symbols/:symbol", get(symbol_overview))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30))),
        )
        .with_state(state)
}
