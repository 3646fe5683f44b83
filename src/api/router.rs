use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

/// Request body limit for trade submissions: the chart travels base64-encoded
/// inside the JSON form, plus room for the remaining fields.
fn trade_body_limit(max_chart_bytes: usize) -> usize {
    max_chart_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(64 * 1024)
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = trade_body_limit(state.config.max_chart_bytes);

    // Public routes, no authentication required
    let public = Router::new()
        .route("/health", get(handlers::system::health_check))
        .route("/metrics", get(handlers::system::render_metrics));

    // Everything under /api acts on the signed-in owner's journal
    let protected = Router::new()
        // Trades
        .route(
            "/api/trades",
            get(handlers::trades::list)
                .post(handlers::trades::create)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/trades/:id/close", post(handlers::trades::close))
        .route("/api/trades/:id", delete(handlers::trades::delete))
        // Statistics
        .route("/api/dashboard", get(handlers::dashboard::summary))
        .route("/api/stats/portfolio", get(handlers::analytics::portfolio))
        .route("/api/stats/calendar", get(handlers::analytics::calendar))
        .route("/api/stats/cumulative", get(handlers::analytics::cumulative))
        // Market data
        .route("/api/market/:symbol/bars", get(handlers::market::day_bars))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_body_limit_fits_encoded_chart() {
        let max = 5 * 1024 * 1024;
        let limit = trade_body_limit(max);
        assert!(limit >= max / 3 * 4);
        assert!(limit > 2 * 1024 * 1024);
        assert_eq!(trade_body_limit(usize::MAX), usize::MAX);
    }
}
