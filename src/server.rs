use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::middleware::{timing, Interceptor};
use crate::AppState;

/// Builds the full Axum `Router` with storefront, monitoring, and
/// simulator routes behind the timing middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    let interceptor = Interceptor::new(
        state.metrics.clone(),
        state.config.metrics.unmatched_route.as_str(),
    );

    Router::new()
        // ── Storefront ──────────────────────────────────────────
        .route("/", get(handlers::store::index))
        .route("/category/:name", get(handlers::store::browse_category))
        .route("/categories", get(handlers::store::list_categories))
        .route("/search", get(handlers::store::search))
        .route("/cart", get(handlers::store::view_cart))
        .route("/add-to-cart", post(handlers::store::add_to_cart))
        .route("/update-cart", post(handlers::store::update_cart))
        .route("/remove-from-cart", post(handlers::store::remove_from_cart))
        .route("/clear-cart", post(handlers::store::clear_cart))
        .route("/checkout", get(handlers::store::checkout))
        // ── Monitoring ──────────────────────────────────────────
        .route("/metrics", get(handlers::metrics::get_metrics))
        .route("/metrics/stream", get(handlers::metrics::metrics_stream))
        .route("/metrics/reset", post(handlers::metrics::reset_metrics))
        .route("/dashboard", get(handlers::metrics::dashboard))
        .route("/health", get(handlers::health::health))
        // ── Traffic simulator ───────────────────────────────────
        .route(
            "/api/simulate/start",
            post(handlers::simulate::start_simulation),
        )
        .route(
            "/api/simulate/stop",
            post(handlers::simulate::stop_simulation),
        )
        .route(
            "/api/simulate/status",
            get(handlers::simulate::simulation_status),
        )
        // ── Anything else lands in the unmatched bucket ─────────
        .fallback(handlers::not_found)
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(CatchPanicLayer::new())
        .layer(axum_mw::from_fn_with_state(
            interceptor,
            timing::record_timing,
        ))
        .layer(CorsLayer::permissive())
}
