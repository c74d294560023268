use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::carts;
use super::health;
use super::members;
use super::middleware::logging_middleware;
use super::state::AppState;

/// Probe-only router without state; `/ready` needs state and is absent here
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .layer(TraceLayer::new_for_http())
}

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/members", members::create_member_router())
        .nest("/carts", carts::create_cart_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
