//! HTTP route handlers.
//!
//! Each route group carries its own Cache-Control header. Request tracing is
//! enabled via middleware that generates a unique request ID for each incoming
//! request, allowing correlation of all logs within a request.

pub mod fallback;
pub mod health;
pub mod home;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CACHE_CONTROL_HEALTH, CACHE_CONTROL_INFO};
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with all routes and cache headers.
pub fn create_router(state: AppState) -> Router {
    // Service info - static for the life of the process
    let home_routes = Router::new().route("/", get(home::index)).layer(
        SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_INFO),
        ),
    );

    // Health check - no caching, always fresh for liveness probes
    let health_routes = Router::new().route("/health", get(health::health)).layer(
        SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_HEALTH),
        ),
    );

    Router::new()
        .merge(home_routes)
        .merge(health_routes)
        .fallback(fallback::not_found)
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
