//! HTTP route handlers.
//!
//! The passcode form lives at `/` and is never cached, since a successful
//! submission renders the stored message into the page. `/health` and
//! `/metrics` serve probes and scrapers.
//!
//! Every request passes through the request-id middleware (outermost, so its
//! span covers everything) and the metrics middleware.

pub mod health;
pub mod index;
pub mod metrics;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_FORM;
use crate::middleware::{metrics_layer, request_id_layer};
use crate::state::AppState;

/// Creates the Axum router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Form page - responses may contain a revealed message
    let form_routes = Router::new()
        .route("/", get(index::form).post(index::submit))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_FORM),
        ));

    // Probes - no caching, always fresh
    let probe_routes = Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(metrics::metrics));

    Router::new()
        .merge(form_routes)
        .merge(probe_routes)
        .with_state(state)
        .layer(middleware::from_fn(metrics_layer))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
