//! Prometheus scrape endpoint.

use axum::{extract::State, http::header::CONTENT_TYPE, response::IntoResponse};

use crate::config::METRICS_CONTENT_TYPE;
use crate::state::AppState;

/// Render all recorded metrics in the text exposition format.
///
/// Histogram upkeep runs here rather than on a background timer.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.run_upkeep();
    ([(CONTENT_TYPE, METRICS_CONTENT_TYPE)], state.metrics.render())
}
