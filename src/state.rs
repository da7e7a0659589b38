//! Shared application state for request handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use tera::Tera;

use crate::config::AppConfig;
use crate::store::MessageStore;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Contains the application configuration, Tera template engine, the passcode
/// store, and the handle used to render Prometheus metrics.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tera: Arc<Tera>,
    pub store: Arc<dyn MessageStore>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        config: AppConfig,
        tera: Tera,
        store: Arc<dyn MessageStore>,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tera: Arc::new(tera),
            store,
            metrics,
        }
    }
}
