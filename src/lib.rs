//! Passcode portal: a small web form that reveals a stored message when the
//! right passcode is entered.
//!
//! Passcodes are looked up in a PostgreSQL `messages` table (or compared
//! against a single configured passcode). The service also exposes `/health`
//! for probes and `/metrics` for Prometheus.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod state;
pub mod store;
pub mod templates;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
