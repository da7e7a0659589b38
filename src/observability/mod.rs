//! Observability: structured logging and Prometheus metrics.
//!
//! Every request runs inside a span carrying its request id (see
//! `middleware`); counters and the latency histogram are exposed on `/metrics`.

pub mod logging;
pub mod metrics;
