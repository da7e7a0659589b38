//! HTTP server module.
//!
//! Serves the router over plain HTTP (TLS is expected to terminate at a
//! reverse proxy) and shuts down gracefully on SIGTERM/SIGINT.

mod server;
mod shutdown;

pub use server::{listen_addr, start_server, ServerError};
