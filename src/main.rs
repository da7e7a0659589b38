//! Passcode portal entry point.
//!
//! Loads configuration (TOML file plus `POSTGRES_*` environment overrides),
//! initializes tracing, prepares the database table (fatal if the database
//! stays unreachable after retries), sets up the Axum router and starts the
//! HTTP server.

use std::path::Path;

use clap::Parser;

use passcode_portal::config::{AppConfig, DEFAULT_CONFIG_PATH};
use passcode_portal::http::start_server;
use passcode_portal::observability::{logging, metrics};
use passcode_portal::templates::init_templates;
use passcode_portal::{create_router, store, AppError, AppState};

/// Passcode portal: reveals a stored message for the right passcode
#[derive(Parser, Debug)]
#[command(name = "passcode-portal", version, about)]
struct Args {
    /// Path to configuration file (defaults to config/default.toml when present)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level filter (e.g., "passcode_portal=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();

    let config_path = args.config.or_else(|| {
        Path::new(DEFAULT_CONFIG_PATH)
            .exists()
            .then(|| DEFAULT_CONFIG_PATH.to_string())
    });
    let config = AppConfig::load(config_path.as_deref())?;

    let log_filter = logging::resolve_filter(args.log_level, std::env::var("RUST_LOG").ok());
    logging::init(&log_filter, &config.logging);

    tracing::info!(path = ?config_path, "Loaded configuration");
    tracing::info!(
        host = %config.database.host,
        port = config.database.port,
        database = %config.database.name,
        source = ?config.passcode.source,
        errors = ?config.passcode.errors,
        "Passcode store configured"
    );

    let tera = init_templates(&config.ui)?;
    tracing::info!("Initialized templates");

    let metrics_handle = metrics::install_recorder()?;

    // Fatal if the database is still unreachable once retries run out
    let store = store::from_config(&config);
    store.initialize().await?;

    let http_config = config.http.clone();
    let state = AppState::new(config, tera, store, metrics_handle);
    let app = create_router(state);

    start_server(app, &http_config).await?;

    Ok(())
}
