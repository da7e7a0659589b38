//! Shared helpers for HTTP-level tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use sqlx::postgres::PgConnectOptions;

use passcode_portal::config::{AppConfig, ErrorDisclosure, PasscodeSource};
use passcode_portal::observability::metrics::install_recorder;
use passcode_portal::store::{MessageStore, PgMessageStore, RetryPolicy, StoreError};
use passcode_portal::templates::init_templates;
use passcode_portal::{create_router, AppState};

/// In-memory stand-in for the messages table
#[derive(Default)]
pub struct MemoryStore {
    messages: HashMap<String, String>,
    lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn with(pairs: &[(&str, &str)]) -> Self {
        Self {
            messages: pairs
                .iter()
                .map(|(p, m)| (p.to_string(), m.to_string()))
                .collect(),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    fn source(&self) -> PasscodeSource {
        PasscodeSource::Database
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn lookup(&self, passcode: &str) -> Result<Option<String>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .messages
            .get(passcode)
            .filter(|message| !message.is_empty())
            .cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// A real PostgreSQL store pointed at a port nothing listens on.
pub fn unreachable_store() -> PgMessageStore {
    let options = PgConnectOptions::new()
        .host("127.0.0.1")
        .port(1)
        .database("webapp")
        .username("webapp_user")
        .password("webapp_password");
    PgMessageStore::with_options(options, RetryPolicy::new(2, Duration::from_millis(1)))
}

pub fn config_with(errors: ErrorDisclosure) -> AppConfig {
    let mut config = AppConfig::default();
    config.passcode.errors = errors;
    config
}

pub fn server_with_config(store: Arc<dyn MessageStore>, config: AppConfig) -> TestServer {
    let tera = init_templates(&config.ui).expect("Failed to load templates");
    let metrics = install_recorder().expect("Failed to install metrics recorder");
    let state = AppState::new(config, tera, store, metrics);
    TestServer::new(create_router(state)).expect("Failed to create test server")
}

pub fn server(store: Arc<dyn MessageStore>) -> TestServer {
    server_with_config(store, config_with(ErrorDisclosure::Generic))
}
