//! Passcode storage.
//!
//! `MessageStore` is the seam between request handlers and wherever passcodes
//! live. The PostgreSQL store opens one connection per call (with bounded
//! retry); the static store compares against a single configured passcode.

mod postgres;
pub mod retry;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AppConfig, PasscodeSource};

pub use postgres::PgMessageStore;
pub use retry::RetryPolicy;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database connection failed after {attempts} attempt(s): {source}")]
    Connect {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Read-only access to passcode records.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Which passcode source this store implements
    fn source(&self) -> PasscodeSource;

    /// Prepare storage at startup (e.g. create the table)
    async fn initialize(&self) -> Result<(), StoreError>;

    /// Message for `passcode`, or `None` when nothing matches
    async fn lookup(&self, passcode: &str) -> Result<Option<String>, StoreError>;

    /// Run a trivial round trip to verify the backend is reachable
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Single passcode/message pair held in memory.
pub struct StaticMessageStore {
    passcode: String,
    message: String,
}

impl StaticMessageStore {
    pub fn new(passcode: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            passcode: passcode.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl MessageStore for StaticMessageStore {
    fn source(&self) -> PasscodeSource {
        PasscodeSource::Static
    }

    async fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn lookup(&self, passcode: &str) -> Result<Option<String>, StoreError> {
        if passcode == self.passcode && !self.message.is_empty() {
            Ok(Some(self.message.clone()))
        } else {
            Ok(None)
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Build the store selected by `passcode.source`.
pub fn from_config(config: &AppConfig) -> Arc<dyn MessageStore> {
    match config.passcode.source {
        PasscodeSource::Database => Arc::new(PgMessageStore::new(&config.database)),
        PasscodeSource::Static => Arc::new(StaticMessageStore::new(
            config.passcode.static_passcode.clone().unwrap_or_default(),
            config.passcode.static_message.clone().unwrap_or_default(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_store_exact_match() {
        let store = StaticMessageStore::new("open-sesame", "The treasure is under the tree");
        assert_eq!(
            store.lookup("open-sesame").await.unwrap().as_deref(),
            Some("The treasure is under the tree")
        );
        assert_eq!(store.lookup("Open-Sesame").await.unwrap(), None);
        assert_eq!(store.lookup("open-sesame ").await.unwrap(), None);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_message_is_not_found() {
        let store = StaticMessageStore::new("p", "");
        assert_eq!(store.lookup("p").await.unwrap(), None);
    }

    #[test]
    fn test_from_config_picks_source() {
        let mut config = AppConfig::default();
        assert_eq!(from_config(&config).source(), PasscodeSource::Database);

        config.passcode.source = PasscodeSource::Static;
        config.passcode.static_passcode = Some("abc".to_string());
        config.passcode.static_message = Some("hello".to_string());
        assert_eq!(from_config(&config).source(), PasscodeSource::Static);
    }
}
