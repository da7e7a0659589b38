//! PostgreSQL-backed message store.
//!
//! No pooling: every operation opens its own connection (retrying with
//! backoff), runs a single statement and closes the connection again.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::instrument;

use super::retry::{with_retries, RetryPolicy};
use super::{MessageStore, StoreError};
use crate::config::{DatabaseConfig, PasscodeSource};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS messages (
    id SERIAL PRIMARY KEY,
    passcode TEXT NOT NULL,
    message TEXT NOT NULL
)";

const LOOKUP_SQL: &str = "SELECT message FROM messages WHERE passcode = $1 ORDER BY id LIMIT 1";

const PING_SQL: &str = "SELECT 1";

pub struct PgMessageStore {
    options: PgConnectOptions,
    retry: RetryPolicy,
}

impl PgMessageStore {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password);

        Self::with_options(options, RetryPolicy::from_config(config))
    }

    pub fn with_options(options: PgConnectOptions, retry: RetryPolicy) -> Self {
        Self { options, retry }
    }

    /// Open a connection, retrying transient failures per the retry policy.
    pub async fn connect(&self) -> Result<PgConnection, StoreError> {
        with_retries(
            &self.retry,
            || PgConnection::connect_with(&self.options),
            is_retryable,
        )
        .await
        .map_err(|exhausted| StoreError::Connect {
            attempts: exhausted.attempts,
            source: exhausted.error,
        })
    }
}

/// Malformed connection settings will not fix themselves.
fn is_retryable(err: &sqlx::Error) -> bool {
    !matches!(err, sqlx::Error::Configuration(_))
}

async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "Error closing database connection");
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    fn source(&self) -> PasscodeSource {
        PasscodeSource::Database
    }

    #[instrument(name = "store::initialize", skip(self))]
    async fn initialize(&self) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(CREATE_TABLE_SQL).execute(&mut conn).await;
        close(conn).await;
        result?;
        tracing::info!("Ensured messages table exists");
        Ok(())
    }

    #[instrument(name = "store::lookup", skip_all, fields(passcode_len = passcode.len()))]
    async fn lookup(&self, passcode: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query_scalar::<_, String>(LOOKUP_SQL)
            .bind(passcode)
            .fetch_optional(&mut conn)
            .await;
        close(conn).await;

        // An empty message counts as no match
        Ok(result?.filter(|message| !message.is_empty()))
    }

    #[instrument(name = "store::ping", skip(self))]
    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(PING_SQL).execute(&mut conn).await;
        close(conn).await;
        result?;
        Ok(())
    }
}
