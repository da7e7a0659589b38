//! Configuration loading and constants.
//!
//! Loads application configuration from an optional TOML file, then applies
//! the `POSTGRES_*` environment overrides. `AppConfig` is the root configuration
//! struct containing all settings; every section has defaults so an empty file
//! (or no file at all) yields a runnable configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

// =============================================================================
// HTTP Response Headers
// =============================================================================

/// The form page may carry a revealed message and must never be cached
pub const CACHE_CONTROL_FORM: &str = "no-store";

/// Content type for the Prometheus text exposition format
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

// =============================================================================
// Database Retry Constants
// =============================================================================

/// Number of connection attempts before giving up
pub const DB_CONNECT_ATTEMPTS: u32 = 5;

/// Delay before the first reconnect; doubled after every failed attempt
pub const DB_INITIAL_BACKOFF_MS: u64 = 1000;

// =============================================================================
// User-facing Messages
// =============================================================================

/// Shown when the form is submitted without a passcode
pub const MSG_EMPTY_PASSCODE: &str = "Please enter a passcode";

/// Shown when no record matches (and, in generic mode, on storage errors)
pub const MSG_INVALID_PASSCODE: &str = "Invalid passcode. Please try again.";

/// Shown on storage errors when errors are reported distinctly
pub const MSG_SERVICE_UNAVAILABLE: &str =
    "Service temporarily unavailable. Please try again later.";

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path, used only when the file exists
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "passcode_portal=debug,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Environment variables that override the `[database]` section
pub const ENV_DB_HOST: &str = "POSTGRES_HOST";
pub const ENV_DB_PORT: &str = "POSTGRES_PORT";
pub const ENV_DB_NAME: &str = "POSTGRES_DB";
pub const ENV_DB_USER: &str = "POSTGRES_USER";
pub const ENV_DB_PASSWORD: &str = "POSTGRES_PASSWORD";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// PostgreSQL connection settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Where passcodes are checked and how failures are reported
    #[serde(default)]
    pub passcode: PasscodeConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        5000
    }
}

/// PostgreSQL connection settings
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_host")]
    pub host: String,
    #[serde(default = "DatabaseConfig::default_port")]
    pub port: u16,
    /// Database name
    #[serde(default = "DatabaseConfig::default_name")]
    pub name: String,
    #[serde(default = "DatabaseConfig::default_user")]
    pub user: String,
    #[serde(default = "DatabaseConfig::default_password")]
    pub password: String,
    /// Connection attempts per operation (default: 5)
    #[serde(default = "DatabaseConfig::default_connect_attempts")]
    pub connect_attempts: u32,
    /// Delay before the first retry in milliseconds, doubled on each retry (default: 1000)
    #[serde(default = "DatabaseConfig::default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            name: Self::default_name(),
            user: Self::default_user(),
            password: Self::default_password(),
            connect_attempts: Self::default_connect_attempts(),
            initial_backoff_ms: Self::default_initial_backoff_ms(),
        }
    }
}

impl DatabaseConfig {
    fn default_host() -> String {
        "postgres".to_string()
    }

    fn default_port() -> u16 {
        5432
    }

    fn default_name() -> String {
        "webapp".to_string()
    }

    fn default_user() -> String {
        "webapp_user".to_string()
    }

    fn default_password() -> String {
        "webapp_password".to_string()
    }

    fn default_connect_attempts() -> u32 {
        DB_CONNECT_ATTEMPTS
    }

    fn default_initial_backoff_ms() -> u64 {
        DB_INITIAL_BACKOFF_MS
    }

    /// Delay before the first retry
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

// Keeps the password out of logs and panic messages.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("connect_attempts", &self.connect_attempts)
            .field("initial_backoff_ms", &self.initial_backoff_ms)
            .finish()
    }
}

/// Where submitted passcodes are checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasscodeSource {
    /// Look passcodes up in the `messages` table
    #[default]
    Database,
    /// Compare against a single configured passcode
    Static,
}

/// How storage failures are reported to the person submitting the form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorDisclosure {
    /// Storage errors look exactly like a wrong passcode
    #[default]
    Generic,
    /// Storage errors render a "service unavailable" message with 503
    Distinct,
}

#[derive(Clone, Default, Deserialize)]
pub struct PasscodeConfig {
    #[serde(default)]
    pub source: PasscodeSource,
    /// Passcode accepted when `source = "static"`
    pub static_passcode: Option<String>,
    /// Message revealed when `source = "static"`
    pub static_message: Option<String>,
    #[serde(default)]
    pub errors: ErrorDisclosure,
}

impl fmt::Debug for PasscodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasscodeConfig")
            .field("source", &self.source)
            .field("static_passcode", &self.static_passcode.as_ref().map(|_| "<redacted>"))
            .field("static_message", &self.static_message.as_ref().map(|_| "<redacted>"))
            .field("errors", &self.errors)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    /// Page title shown in the browser tab
    #[serde(default = "UiConfig::default_title")]
    pub title: String,
    /// Heading above the form
    #[serde(default = "UiConfig::default_heading")]
    pub heading: String,
    /// Directory with replacement templates; the built-in page is used when unset
    #[serde(default)]
    pub templates_dir: Option<String>,
    /// Version string, populated at runtime
    #[serde(skip_deserializing, default = "UiConfig::default_version")]
    pub version: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            heading: Self::default_heading(),
            templates_dir: None,
            version: Self::default_version(),
        }
    }
}

impl UiConfig {
    fn default_title() -> String {
        "Passcode Entry".to_string()
    }

    fn default_heading() -> String {
        "Enter Passcode".to_string()
    }

    fn default_version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Load configuration from `path` (or defaults when `None`), apply the
    /// process environment, and validate.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => AppConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Apply `POSTGRES_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = &mut self.database;
        if let Some(host) = lookup(ENV_DB_HOST) {
            db.host = host;
        }
        if let Some(port) = lookup(ENV_DB_PORT) {
            db.port = port.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("{} is not a valid port: {:?}", ENV_DB_PORT, port))
            })?;
        }
        if let Some(name) = lookup(ENV_DB_NAME) {
            db.name = name;
        }
        if let Some(user) = lookup(ENV_DB_USER) {
            db.user = user;
        }
        if let Some(password) = lookup(ENV_DB_PASSWORD) {
            db.password = password;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.connect_attempts == 0 {
            return Err(ConfigError::Validation(
                "database.connect_attempts must be at least 1".to_string(),
            ));
        }

        if self.passcode.source == PasscodeSource::Static {
            let has_passcode = self
                .passcode
                .static_passcode
                .as_deref()
                .is_some_and(|p| !p.is_empty());
            if !has_passcode {
                return Err(ConfigError::Validation(
                    "passcode.source = \"static\" requires a non-empty passcode.static_passcode"
                        .to_string(),
                ));
            }
            // Empty messages count as "not found"
            let has_message = self
                .passcode
                .static_message
                .as_deref()
                .is_some_and(|m| !m.is_empty());
            if !has_message {
                return Err(ConfigError::Validation(
                    "passcode.source = \"static\" requires a non-empty passcode.static_message"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
