//! Server configuration

use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Restaurant account used when none is configured (development only)
pub const DEV_RESTAURANT_ACCOUNT: &str = "9999999999";

/// Order server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ENVIRONMENT | development | development / staging / production |
/// | HTTP_PORT | 3000 | HTTP + WebSocket port |
/// | DATABASE_PATH | data/orders.db | SQLite database file |
/// | BANK_API_URL | http://localhost:4000/api | banking service base URL |
/// | RESTAURANT_ACCOUNT_NUMBER | 9999999999 (dev only) | transfer destination |
/// | BANK_TIMEOUT_MS | 10000 | timeout for every bank call |
/// | LOG_LEVEL | info | tracing level |
/// | LOG_DIR | - | rolling log directory |
/// | EVENT_CHANNEL_CAPACITY | 1024 | real-time event buffer |
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    pub http_port: u16,
    pub database_path: String,
    pub bank_api_url: String,
    pub restaurant_account_number: String,
    pub bank_timeout_ms: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub event_channel_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let restaurant_account_number = match std::env::var("RESTAURANT_ACCOUNT_NUMBER") {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ if environment == "development" => DEV_RESTAURANT_ACCOUNT.to_string(),
            _ => {
                return Err(format!(
                    "RESTAURANT_ACCOUNT_NUMBER must be set in {environment} environment"
                )
                .into());
            }
        };

        Ok(Self {
            http_port: env_parse("HTTP_PORT", 3000),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/orders.db".into()),
            bank_api_url: std::env::var("BANK_API_URL")
                .unwrap_or_else(|_| "http://localhost:4000/api".into()),
            restaurant_account_number,
            bank_timeout_ms: env_parse("BANK_TIMEOUT_MS", 10_000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            event_channel_capacity: env_parse("EVENT_CHANNEL_CAPACITY", 1024),
            environment,
        })
    }

    /// Defaults suitable for tests: in-memory friendly, short bank timeout
    pub fn for_tests(bank_api_url: impl Into<String>) -> Self {
        Self {
            environment: "development".into(),
            http_port: 0,
            database_path: ":memory:".into(),
            bank_api_url: bank_api_url.into(),
            restaurant_account_number: DEV_RESTAURANT_ACCOUNT.into(),
            bank_timeout_ms: 2_000,
            log_level: "debug".into(),
            log_dir: None,
            event_channel_capacity: 64,
        }
    }

    pub fn bank_timeout(&self) -> Duration {
        Duration::from_millis(self.bank_timeout_ms)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
