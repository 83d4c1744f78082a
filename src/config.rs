//! Process configuration read from environment variables.
//!
//! Values are read after `dotenvy` has loaded any `.env` file. Every variable
//! has a default except `DATABASE_URL`, which is required for the `postgres`
//! storage mode.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: u64 = 10_000;
const DEFAULT_NOTIFICATION_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_NOTIFICATION_BACKOFF_MS: u64 = 200;
const DEFAULT_MAIL_FROM: &str = "no-reply@taskboard.local";
const DEFAULT_OUTBOX_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_OUTBOX_LEASE_SECS: u64 = 60;

/// Backing store for tasks and identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local maps; state is lost on restart.
    #[default]
    InMemory,
    /// `PostgreSQL` through Diesel.
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigError::InvalidStorageMode(value.to_owned())),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(value.to_owned())),
        }
    }
}

/// Credentials for an admin account created at startup if missing.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminBootstrap {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Backing store selection.
    pub storage_mode: StorageMode,
    /// `PostgreSQL` URL, required for [`StorageMode::Postgres`].
    pub database_url: Option<String>,
    /// Lifetime of cached task listings.
    pub task_cache_ttl: Duration,
    /// Maximum number of cached task listings.
    pub task_cache_capacity: u64,
    /// Send attempts per notification, at least one.
    pub notification_max_attempts: u32,
    /// Delay before the first notification retry.
    pub notification_backoff: Duration,
    /// Wait between polls of the durable event queue when it is empty.
    pub outbox_poll_interval: Duration,
    /// How long a claimed event stays hidden before it is redelivered.
    pub outbox_lease: Duration,
    /// Sender address for notifications.
    pub mail_from: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// Optional admin account to ensure at startup.
    pub admin: Option<AdminBootstrap>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            storage_mode: StorageMode::default(),
            database_url: None,
            task_cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            task_cache_capacity: DEFAULT_CACHE_CAPACITY,
            notification_max_attempts: DEFAULT_NOTIFICATION_MAX_ATTEMPTS,
            notification_backoff: Duration::from_millis(DEFAULT_NOTIFICATION_BACKOFF_MS),
            outbox_poll_interval: Duration::from_millis(DEFAULT_OUTBOX_POLL_INTERVAL_MS),
            outbox_lease: Duration::from_secs(DEFAULT_OUTBOX_LEASE_SECS),
            mail_from: DEFAULT_MAIL_FROM.to_owned(),
            log_format: LogFormat::default(),
            admin: None,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable holds an invalid value or
    /// `DATABASE_URL` is missing in `postgres` mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let storage_mode = read("STORAGE_MODE")
            .map(|value| value.parse::<StorageMode>())
            .transpose()?
            .unwrap_or(defaults.storage_mode);
        let database_url = read("DATABASE_URL");
        if storage_mode == StorageMode::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        let cache_ttl_secs = parse_number("TASK_CACHE_TTL_SECS", read("TASK_CACHE_TTL_SECS"))?
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);
        if cache_ttl_secs == 0 {
            return Err(ConfigError::OutOfRange {
                key: "TASK_CACHE_TTL_SECS",
                minimum: 1,
            });
        }
        let notification_max_attempts =
            parse_number("NOTIFICATION_MAX_ATTEMPTS", read("NOTIFICATION_MAX_ATTEMPTS"))?
                .unwrap_or(DEFAULT_NOTIFICATION_MAX_ATTEMPTS);
        if notification_max_attempts == 0 {
            return Err(ConfigError::OutOfRange {
                key: "NOTIFICATION_MAX_ATTEMPTS",
                minimum: 1,
            });
        }

        let outbox_lease_secs = parse_number("OUTBOX_LEASE_SECS", read("OUTBOX_LEASE_SECS"))?
            .unwrap_or(DEFAULT_OUTBOX_LEASE_SECS);
        if outbox_lease_secs == 0 {
            return Err(ConfigError::OutOfRange {
                key: "OUTBOX_LEASE_SECS",
                minimum: 1,
            });
        }

        Ok(Self {
            host: read("HOST").unwrap_or(defaults.host),
            port: parse_number("PORT", read("PORT"))?.unwrap_or(defaults.port),
            storage_mode,
            database_url,
            task_cache_ttl: Duration::from_secs(cache_ttl_secs),
            task_cache_capacity: parse_number("TASK_CACHE_CAPACITY", read("TASK_CACHE_CAPACITY"))?
                .unwrap_or(defaults.task_cache_capacity),
            notification_max_attempts,
            notification_backoff: parse_number(
                "NOTIFICATION_RETRY_BACKOFF_MS",
                read("NOTIFICATION_RETRY_BACKOFF_MS"),
            )?
            .map_or(defaults.notification_backoff, Duration::from_millis),
            outbox_poll_interval: parse_number(
                "OUTBOX_POLL_INTERVAL_MS",
                read("OUTBOX_POLL_INTERVAL_MS"),
            )?
            .map_or(defaults.outbox_poll_interval, Duration::from_millis),
            outbox_lease: Duration::from_secs(outbox_lease_secs),
            mail_from: read("MAIL_FROM").unwrap_or(defaults.mail_from),
            log_format: read("LOG_FORMAT")
                .map(|value| value.parse::<LogFormat>())
                .transpose()?
                .unwrap_or(defaults.log_format),
            admin: read_admin(&read)?,
        })
    }

    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] when `host:port` does not parse.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let candidate = format!("{}:{}", self.host, self.port);
        candidate
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(candidate))
    }
}

fn parse_number<T: FromStr>(
    key: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.parse()
                .map_err(|_| ConfigError::InvalidNumber { key, value: raw })
        })
        .transpose()
}

fn read_admin(
    read: &impl Fn(&str) -> Option<String>,
) -> Result<Option<AdminBootstrap>, ConfigError> {
    match (read("ADMIN_EMAIL"), read("ADMIN_PASSWORD")) {
        (Some(email), Some(password)) => Ok(Some(AdminBootstrap {
            name: read("ADMIN_NAME").unwrap_or_else(|| "Administrator".to_owned()),
            email,
            password,
        })),
        (None, None) => Ok(None),
        _ => Err(ConfigError::IncompleteAdmin),
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `STORAGE_MODE` is not recognized.
    #[error("invalid storage mode: '{0}'. Expected 'in_memory' or 'postgres'")]
    InvalidStorageMode(String),

    /// `LOG_FORMAT` is not recognized.
    #[error("invalid log format: '{0}'. Expected 'text' or 'json'")]
    InvalidLogFormat(String),

    /// `DATABASE_URL` is missing in postgres mode.
    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    /// A numeric variable does not parse.
    #[error("{key} must be a number, got '{value}'")]
    InvalidNumber {
        /// Variable name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },

    /// A numeric variable is below its minimum.
    #[error("{key} must be at least {minimum}")]
    OutOfRange {
        /// Variable name.
        key: &'static str,
        /// Smallest accepted value.
        minimum: u64,
    },

    /// Only one of `ADMIN_EMAIL` and `ADMIN_PASSWORD` is set.
    #[error("ADMIN_EMAIL and ADMIN_PASSWORD must be set together")]
    IncompleteAdmin,

    /// `HOST` and `PORT` do not form a socket address.
    #[error("invalid server address: {0}")]
    InvalidAddress(String),
}
