//! # Configuration Module
//!
//! Reads the bot token and the Postgres connection settings from the
//! environment and turns them into sqlx connection and pool options.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::config_errors::ConfigError;

// Environment keys
pub const BOT_TOKEN_KEY: &str = "BOT_TOKEN";
pub const POSTGRES_HOST_KEY: &str = "POSTGRES_HOST";
pub const POSTGRES_PORT_KEY: &str = "POSTGRES_PORT";
pub const POSTGRES_DB_KEY: &str = "POSTGRES_DB";
pub const POSTGRES_USER_KEY: &str = "POSTGRES_USER";
pub const POSTGRES_PASSWORD_KEY: &str = "POSTGRES_PASSWORD";
pub const POSTGRES_IDLE_TIMEOUT_KEY: &str = "POSTGRES_IDLE_TIMEOUT_SECS";
pub const POSTGRES_MAX_CONNECTIONS_KEY: &str = "POSTGRES_MAX_CONNECTIONS";

// Pool defaults
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Postgres connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Idle connections older than this are closed by the pool
    pub idle_timeout_secs: u64,
    pub max_connections: u32,
}

/// Complete bot configuration
#[derive(Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub bot_token: String,
    pub database: DatabaseConfig,
}

impl BotConfig {
    /// Load the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary key lookup
    ///
    /// Required keys that are absent or empty are reported in the order
    /// they are read, so the first problem found is the one returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, ConfigError> {
            match lookup(key) {
                None => Err(ConfigError::Missing(key.to_string())),
                Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(key.to_string())),
                Some(value) => Ok(value),
            }
        };

        let bot_token = required(BOT_TOKEN_KEY)?;
        let host = required(POSTGRES_HOST_KEY)?;
        let port_raw = required(POSTGRES_PORT_KEY)?;
        let port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port_raw.clone()))?;
        let name = required(POSTGRES_DB_KEY)?;
        let user = required(POSTGRES_USER_KEY)?;
        let password = required(POSTGRES_PASSWORD_KEY)?;

        let idle_timeout_secs =
            optional_number(&lookup, POSTGRES_IDLE_TIMEOUT_KEY, DEFAULT_IDLE_TIMEOUT_SECS)?;
        let max_connections =
            optional_number(&lookup, POSTGRES_MAX_CONNECTIONS_KEY, DEFAULT_MAX_CONNECTIONS)?;

        Ok(Self {
            bot_token,
            database: DatabaseConfig {
                host,
                port,
                name,
                user,
                password,
                idle_timeout_secs,
                max_connections,
            },
        })
    }

    /// Connection options for the configured database
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.database.host)
            .port(self.database.port)
            .database(&self.database.name)
            .username(&self.database.user)
            .password(&self.database.password)
    }

    /// Pool options: connections are acquired per statement and recycled
    /// once they have been idle for `idle_timeout_secs`
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.database.max_connections)
            .idle_timeout(Duration::from_secs(self.database.idle_timeout_secs))
    }
}

fn optional_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value,
        }),
    }
}

// Secrets stay out of logs
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"***")
            .field("database", &self.database)
            .finish()
    }
}
