//! # Configuration Error Types Module
//!
//! Errors raised while reading the bot configuration from the environment.
//! Any of them aborts startup before the bot or the database is contacted.

/// Custom error types for configuration loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required key is not set
    Missing(String),
    /// A required key is set to an empty string
    Empty(String),
    /// The database port is not a valid TCP port
    InvalidPort(String),
    /// An optional numeric key holds something that is not a number
    InvalidNumber { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "Missing environment variable: {key}"),
            ConfigError::Empty(key) => write!(f, "Environment variable is empty: {key}"),
            ConfigError::InvalidPort(value) => write!(f, "Invalid database port: {value}"),
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "Invalid number for {key}: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
