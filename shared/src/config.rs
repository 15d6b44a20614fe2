//! Configuration management for Lambda functions.

use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database URL, e.g. `sqlite:///mnt/data/availability.db`
    pub database_url: String,
    /// Maximum connections held by the pool
    pub max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables, falling back to a
    /// local database file.
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://availability.db".to_string()),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(5),
        }
    }
}
