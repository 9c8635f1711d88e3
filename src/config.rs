//! Server configuration from environment variables

use chrono::{Local, NaiveDateTime, Utc};
use std::env;
use std::time::Duration;

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { var: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { var, value } => {
                write!(f, "Invalid value for {}: '{}'", var, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Wall clock used to derive "now" for bucket keys and capture times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    Local,
    Utc,
}

impl Clock {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Some(Clock::Local),
            "utc" => Some(Clock::Utc),
            _ => None,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::Local => Local::now().naive_local(),
            Clock::Utc => Utc::now().naive_utc(),
        }
    }
}

/// Configuration for the leaderboard server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to SQLite database file
    pub db_path: String,

    /// HTTP listen address
    pub bind_addr: String,

    /// How long a storage call waits on a locked database before failing
    pub busy_timeout: Duration,

    pub clock: Clock,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `LEADERBOARD_DB_PATH` (default: data/leaderboard.db)
    /// - `LEADERBOARD_BIND_ADDR` (default: 0.0.0.0:3000)
    /// - `LEADERBOARD_BUSY_TIMEOUT_MS` (default: 5000)
    /// - `LEADERBOARD_CLOCK` (default: local; `local` or `utc`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let busy_timeout_ms = match env::var("LEADERBOARD_BUSY_TIMEOUT_MS") {
            Ok(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    var: "LEADERBOARD_BUSY_TIMEOUT_MS",
                    value: s,
                })?,
            Err(_) => 5_000,
        };

        let clock = match env::var("LEADERBOARD_CLOCK") {
            Ok(s) => Clock::from_str(s.trim()).ok_or(ConfigError::InvalidValue {
                var: "LEADERBOARD_CLOCK",
                value: s,
            })?,
            Err(_) => Clock::Local,
        };

        Ok(Self {
            db_path: env::var("LEADERBOARD_DB_PATH")
                .unwrap_or_else(|_| "data/leaderboard.db".to_string()),

            bind_addr: env::var("LEADERBOARD_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),

            busy_timeout: Duration::from_millis(busy_timeout_ms),

            clock,
        })
    }
}
