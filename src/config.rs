// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use thiserror::Error;

/// Seconds between two study-time flushes.
pub const TIME_FLUSH_INTERVAL_SECS: u64 = 30;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub port: u16,
    pub time_flush_interval_secs: u64,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let port = parsed_or("PORT", DEFAULT_PORT)?;

        let time_flush_interval_secs =
            parsed_or("TIME_FLUSH_INTERVAL_SECS", TIME_FLUSH_INTERVAL_SECS)?;
        if time_flush_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "TIME_FLUSH_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            port,
            time_flush_interval_secs,
        })
    }
}
