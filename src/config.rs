use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::datasource::nasa::DEFAULT_BASE_URL;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub neo_api_url: String,
    pub neo_api_key: String,
    pub refresh: RefreshConfig,
    pub refresh_interval: Duration,
    pub http_timeout: Duration,
}

/// Knobs for one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    pub window_days: u32,
    pub chunk_days: u32,
    pub enrich_concurrency: usize,
    pub lease_ttl: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            window_days: 30,
            chunk_days: 7,
            enrich_concurrency: 5,
            lease_ttl: Duration::from_secs(900),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = parse_or::<u16>(&env_map, "PORT", 8080, "must be a valid u16")?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let neo_api_url = env_map
            .get("NEO_API_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let neo_api_key = env_map
            .get("NEO_API_KEY")
            .cloned()
            .unwrap_or_else(|| "DEMO_KEY".to_string());

        let window_days = parse_or::<u32>(
            &env_map,
            "REFRESH_WINDOW_DAYS",
            30,
            "must be a positive integer",
        )?;
        if window_days == 0 {
            return Err(invalid("REFRESH_WINDOW_DAYS", "must be a positive integer"));
        }

        // The feed rejects ranges longer than seven days.
        let chunk_days = parse_or::<u32>(&env_map, "REFRESH_CHUNK_DAYS", 7, "must be 1..=7")?;
        if !(1..=7).contains(&chunk_days) {
            return Err(invalid("REFRESH_CHUNK_DAYS", "must be 1..=7"));
        }

        let enrich_concurrency =
            parse_or::<usize>(&env_map, "ENRICH_CONCURRENCY", 5, "must be 1..=32")?;
        if !(1..=32).contains(&enrich_concurrency) {
            return Err(invalid("ENRICH_CONCURRENCY", "must be 1..=32"));
        }

        let lease_secs = parse_or::<u64>(
            &env_map,
            "REFRESH_LEASE_SECS",
            900,
            "must be a positive integer",
        )?;
        let interval_secs = parse_or::<u64>(
            &env_map,
            "REFRESH_INTERVAL_SECS",
            86_400,
            "must be a positive integer",
        )?;
        let timeout_secs = parse_or::<u64>(
            &env_map,
            "HTTP_TIMEOUT_SECS",
            20,
            "must be a positive integer",
        )?;
        for (key, value) in [
            ("REFRESH_LEASE_SECS", lease_secs),
            ("REFRESH_INTERVAL_SECS", interval_secs),
            ("HTTP_TIMEOUT_SECS", timeout_secs),
        ] {
            if value == 0 {
                return Err(invalid(key, "must be a positive integer"));
            }
        }

        Ok(Config {
            port,
            database_path,
            neo_api_url,
            neo_api_key,
            refresh: RefreshConfig {
                window_days,
                chunk_days,
                enrich_concurrency,
                lease_ttl: Duration::from_secs(lease_secs),
            },
            refresh_interval: Duration::from_secs(interval_secs),
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue(key.to_string(), reason.to_string())
}

fn parse_or<T: FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
    reason: &str,
) -> Result<T, ConfigError> {
    match env_map.get(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| invalid(key, reason)),
        None => Ok(default),
    }
}
