use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};

const DEFAULT_PORT: &str = "3000";
const DEFAULT_DATABASE_PATH: &str = "vouchers.db";
const DEFAULT_API_MODE: &str = "server";

/// How requests are addressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApiMode {
    /// Long-running server, identifier in the path.
    Server,
    /// Per-request dispatcher, identifier and action in the query string.
    Handler,
}

impl FromStr for ApiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(ApiMode::Server),
            "handler" => Ok(ApiMode::Handler),
            other => Err(format!("unknown api mode '{}'", other)),
        }
    }
}

impl Display for ApiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiMode::Server => write!(f, "server"),
            ApiMode::Handler => write!(f, "handler"),
        }
    }
}

#[derive(Debug)]
pub struct ConfigError {
    key: String,
    reason: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.key, self.reason)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub api_mode: ApiMode,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: try_load(&lookup, "PORT", DEFAULT_PORT)?,
            database_path: try_load(&lookup, "DATABASE_PATH", DEFAULT_DATABASE_PATH)?,
            api_mode: try_load(&lookup, "API_MODE", DEFAULT_API_MODE)?,
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })
}
