//! Runtime configuration from the environment

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use trader_binance::{credentials_from_lookup, ClientConfig};
use trader_core::{Credentials, TraderError, TraderResult};

use crate::logging::OperationLog;

pub const LOG_FILE_VAR: &str = "TRADER_LOG_FILE";
pub const LOG_LEVEL_VAR: &str = "TRADER_LOG_LEVEL";
pub const RECV_WINDOW_VAR: &str = "TRADER_RECV_WINDOW_MS";
pub const HTTP_TIMEOUT_VAR: &str = "TRADER_HTTP_TIMEOUT_SECS";

const DEFAULT_LOG_FILE: &str = "trading_bot.log";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Everything the binary needs before it touches the network
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub log_file: PathBuf,
    /// `EnvFilter` directive for the operational log
    pub log_level: String,
    pub client: ClientConfig,
}

impl Settings {
    pub fn from_lookup<F>(lookup: F) -> TraderResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = credentials_from_lookup(&lookup)?;
        let defaults = ClientConfig::default();

        let log_file = lookup(LOG_FILE_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

        let log_level = lookup(LOG_LEVEL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let recv_window_ms = parse_var(&lookup, RECV_WINDOW_VAR)?.unwrap_or(defaults.recv_window_ms);
        let timeout = parse_var::<u64, _>(&lookup, HTTP_TIMEOUT_VAR)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        if timeout.is_zero() {
            return Err(TraderError::config(format!("{} must be at least 1", HTTP_TIMEOUT_VAR)));
        }

        Ok(Self {
            credentials,
            log_file,
            log_level,
            client: ClientConfig {
                recv_window_ms,
                timeout,
            },
        })
    }
}

/// Load settings from the process environment (after `.env`, if present)
/// and open the operational log they name.
pub fn bootstrap_from_env() -> TraderResult<(Settings, OperationLog)> {
    dotenvy::dotenv().ok();
    bootstrap(|name| std::env::var(name).ok())
}

/// Settings first, then the log. Rejected settings leave no log file behind.
pub fn bootstrap<F>(lookup: F) -> TraderResult<(Settings, OperationLog)>
where
    F: Fn(&str) -> Option<String>,
{
    let settings = Settings::from_lookup(lookup)?;
    let log = OperationLog::open(&settings.log_file, &settings.log_level)?;
    Ok((settings, log))
}

fn parse_var<T, F>(lookup: &F, name: &str) -> TraderResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).map(|v| v.trim().to_string()) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|e| TraderError::config(format!("{}='{}' is invalid: {}", name, v, e))),
    }
}
