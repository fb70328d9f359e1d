//! Credential loading from the process environment

use tracing::debug;
use trader_core::{Credentials, TraderError, TraderResult};

/// Environment variable holding the API key
pub const API_KEY_VAR: &str = "BINANCE_API_KEY";

/// Environment variable holding the API secret
pub const API_SECRET_VAR: &str = "BINANCE_SECRET_KEY";

/// Load credentials from `BINANCE_API_KEY` / `BINANCE_SECRET_KEY`.
///
/// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
pub fn credentials_from_env() -> TraderResult<Credentials> {
    credentials_from_lookup(|name| std::env::var(name).ok())
}

/// Load credentials through an arbitrary variable lookup.
///
/// Missing and blank values are both configuration errors.
pub fn credentials_from_lookup<F>(lookup: F) -> TraderResult<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let missing: Vec<&str> = [API_KEY_VAR, API_SECRET_VAR]
        .into_iter()
        .filter(|name| read(name).is_none())
        .collect();

    match (read(API_KEY_VAR), read(API_SECRET_VAR)) {
        (Some(key), Some(secret)) => {
            let credentials = Credentials::new(key, secret);
            debug!("Loaded API credentials {:?}", credentials);
            Ok(credentials)
        }
        _ => Err(TraderError::config(format!(
            "missing API credentials: {} not set",
            missing.join(", ")
        ))),
    }
}
