//! Binance USD-M futures testnet client
//!
//! This crate provides:
//! - Credential loading from the environment
//! - HMAC-SHA256 request signing with a server clock offset
//! - The `ExchangeApi` implementation used by the terminal

pub mod client;
pub mod credentials;
pub mod types;

pub use client::{BinanceFuturesClient, ClientConfig, TESTNET_BASE_URL};
pub use credentials::{credentials_from_env, credentials_from_lookup, API_KEY_VAR, API_SECRET_VAR};
