//! Core types for the futures testnet trading client
//!
//! This crate defines the data structures shared by the exchange adapter and
//! the interactive terminal: order requests, exchange acknowledgements,
//! balances, credentials, the error taxonomy, and the `ExchangeApi` seam.

pub mod account;
pub mod credentials;
pub mod error;
pub mod exchange;
pub mod order;

pub use account::{AccountSummary, AssetBalance};
pub use credentials::Credentials;
pub use error::{TraderError, TraderResult};
pub use exchange::ExchangeApi;
pub use order::{
    normalize_symbol, parse_price, parse_quantity, OrderAck, OrderKind, OrderRequest, Side,
    TimeInForce, WorkingType,
};
