//! Interactive order-entry terminal for the Binance futures testnet
//!
//! Startup loads `Settings`, opens the `OperationLog`, and brings up a
//! clock-synchronized `Session`. The `CommandLoop` then reads one command per
//! line and routes it through the `OrderGateway`.

pub mod config;
pub mod gateway;
pub mod logging;
pub mod repl;
pub mod session;

pub use config::{bootstrap, bootstrap_from_env, Settings};
pub use gateway::{BalanceOutcome, OrderGateway, OrderOutcome};
pub use logging::OperationLog;
pub use repl::{Command, CommandLoop};
pub use session::{ConnectionStatus, Session};
