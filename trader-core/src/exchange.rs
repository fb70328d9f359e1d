//! The seam between the terminal and an exchange

use async_trait::async_trait;

use crate::account::{AccountSummary, AssetBalance};
use crate::error::TraderResult;
use crate::order::{OrderAck, OrderRequest};

/// Authenticated exchange handle.
///
/// Signed calls embed `local time + time_offset()` as their timestamp. The
/// offset is set once during session startup and read-only afterwards.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Exchange server time in epoch milliseconds
    async fn server_time(&self) -> TraderResult<i64>;

    /// Offset in milliseconds added to local time on signed requests
    fn time_offset(&self) -> i64;

    fn set_time_offset(&mut self, offset_ms: i64);

    async fn account(&self) -> TraderResult<AccountSummary>;

    async fn balances(&self) -> TraderResult<Vec<AssetBalance>>;

    async fn create_order(&self, order: &OrderRequest) -> TraderResult<OrderAck>;
}
