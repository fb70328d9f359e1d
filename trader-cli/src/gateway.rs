//! Balance queries and order submission
//!
//! Every operation takes raw user text, validates it locally, makes at most
//! one exchange call, and folds the result into an outcome value. Nothing in
//! here returns an error to the caller.

use tracing::{error, info, warn};
use trader_core::{
    parse_price, parse_quantity, AssetBalance, ExchangeApi, OrderAck, OrderRequest, Side,
    TraderResult,
};

use crate::logging::OperationLog;
use crate::session::Session;

/// Asset reported by the balance command
pub const BALANCE_ASSET: &str = "USDT";

/// Outcome of one order command
#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    Placed { order: OrderRequest, ack: OrderAck },
    /// Input failed validation; nothing was sent
    Rejected { label: &'static str, reason: String },
    /// The exchange call failed
    Failed { label: &'static str, reason: String },
}

impl OrderOutcome {
    pub fn order_id(&self) -> Option<u64> {
        match self {
            OrderOutcome::Placed { ack, .. } => Some(ack.order_id),
            _ => None,
        }
    }
}

/// Outcome of the balance command
#[derive(Debug, Clone, PartialEq)]
pub enum BalanceOutcome {
    Found(AssetBalance),
    NotFound,
    Failed { reason: String },
}

/// Stateless front for the session's exchange handle
pub struct OrderGateway<'s, A> {
    session: &'s Session<A>,
    log: OperationLog,
}

impl<'s, A: ExchangeApi> OrderGateway<'s, A> {
    pub fn new(session: &'s Session<A>) -> Self {
        Self {
            session,
            log: session.log().clone(),
        }
    }

    pub async fn get_balance(&self) -> BalanceOutcome {
        self.log
            .scope(async {
                match self.session.api().balances().await {
                    Ok(balances) => match AssetBalance::find(&balances, BALANCE_ASSET) {
                        Some(entry) => {
                            info!("Balance fetched: {} {}", entry.balance, entry.asset);
                            BalanceOutcome::Found(entry.clone())
                        }
                        None => {
                            warn!(
                                "No {} balance among {} assets",
                                BALANCE_ASSET,
                                balances.len()
                            );
                            BalanceOutcome::NotFound
                        }
                    },
                    Err(e) => {
                        error!("Balance fetch error: {}", e);
                        BalanceOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            })
            .await
    }

    pub async fn place_market_order(&self, symbol: &str, side: &str, quantity: &str) -> OrderOutcome {
        let request = market_request(symbol, side, quantity);
        self.submit("Market", request).await
    }

    /// Good-till-cancelled limit order. `price` is relayed with the exact
    /// digits given.
    pub async fn place_limit_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: &str,
        price: &str,
    ) -> OrderOutcome {
        let request = limit_request(symbol, side, quantity, price);
        self.submit("Limit", request).await
    }

    /// Stop order triggering at `stop_price` (contract price) and resting at
    /// `limit_price` once triggered.
    pub async fn place_stop_limit_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: &str,
        stop_price: &str,
        limit_price: &str,
    ) -> OrderOutcome {
        let request = stop_limit_request(symbol, side, quantity, stop_price, limit_price);
        self.submit("Stop-Limit", request).await
    }

    async fn submit(&self, label: &'static str, request: TraderResult<OrderRequest>) -> OrderOutcome {
        self.log
            .scope(async {
                let order = match request {
                    Ok(order) => order,
                    Err(e) => {
                        warn!("{} order rejected before submission: {}", label, e);
                        return OrderOutcome::Rejected {
                            label,
                            reason: e.to_string(),
                        };
                    }
                };

                match self.session.api().create_order(&order).await {
                    Ok(ack) => {
                        info!("{} order placed: {} -> {:?}", label, order, ack);
                        OrderOutcome::Placed { order, ack }
                    }
                    Err(e) => {
                        error!("{} order failed: {} [{}]", label, e, order);
                        OrderOutcome::Failed {
                            label,
                            reason: e.to_string(),
                        }
                    }
                }
            })
            .await
    }
}

fn market_request(symbol: &str, side: &str, quantity: &str) -> TraderResult<OrderRequest> {
    let side: Side = side.parse()?;
    OrderRequest::market(symbol, side, parse_quantity(quantity)?)
}

fn limit_request(symbol: &str, side: &str, quantity: &str, price: &str) -> TraderResult<OrderRequest> {
    let side: Side = side.parse()?;
    OrderRequest::limit(symbol, side, parse_quantity(quantity)?, parse_price(price)?)
}

fn stop_limit_request(
    symbol: &str,
    side: &str,
    quantity: &str,
    stop_price: &str,
    limit_price: &str,
) -> TraderResult<OrderRequest> {
    let side: Side = side.parse()?;
    OrderRequest::stop_limit(
        symbol,
        side,
        parse_quantity(quantity)?,
        parse_price(stop_price)?,
        parse_price(limit_price)?,
    )
}
