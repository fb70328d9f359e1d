//! Order requests and exchange acknowledgements

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{TraderError, TraderResult};

// ============================================================================
// Enums
// ============================================================================

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; anything other than buy/sell is an error, never a
/// default side.
impl FromStr for Side {
    type Err = TraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(TraderError::invalid_input(format!(
                "side must be 'buy' or 'sell', got '{}'",
                other
            ))),
        }
    }
}

/// Time in force for resting orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good-Till-Cancelled - rests in book until filled or cancelled
    Gtc,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
        }
    }
}

/// Price a stop trigger is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkingType {
    ContractPrice,
    MarkPrice,
}

impl WorkingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkingType::ContractPrice => "CONTRACT_PRICE",
            WorkingType::MarkPrice => "MARK_PRICE",
        }
    }
}

// ============================================================================
// Input parsing
// ============================================================================

/// Trim and upper-case an instrument identifier.
///
/// Delivery contracts carry an expiry suffix (`BTCUSDT_250627`), so `_` is
/// accepted. Whether the symbol exists is left to the exchange.
pub fn normalize_symbol(raw: &str) -> TraderResult<String> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err(TraderError::invalid_input("symbol is required"));
    }
    if !symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(TraderError::invalid_input(format!(
            "symbol '{}' may only contain letters, digits and '_'",
            symbol
        )));
    }
    Ok(symbol)
}

fn parse_positive(raw: &str, what: &str) -> TraderResult<Decimal> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(TraderError::invalid_input(format!("{} is required", what)));
    }
    // `Decimal::from_str` skips digit separators
    if text.contains('_') {
        return Err(TraderError::invalid_input(format!(
            "{} '{}' is not a decimal number",
            what, text
        )));
    }
    let value = Decimal::from_str(text).map_err(|_| {
        TraderError::invalid_input(format!("{} '{}' is not a decimal number", what, text))
    })?;
    if value <= Decimal::ZERO {
        return Err(TraderError::invalid_input(format!(
            "{} must be positive, got {}",
            what, text
        )));
    }
    Ok(value)
}

/// Parse an order quantity. The decimal keeps the scale the user typed.
pub fn parse_quantity(raw: &str) -> TraderResult<Decimal> {
    parse_positive(raw, "quantity")
}

/// Parse a price. `"50000.00"` round-trips to `"50000.00"`.
pub fn parse_price(raw: &str) -> TraderResult<Decimal> {
    parse_positive(raw, "price")
}

// ============================================================================
// Order Request
// ============================================================================

/// Variant-specific order fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderKind {
    Market,
    Limit {
        price: Decimal,
        time_in_force: TimeInForce,
    },
    /// Becomes a limit order at `limit_price` once `stop_price` trades.
    /// The trigger is always evaluated against contract price.
    StopLimit {
        stop_price: Decimal,
        limit_price: Decimal,
        time_in_force: TimeInForce,
        working_type: WorkingType,
    },
}

/// A validated order, built per command and dropped after submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub kind: OrderKind,
}

impl OrderRequest {
    pub fn market(symbol: &str, side: Side, quantity: Decimal) -> TraderResult<Self> {
        Self::build(symbol, side, quantity, OrderKind::Market)
    }

    pub fn limit(symbol: &str, side: Side, quantity: Decimal, price: Decimal) -> TraderResult<Self> {
        Self::build(
            symbol,
            side,
            quantity,
            OrderKind::Limit {
                price,
                time_in_force: TimeInForce::Gtc,
            },
        )
    }

    pub fn stop_limit(
        symbol: &str,
        side: Side,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Decimal,
    ) -> TraderResult<Self> {
        Self::build(
            symbol,
            side,
            quantity,
            OrderKind::StopLimit {
                stop_price,
                limit_price,
                time_in_force: TimeInForce::Gtc,
                working_type: WorkingType::ContractPrice,
            },
        )
    }

    fn build(symbol: &str, side: Side, quantity: Decimal, kind: OrderKind) -> TraderResult<Self> {
        let symbol = normalize_symbol(symbol)?;
        if quantity <= Decimal::ZERO {
            return Err(TraderError::invalid_input("quantity must be positive"));
        }
        let prices_positive = match &kind {
            OrderKind::Market => true,
            OrderKind::Limit { price, .. } => *price > Decimal::ZERO,
            OrderKind::StopLimit {
                stop_price,
                limit_price,
                ..
            } => *stop_price > Decimal::ZERO && *limit_price > Decimal::ZERO,
        };
        if !prices_positive {
            return Err(TraderError::invalid_input("prices must be positive"));
        }
        Ok(Self {
            symbol,
            side,
            quantity,
            kind,
        })
    }

    /// Human label used in messages and log lines
    pub fn label(&self) -> &'static str {
        match self.kind {
            OrderKind::Market => "Market",
            OrderKind::Limit { .. } => "Limit",
            OrderKind::StopLimit { .. } => "Stop-Limit",
        }
    }

    /// Exchange order type code
    pub fn type_code(&self) -> &'static str {
        match self.kind {
            OrderKind::Market => "MARKET",
            OrderKind::Limit { .. } => "LIMIT",
            OrderKind::StopLimit { .. } => "STOP",
        }
    }
}

impl fmt::Display for OrderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.label(), self.side, self.quantity, self.symbol)?;
        match &self.kind {
            OrderKind::Market => Ok(()),
            OrderKind::Limit { price, time_in_force } => {
                write!(f, " @ {} {}", price, time_in_force.as_str())
            }
            OrderKind::StopLimit {
                stop_price,
                limit_price,
                working_type,
                ..
            } => write!(
                f,
                " stop {} limit {} ({})",
                stop_price,
                limit_price,
                working_type.as_str()
            ),
        }
    }
}

// ============================================================================
// Acknowledgement
// ============================================================================

/// Exchange response to an accepted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    pub order_id: u64,
    pub symbol: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default, rename = "type")]
    pub order_type: Option<String>,
}
