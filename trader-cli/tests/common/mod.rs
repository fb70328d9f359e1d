//! Shared test doubles: an in-memory exchange and a captured log

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;
use trader_cli::OperationLog;
use trader_core::{
    AccountSummary, AssetBalance, ExchangeApi, OrderAck, OrderRequest, TraderError, TraderResult,
};

/// Log writer backed by a shared buffer
#[derive(Clone, Default)]
pub struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLog {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn operation_log(&self) -> OperationLog {
        let writer = self.clone();
        OperationLog::with_writer(move || writer.clone(), EnvFilter::new("info"))
    }
}

/// What the mock does when an order arrives
#[derive(Debug, Clone)]
pub enum OrderBehaviour {
    Accept { order_id: u64 },
    Reject { code: i64, message: String },
    Unreachable,
}

/// In-memory exchange that records every call
pub struct MockExchange {
    pub server_time: Option<i64>,
    pub account_ok: bool,
    /// `Err` holds the transport failure to report
    pub balances: Result<Vec<AssetBalance>, String>,
    pub order_behaviour: OrderBehaviour,
    pub time_offset: i64,
    pub server_time_calls: Mutex<u32>,
    pub submitted: Mutex<Vec<OrderRequest>>,
    /// Offset in effect at the moment each order was submitted
    pub offsets_seen: Mutex<Vec<i64>>,
}

impl Default for MockExchange {
    fn default() -> Self {
        Self {
            server_time: Some(chrono::Utc::now().timestamp_millis()),
            account_ok: true,
            balances: Ok(Vec::new()),
            order_behaviour: OrderBehaviour::Accept { order_id: 123 },
            time_offset: 0,
            server_time_calls: Mutex::new(0),
            submitted: Mutex::new(Vec::new()),
            offsets_seen: Mutex::new(Vec::new()),
        }
    }
}

impl MockExchange {
    pub fn accepting(order_id: u64) -> Self {
        Self {
            order_behaviour: OrderBehaviour::Accept { order_id },
            ..Self::default()
        }
    }

    pub fn rejecting(code: i64, message: &str) -> Self {
        Self {
            order_behaviour: OrderBehaviour::Reject {
                code,
                message: message.to_string(),
            },
            ..Self::default()
        }
    }

    pub fn submitted(&self) -> Vec<OrderRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExchangeApi for MockExchange {
    async fn server_time(&self) -> TraderResult<i64> {
        *self.server_time_calls.lock().unwrap() += 1;
        self.server_time
            .ok_or_else(|| TraderError::network("connection refused"))
    }

    fn time_offset(&self) -> i64 {
        self.time_offset
    }

    fn set_time_offset(&mut self, offset_ms: i64) {
        self.time_offset = offset_ms;
    }

    async fn account(&self) -> TraderResult<AccountSummary> {
        if self.account_ok {
            Ok(AccountSummary {
                can_trade: true,
                ..AccountSummary::default()
            })
        } else {
            Err(TraderError::exchange(-2015, "Invalid API-key, IP, or permissions for action."))
        }
    }

    async fn balances(&self) -> TraderResult<Vec<AssetBalance>> {
        match &self.balances {
            Ok(rows) => Ok(rows.clone()),
            Err(reason) => Err(TraderError::network(reason.clone())),
        }
    }

    async fn create_order(&self, order: &OrderRequest) -> TraderResult<OrderAck> {
        self.submitted.lock().unwrap().push(order.clone());
        self.offsets_seen.lock().unwrap().push(self.time_offset);
        match &self.order_behaviour {
            OrderBehaviour::Accept { order_id } => Ok(OrderAck {
                order_id: *order_id,
                symbol: order.symbol.clone(),
                status: "NEW".to_string(),
                client_order_id: Some("mock".to_string()),
                order_type: Some(order.type_code().to_string()),
            }),
            OrderBehaviour::Reject { code, message } => Err(TraderError::exchange(*code, message.clone())),
            OrderBehaviour::Unreachable => Err(TraderError::network("operation timed out")),
        }
    }
}
