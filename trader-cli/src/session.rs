//! Authenticated, clock-synchronized exchange session

use chrono::Utc;
use tracing::{error, info, warn};
use trader_binance::{BinanceFuturesClient, TESTNET_BASE_URL};
use trader_core::{AccountSummary, ExchangeApi, TraderResult};

use crate::config::Settings;
use crate::logging::OperationLog;

/// Result of the startup connectivity check
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected(AccountSummary),
    /// The session keeps running; each later call reports its own failure.
    Degraded(String),
}

/// Owns the exchange handle and the clock offset for the process lifetime.
///
/// Startup (`sync_clock`, `start`) takes `&mut self`; everything afterwards
/// only borrows, so the offset cannot change once orders start flowing.
pub struct Session<A> {
    api: A,
    log: OperationLog,
    clock_offset_ms: Option<i64>,
}

impl Session<BinanceFuturesClient> {
    /// Build the testnet client. Failure here is fatal to the caller.
    pub fn connect(settings: &Settings, log: OperationLog) -> TraderResult<Self> {
        let api = log.in_scope(|| {
            info!(
                "Connecting to {} with key {}",
                TESTNET_BASE_URL,
                settings.credentials.key_hint()
            );
            BinanceFuturesClient::testnet(settings.credentials.clone(), settings.client.clone())
                .inspect_err(|e| error!("Connection failed: {}", e))
        })?;

        Ok(Self::with_api(api, log))
    }
}

impl<A: ExchangeApi> Session<A> {
    pub fn with_api(api: A, log: OperationLog) -> Self {
        Self {
            api,
            log,
            clock_offset_ms: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    /// Offset applied to signed requests, once synchronized
    pub fn clock_offset(&self) -> Option<i64> {
        self.clock_offset_ms
    }

    /// Measure `server - local` time once and hand it to the exchange handle.
    ///
    /// A second call returns the stored offset without asking the server.
    pub async fn sync_clock(&mut self) -> TraderResult<i64> {
        let log = self.log.clone();
        log.scope(self.measure_offset()).await
    }

    async fn measure_offset(&mut self) -> TraderResult<i64> {
        if let Some(offset) = self.clock_offset_ms {
            warn!("Clock already synchronized (offset {} ms); keeping it", offset);
            return Ok(offset);
        }

        let sent_at = local_time_ms();
        let server_time = self
            .api
            .server_time()
            .await
            .inspect_err(|e| error!("Time sync failed: {}", e))?;
        let received_at = local_time_ms();

        // Midpoint of the round trip approximates when the server stamped it
        let offset = server_time - (sent_at + received_at) / 2;
        self.api.set_time_offset(offset);
        self.clock_offset_ms = Some(offset);

        info!("Time synchronized. Offset: {} ms", offset);
        Ok(offset)
    }

    /// One authenticated account request to confirm the credentials work
    pub async fn verify(&self) -> ConnectionStatus {
        self.log
            .scope(async {
                match self.api.account().await {
                    Ok(account) => {
                        info!(
                            "Connected to futures testnet (can_trade={}, wallet={})",
                            account.can_trade, account.total_wallet_balance
                        );
                        ConnectionStatus::Connected(account)
                    }
                    Err(e) => {
                        error!("Connection failed: {}", e);
                        ConnectionStatus::Degraded(e.to_string())
                    }
                }
            })
            .await
    }

    /// Clock sync followed by verification. A failed sync leaves the offset
    /// at zero and still runs the verification.
    pub async fn start(&mut self) -> ConnectionStatus {
        if let Err(e) = self.sync_clock().await {
            let status = self.verify().await;
            return match status {
                ConnectionStatus::Connected(_) => status,
                ConnectionStatus::Degraded(reason) => ConnectionStatus::Degraded(format!(
                    "{} (clock sync also failed: {})",
                    reason, e
                )),
            };
        }
        self.verify().await
    }
}

fn local_time_ms() -> i64 {
    Utc::now().timestamp_millis()
}
