//! Signed REST client for the Binance USD-M futures testnet

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use tracing::{debug, instrument, warn};
use trader_core::{
    AccountSummary, AssetBalance, Credentials, ExchangeApi, OrderAck, OrderKind, OrderRequest,
    TraderError, TraderResult,
};

use crate::types::{ErrorBody, ServerTimeResponse};

// ============================================================================
// Constants
// ============================================================================

/// The only endpoint this client talks to. There is no production URL.
pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";

const HEADER_API_KEY: &str = "X-MBX-APIKEY";

const PATH_TIME: &str = "/fapi/v1/time";
const PATH_ACCOUNT: &str = "/fapi/v2/account";
const PATH_BALANCE: &str = "/fapi/v2/balance";
const PATH_ORDER: &str = "/fapi/v1/order";

type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// Config
// ============================================================================

/// Transport settings for the client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `recvWindow` sent with every signed request; 0 omits it
    pub recv_window_ms: u64,
    /// Per-request transport timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            recv_window_ms: 5_000,
            timeout: Duration::from_secs(10),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Authenticated futures testnet client
pub struct BinanceFuturesClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    config: ClientConfig,
    time_offset_ms: i64,
}

impl BinanceFuturesClient {
    /// Build a client pointed at the futures testnet
    pub fn testnet(credentials: Credentials, config: ClientConfig) -> TraderResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent("futures-testnet-terminal/0.1")
            .timeout(config.timeout)
            .build()
            .map_err(|e| TraderError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: TESTNET_BASE_URL.to_string(),
            credentials,
            config,
            time_offset_ms: 0,
        })
    }

    /// Local epoch milliseconds corrected by the server offset
    fn timestamp(&self) -> i64 {
        Utc::now().timestamp_millis() + self.time_offset_ms
    }

    /// Hex HMAC-SHA256 of `payload` under `secret`
    pub fn sign(secret: &str, payload: &str) -> TraderResult<String> {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| TraderError::config(format!("Failed to create HMAC: {}", e)))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn signed_query(&self, params: &[(&str, String)]) -> TraderResult<String> {
        self.signed_query_at(params, self.timestamp())
    }

    fn signed_query_at(&self, params: &[(&str, String)], timestamp: i64) -> TraderResult<String> {
        let mut params: Vec<(&str, String)> = params.to_vec();
        params.push(("timestamp", timestamp.to_string()));
        if self.config.recv_window_ms > 0 {
            params.push(("recvWindow", self.config.recv_window_ms.to_string()));
        }
        let query = serde_urlencoded::to_string(&params)
            .map_err(|e| TraderError::parse(format!("Failed to encode parameters: {}", e)))?;
        let signature = Self::sign(self.credentials.api_secret(), &query)?;
        Ok(format!("{}&signature={}", query, signature))
    }

    async fn get_public<T: DeserializeOwned>(&self, path: &str) -> TraderResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| TraderError::network(format!("GET {} failed: {}", path, e)))?;

        Self::decode(path, response).await
    }

    async fn get_signed<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> TraderResult<T> {
        let query = self.signed_query(params)?;
        debug!("GET {} (signed, {} params)", path, params.len());

        let response = self
            .http
            .get(format!("{}{}?{}", self.base_url, path, query))
            .header(HEADER_API_KEY, self.credentials.api_key())
            .send()
            .await
            .map_err(|e| TraderError::network(format!("GET {} failed: {}", path, e)))?;

        Self::decode(path, response).await
    }

    async fn post_signed<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> TraderResult<T> {
        let body = self.signed_query(params)?;
        debug!("POST {} (signed, {} params)", path, params.len());

        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header(HEADER_API_KEY, self.credentials.api_key())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| TraderError::network(format!("POST {} failed: {}", path, e)))?;

        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> TraderResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TraderError::network(format!("Failed to read {} response: {}", path, e)))?;

        if !status.is_success() {
            warn!("{} returned {}: {}", path, status, body);
            return Err(error_from_response(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| TraderError::parse(format!("Failed to parse {} response: {}", path, e)))
    }
}

/// Map a non-2xx response to an error, keeping the exchange message verbatim
pub fn error_from_response(status: StatusCode, body: &str) -> TraderError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => TraderError::exchange(err.code, err.msg),
        Err(_) => TraderError::api(format!("{} - {}", status, body)),
    }
}

/// Request parameters for `POST /fapi/v1/order`, in submission order
pub fn order_params(order: &OrderRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("symbol", order.symbol.clone()),
        ("side", order.side.as_str().to_string()),
        ("type", order.type_code().to_string()),
    ];

    match &order.kind {
        OrderKind::Market => {
            params.push(("quantity", order.quantity.to_string()));
        }
        OrderKind::Limit {
            price,
            time_in_force,
        } => {
            params.push(("timeInForce", time_in_force.as_str().to_string()));
            params.push(("quantity", order.quantity.to_string()));
            params.push(("price", price.to_string()));
        }
        OrderKind::StopLimit {
            stop_price,
            limit_price,
            time_in_force,
            working_type,
        } => {
            params.push(("timeInForce", time_in_force.as_str().to_string()));
            params.push(("quantity", order.quantity.to_string()));
            params.push(("price", limit_price.to_string()));
            params.push(("stopPrice", stop_price.to_string()));
            params.push(("workingType", working_type.as_str().to_string()));
        }
    }

    params
}

#[async_trait]
impl ExchangeApi for BinanceFuturesClient {
    #[instrument(skip(self))]
    async fn server_time(&self) -> TraderResult<i64> {
        let response: ServerTimeResponse = self.get_public(PATH_TIME).await?;
        Ok(response.server_time)
    }

    fn time_offset(&self) -> i64 {
        self.time_offset_ms
    }

    fn set_time_offset(&mut self, offset_ms: i64) {
        self.time_offset_ms = offset_ms;
    }

    #[instrument(skip(self))]
    async fn account(&self) -> TraderResult<AccountSummary> {
        self.get_signed(PATH_ACCOUNT, &[]).await
    }

    #[instrument(skip(self))]
    async fn balances(&self) -> TraderResult<Vec<AssetBalance>> {
        self.get_signed(PATH_BALANCE, &[]).await
    }

    #[instrument(skip(self), fields(symbol = %order.symbol, side = %order.side))]
    async fn create_order(&self, order: &OrderRequest) -> TraderResult<OrderAck> {
        let params = order_params(order);
        self.post_signed(PATH_ORDER, &params).await
    }
}

impl std::fmt::Debug for BinanceFuturesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceFuturesClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("recv_window_ms", &self.config.recv_window_ms)
            .field("time_offset_ms", &self.time_offset_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trader_core::Side;

    fn client() -> BinanceFuturesClient {
        BinanceFuturesClient::testnet(
            Credentials::new("test-key", "test-secret"),
            ClientConfig::default(),
        )
        .unwrap()
    }

    fn query_value<'a>(query: &'a str, key: &str) -> Option<&'a str> {
        query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == key).then_some(v)
        })
    }

    #[test]
    fn test_signature_matches_reference_vector() {
        // Reference pair published in the futures API documentation
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let payload = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            BinanceFuturesClient::sign(secret, payload).unwrap(),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_signed_query_layout() {
        let client = client();
        let query = client
            .signed_query_at(&[("symbol", "BTCUSDT".to_string())], 1_700_000_000_000)
            .unwrap();

        let (unsigned, signature) = query.rsplit_once("&signature=").unwrap();
        assert_eq!(
            unsigned,
            "symbol=BTCUSDT&timestamp=1700000000000&recvWindow=5000"
        );
        assert_eq!(
            signature,
            BinanceFuturesClient::sign("test-secret", unsigned).unwrap()
        );
    }

    #[test]
    fn test_offset_applied_to_signed_timestamp() {
        let mut client = client();
        client.set_time_offset(-30_000);
        assert_eq!(client.time_offset(), -30_000);

        let before = Utc::now().timestamp_millis();
        let query = client.signed_query(&[]).unwrap();
        let after = Utc::now().timestamp_millis();

        let ts: i64 = query_value(&query, "timestamp").unwrap().parse().unwrap();
        assert!(ts >= before - 30_000 && ts <= after - 30_000, "timestamp {} not offset", ts);
    }

    #[test]
    fn test_recv_window_can_be_omitted() {
        let client = BinanceFuturesClient::testnet(
            Credentials::new("k", "s"),
            ClientConfig {
                recv_window_ms: 0,
                ..ClientConfig::default()
            },
        )
        .unwrap();
        let query = client.signed_query_at(&[], 1).unwrap();
        assert!(query_value(&query, "recvWindow").is_none());
    }

    #[test]
    fn test_limit_order_params() {
        let order =
            OrderRequest::limit("BTCUSDT", Side::Buy, dec!(0.01), "50000.00".parse().unwrap())
                .unwrap();
        let params = order_params(&order);
        assert_eq!(
            params,
            vec![
                ("symbol", "BTCUSDT".to_string()),
                ("side", "BUY".to_string()),
                ("type", "LIMIT".to_string()),
                ("timeInForce", "GTC".to_string()),
                ("quantity", "0.01".to_string()),
                ("price", "50000.00".to_string()),
            ]
        );
    }

    #[test]
    fn test_market_order_has_no_price() {
        let order = OrderRequest::market("ETHUSDT", Side::Sell, dec!(2)).unwrap();
        let params = order_params(&order);
        assert!(params.iter().all(|(k, _)| *k != "price" && *k != "timeInForce"));
        assert!(params.contains(&("type", "MARKET".to_string())));
        assert!(params.contains(&("side", "SELL".to_string())));
    }

    #[test]
    fn test_stop_limit_order_params() {
        let order =
            OrderRequest::stop_limit("BTCUSDT", Side::Sell, dec!(0.5), dec!(48000), dec!(47900.5))
                .unwrap();
        let params = order_params(&order);
        assert!(params.contains(&("type", "STOP".to_string())));
        assert!(params.contains(&("stopPrice", "48000".to_string())));
        assert!(params.contains(&("price", "47900.5".to_string())));
        assert!(params.contains(&("workingType", "CONTRACT_PRICE".to_string())));
        assert!(params.contains(&("timeInForce", "GTC".to_string())));
    }

    #[test]
    fn test_exchange_error_body_is_kept_verbatim() {
        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            r#"{"code":-2019,"msg":"Margin is insufficient."}"#,
        );
        match err {
            TraderError::Exchange { code, message } => {
                assert_eq!(code, -2019);
                assert_eq!(message, "Margin is insufficient.");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_non_json_error_body() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, TraderError::Api(ref m) if m.contains("502")));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("test-secret"));
        assert!(rendered.contains(TESTNET_BASE_URL));
    }
}
