//! Wire types for the futures REST endpoints

use serde::Deserialize;

/// `GET /fapi/v1/time`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTimeResponse {
    pub server_time: i64,
}

/// Error body returned with non-2xx statuses, e.g.
/// `{"code":-2019,"msg":"Margin is insufficient."}`
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: i64,
    pub msg: String,
}
