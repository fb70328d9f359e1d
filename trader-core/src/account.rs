//! Account state returned by the exchange

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One asset row of the futures wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBalance {
    /// Asset code, e.g. `USDT`
    pub asset: String,

    /// Wallet balance
    pub balance: Decimal,

    /// Balance free for new orders
    #[serde(default)]
    pub available_balance: Decimal,
}

/// Subset of the account endpoint used to confirm an authenticated session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    #[serde(default)]
    pub can_trade: bool,

    #[serde(default)]
    pub total_wallet_balance: Decimal,

    #[serde(default)]
    pub available_balance: Decimal,
}

impl AssetBalance {
    /// Case-insensitive lookup of an asset in a balance list
    pub fn find<'a>(balances: &'a [AssetBalance], asset: &str) -> Option<&'a AssetBalance> {
        balances
            .iter()
            .find(|b| b.asset.eq_ignore_ascii_case(asset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_rows_decode_from_exchange_strings() {
        let body = r#"[
            {"accountAlias":"SgsR","asset":"BNB","balance":"0.00000000","availableBalance":"0.00000000"},
            {"accountAlias":"SgsR","asset":"USDT","balance":"15000.12500000","availableBalance":"14990.00000000"}
        ]"#;
        let rows: Vec<AssetBalance> = serde_json::from_str(body).unwrap();
        let usdt = AssetBalance::find(&rows, "usdt").unwrap();
        assert_eq!(usdt.balance, dec!(15000.125));
        assert_eq!(usdt.available_balance, dec!(14990));
    }

    #[test]
    fn test_missing_asset_is_none() {
        let rows = vec![AssetBalance {
            asset: "BNB".to_string(),
            balance: dec!(1),
            available_balance: dec!(1),
        }];
        assert!(AssetBalance::find(&rows, "USDT").is_none());
    }
}
