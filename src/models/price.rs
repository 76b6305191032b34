use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::token::deserialize_optional_decimals;

/// Unit price of one whole token and its day-over-day change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    #[serde(alias = "id")]
    pub pricing_id: i64,
    pub ccy_value: Decimal,
    pub ccy_day_change: Decimal,
    pub eth_value: Decimal,
    pub eth_day_change: Decimal,
}

/// Metadata entry from the token info payload. Only `address` and `pricingId`
/// matter for pricing; the rest is carried for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub address: String,
    #[serde(default)]
    pub pricing_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_decimals")]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPriceDataResponse {
    pub prices: Vec<PriceRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTokenDataResponse {
    pub tokens: Vec<TokenInfo>,
}
