use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AppJson, AppState};
use crate::{
    models::{ApiResponse, TokenWithBalance},
    services::{
        convert_token_amount_to_currency_value, format_token_amount, prettify_currency_value,
        sum_token_balances_to_currency_value, CurrencyValue, PricingSnapshot,
    },
};

#[derive(Debug, Deserialize)]
pub struct PortfolioValueRequest {
    pub tokens: Vec<TokenWithBalance>,
}

#[derive(Debug, Serialize)]
pub struct TokenValue {
    pub address: String,
    pub symbol: String,
    pub balance: Option<String>,
    pub unit_price: Option<Decimal>,
    pub day_change: Option<Decimal>,
    pub value: Option<CurrencyValue>,
    pub value_display: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PortfolioValueResponse {
    pub prices_available: bool,
    pub total_value: Option<CurrencyValue>,
    pub total_value_display: Option<String>,
    pub tokens: Vec<TokenValue>,
}

// A price the converter rejects leaves the token without a value.
fn token_value(
    item: &TokenWithBalance,
    snapshot: Option<&PricingSnapshot>,
    symbol: &str,
) -> TokenValue {
    let token = &item.token;
    let price = snapshot.and_then(|s| s.lookup(token));
    let value = match (item.balance.as_ref(), price.as_ref()) {
        (Some(balance), Some(price)) => {
            convert_token_amount_to_currency_value(balance, token.decimals, price.ccy_value)
                .map_err(|e| tracing::warn!("No value for {}: {}", token.address, e))
                .ok()
        }
        _ => None,
    };

    TokenValue {
        address: token.address.clone(),
        symbol: token.symbol.clone(),
        balance: item
            .balance
            .as_ref()
            .map(|balance| format_token_amount(balance, token.decimals, Some(&token.symbol))),
        unit_price: price.as_ref().map(|p| p.ccy_value),
        day_change: price.as_ref().map(|p| p.ccy_day_change),
        value_display: prettify_currency_value(&value, symbol),
        value,
    }
}

/// POST /api/v1/portfolio/value
pub async fn get_portfolio_value(
    State(state): State<AppState>,
    AppJson(request): AppJson<PortfolioValueRequest>,
) -> Json<ApiResponse<PortfolioValueResponse>> {
    let snapshot = state.price_feed.snapshot().await;
    let symbol = state.config.currency_symbol.as_str();

    let tokens = request
        .tokens
        .iter()
        .map(|item| token_value(item, snapshot.as_ref(), symbol))
        .collect();

    let total_value = snapshot.as_ref().map(|s| {
        sum_token_balances_to_currency_value(&request.tokens, s.tokens.as_ref(), s.prices.as_ref())
    });

    Json(ApiResponse::success(PortfolioValueResponse {
        prices_available: snapshot.is_some(),
        total_value_display: prettify_currency_value(&total_value, symbol),
        total_value,
        tokens,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{empty_state, loaded_state};
    use crate::services::token_price::tests::{mock_prices, token, DAI, ETH, UNPRICED};

    fn request() -> PortfolioValueRequest {
        PortfolioValueRequest {
            tokens: vec![
                TokenWithBalance::new(token(ETH, "ETH", 18), 1_500_000_000_000_000_000u64),
                TokenWithBalance::new(token(DAI, "DAI", 18), 2_000_000_000_000_000_000u64),
                TokenWithBalance::new(token(UNPRICED, "XYZ", 18), 12_345_678_901_234_569u64),
            ],
        }
    }

    #[tokio::test]
    async fn portfolio_value_sums_priced_tokens() {
        let Json(response) = get_portfolio_value(State(loaded_state().await), AppJson(request())).await;
        let data = response.data;
        assert!(data.prices_available);
        // 1.5 * 1032.296954 + 2 * 1.001132
        assert_eq!(data.total_value.as_ref().map(|v| v.to_fixed()).as_deref(), Some("1550.447695"));
        assert_eq!(data.total_value_display.as_deref(), Some("$1,550.45"));

        let eth = &data.tokens[0];
        assert_eq!(eth.balance.as_deref(), Some("1.5 ETH"));
        assert_eq!(eth.value_display.as_deref(), Some("$1,548.45"));

        let unpriced = &data.tokens[2];
        assert_eq!(unpriced.balance.as_deref(), Some("0.0123 XYZ"));
        assert!(unpriced.value.is_none());
        assert!(unpriced.value_display.is_none());
    }

    #[tokio::test]
    async fn negative_feed_price_leaves_token_unvalued() {
        let state = loaded_state().await;
        let mut prices = mock_prices();
        prices.prices[1].ccy_value = "-0.01".parse().unwrap();
        state.price_feed.apply_prices(&prices).await;

        let Json(response) = get_portfolio_value(State(state), AppJson(request())).await;
        let data = response.data;
        assert!(response.success);
        // ETH only: 1.5 * 1032.296954
        assert_eq!(data.total_value.as_ref().map(|v| v.to_fixed()).as_deref(), Some("1548.445431"));
        assert_eq!(data.total_value_display.as_deref(), Some("$1,548.45"));

        let dai = &data.tokens[1];
        assert_eq!(dai.unit_price.map(|p| p.to_string()).as_deref(), Some("-0.01"));
        assert!(dai.value.is_none());
        assert!(dai.value_display.is_none());
        assert_eq!(dai.balance.as_deref(), Some("2.0 DAI"));
    }

    #[tokio::test]
    async fn portfolio_value_without_prices_is_unavailable() {
        let Json(response) = get_portfolio_value(State(empty_state()), AppJson(request())).await;
        let data = response.data;
        assert!(!data.prices_available);
        assert!(data.total_value.is_none());
        assert!(data.total_value_display.is_none());
        assert_eq!(data.tokens[1].balance.as_deref(), Some("2.0 DAI"));
    }
}
