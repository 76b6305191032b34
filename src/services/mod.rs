// All service modules
pub mod formatting;
pub mod price_feed;
pub mod token_price;
pub mod token_registry;

// Re-export for convenience
pub use formatting::{
    format_token_amount, prettify_currency_decimal, prettify_currency_value,
    prettify_token_amount, CurrencyInput, TokenAmountParams,
};
pub use price_feed::{PriceFeedService, PriceFeedStatus};
pub use token_price::{
    convert_token_amount_to_currency_value, lookup_token_price_details,
    sum_token_balances_to_currency_value, CurrencyValue, PriceRecordLookup, PricingIdLookup,
    PricingSnapshot,
};
pub use token_registry::{JsonFileTokenStore, MemoryTokenStore, TokenMutation, TokenRegistry, TokenStore};

use crate::config::Config;
use std::sync::Arc;

/// Picks the custom token store from config.
pub fn build_token_registry(config: &Config) -> TokenRegistry {
    match &config.custom_tokens_path {
        Some(path) => {
            tracing::info!("Custom tokens stored at {}", path.display());
            TokenRegistry::new(Box::new(JsonFileTokenStore::new(path.clone())))
        }
        None => {
            tracing::warn!("CUSTOM_TOKENS_PATH not set; custom tokens are kept in memory");
            TokenRegistry::in_memory()
        }
    }
}

/// Start all background services
pub async fn start_background_services(price_feed: Arc<PriceFeedService>) {
    tracing::info!("Starting background services...");
    price_feed.start().await;
}
