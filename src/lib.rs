//! Token price conversion and display formatting for a Starknet wallet.
//!
//! The pricing core in [`services::token_price`] and [`services::formatting`]
//! is pure and synchronous. The rest of the crate keeps a periodically
//! refreshed price feed and a custom token registry around it and exposes
//! both over HTTP.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod networks;
pub mod services;
pub mod utils;

pub use error::{AppError, Result};
pub use models::{PriceRecord, Token, TokenAmount, TokenWithBalance};
pub use services::{
    convert_token_amount_to_currency_value, lookup_token_price_details, prettify_currency_value,
    prettify_token_amount, sum_token_balances_to_currency_value, CurrencyValue, PricingSnapshot,
};
