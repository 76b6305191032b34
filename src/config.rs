use serde::Deserialize;
use std::{env, path::PathBuf};

use crate::constants::{
    DEFAULT_CURRENCY_SYMBOL, DEFAULT_LOCAL_DEVNET_PORT, DEFAULT_PRICE_API_BASE_URL,
    PRICES_REFRESH_INTERVAL_SECS, TOKEN_INFO_REFRESH_INTERVAL_SECS,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Price feed
    pub price_api_enabled: bool,
    pub price_api_base_url: String,
    pub prices_refresh_secs: u64,
    pub token_info_refresh_secs: u64,

    // Display
    pub currency_symbol: String,

    // Token registry
    pub custom_tokens_path: Option<PathBuf>,

    // Networks
    pub local_devnet_port: u16,

    // CORS
    pub cors_allowed_origins: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            price_api_enabled: true,
            price_api_base_url: DEFAULT_PRICE_API_BASE_URL.to_string(),
            prices_refresh_secs: PRICES_REFRESH_INTERVAL_SECS,
            token_info_refresh_secs: TOKEN_INFO_REFRESH_INTERVAL_SECS,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            custom_tokens_path: None,
            local_devnet_port: DEFAULT_LOCAL_DEVNET_PORT,
            cors_allowed_origins: "*".to_string(),
        }
    }
}

// Internal helper that parses boolean-ish env flags.
fn parse_flag(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let defaults = Config::default();

        Ok(Config {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),

            price_api_enabled: env::var("PRICE_API_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.price_api_enabled),
            price_api_base_url: env::var("PRICE_API_BASE_URL")
                .unwrap_or(defaults.price_api_base_url),
            prices_refresh_secs: env::var("PRICES_REFRESH_SECS")
                .unwrap_or_else(|_| defaults.prices_refresh_secs.to_string())
                .parse()?,
            token_info_refresh_secs: env::var("TOKEN_INFO_REFRESH_SECS")
                .unwrap_or_else(|_| defaults.token_info_refresh_secs.to_string())
                .parse()?,

            currency_symbol: env::var("CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),

            custom_tokens_path: env::var("CUSTOM_TOKENS_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),

            local_devnet_port: env::var("LOCAL_DEVNET_PORT")
                .unwrap_or_else(|_| defaults.local_devnet_port.to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or(defaults.cors_allowed_origins),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.price_api_enabled {
            let base = url::Url::parse(&self.price_api_base_url)?;
            if base.scheme() != "https" && base.scheme() != "http" {
                anyhow::bail!("PRICE_API_BASE_URL must be http(s)");
            }
        } else {
            tracing::warn!("Price API disabled; currency values will be unavailable");
        }

        if self.prices_refresh_secs == 0 || self.token_info_refresh_secs == 0 {
            anyhow::bail!("Refresh intervals must be > 0");
        }

        if self.currency_symbol.trim().is_empty() {
            tracing::warn!("CURRENCY_SYMBOL is empty; values will render without a symbol");
        }

        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    /// Joins a path onto the price API base URL.
    pub fn price_api_url(&self, path: &str) -> anyhow::Result<url::Url> {
        let mut base = self.price_api_base_url.trim_end_matches('/').to_string();
        base.push('/');
        Ok(url::Url::parse(&base)?.join(path.trim_start_matches('/'))?)
    }
}
