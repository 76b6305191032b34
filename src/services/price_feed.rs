use crate::{
    config::Config,
    constants::{PRICE_API_PRICES_PATH, PRICE_API_TIMEOUT_SECS, PRICE_API_TOKENS_PATH},
    error::{AppError, Result},
    models::{ApiPriceDataResponse, ApiTokenDataResponse},
    services::token_price::{PriceIndex, PricingSnapshot, TokenPricingIndex},
};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

struct Versioned<T> {
    data: Arc<T>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceFeedStatus {
    pub enabled: bool,
    pub prices_updated_at: Option<DateTime<Utc>>,
    pub tokens_updated_at: Option<DateTime<Utc>>,
    pub priced_ids: usize,
    pub priced_tokens: usize,
}

/// Price Feed - keeps the latest price and token metadata payloads in memory.
///
/// Prices and token metadata refresh on independent schedules. Readers get an
/// immutable [`PricingSnapshot`] and never block the refresh loops for longer
/// than an `Arc` clone.
pub struct PriceFeedService {
    config: Config,
    client: reqwest::Client,
    prices: RwLock<Option<Versioned<PriceIndex>>>,
    tokens: RwLock<Option<Versioned<TokenPricingIndex>>>,
}

impl PriceFeedService {
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PRICE_API_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            config,
            client,
            prices: RwLock::new(None),
            tokens: RwLock::new(None),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.price_api_enabled
    }

    /// Start background refresh loops
    pub async fn start(self: Arc<Self>) {
        if !self.is_enabled() {
            tracing::warn!("Price API disabled; price feed refresher not started");
            return;
        }

        let prices_service = self.clone();
        tokio::spawn(async move {
            let interval = Duration::from_secs(prices_service.config.prices_refresh_secs);
            loop {
                if let Err(e) = prices_service.refresh_prices().await {
                    tracing::warn!("Failed to refresh token prices: {}", e);
                }
                tokio::time::sleep(interval).await;
            }
        });

        let tokens_service = self;
        tokio::spawn(async move {
            let interval = Duration::from_secs(tokens_service.config.token_info_refresh_secs);
            loop {
                if let Err(e) = tokens_service.refresh_token_data().await {
                    tracing::warn!("Failed to refresh token metadata: {}", e);
                }
                tokio::time::sleep(interval).await;
            }
        });
    }

    pub async fn refresh_prices(&self) -> Result<()> {
        let response: ApiPriceDataResponse = self.fetch_json(PRICE_API_PRICES_PATH).await?;
        self.apply_prices(&response).await;
        Ok(())
    }

    pub async fn refresh_token_data(&self) -> Result<()> {
        let response: ApiTokenDataResponse = self.fetch_json(PRICE_API_TOKENS_PATH).await?;
        self.apply_token_data(&response).await;
        Ok(())
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self
            .config
            .price_api_url(path)
            .map_err(|e| AppError::Internal(format!("Invalid price API URL: {}", e)))?;

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(AppError::ExternalAPI(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        Ok(response.json::<T>().await?)
    }

    /// Swaps in a new price payload.
    pub async fn apply_prices(&self, response: &ApiPriceDataResponse) {
        let index = PriceIndex::from(response);
        tracing::debug!("Loaded {} token prices", index.record_count());
        *self.prices.write().await = Some(Versioned {
            data: Arc::new(index),
            updated_at: Utc::now(),
        });
    }

    /// Swaps in a new token metadata payload.
    pub async fn apply_token_data(&self, response: &ApiTokenDataResponse) {
        let index = TokenPricingIndex::from(response);
        tracing::debug!(
            "Loaded pricing ids for {} of {} tokens",
            index.priced_count(),
            response.tokens.len()
        );
        *self.tokens.write().await = Some(Versioned {
            data: Arc::new(index),
            updated_at: Utc::now(),
        });
    }

    /// Current snapshot, or `None` until both payloads have been loaded.
    pub async fn snapshot(&self) -> Option<PricingSnapshot> {
        if !self.is_enabled() {
            return None;
        }
        let tokens = self.tokens.read().await.as_ref()?.data.clone();
        let prices = self.prices.read().await.as_ref()?.data.clone();
        Some(PricingSnapshot::new(tokens, prices))
    }

    pub async fn status(&self) -> PriceFeedStatus {
        let prices = self.prices.read().await;
        let tokens = self.tokens.read().await;
        PriceFeedStatus {
            enabled: self.is_enabled(),
            prices_updated_at: prices.as_ref().map(|p| p.updated_at),
            tokens_updated_at: tokens.as_ref().map(|t| t.updated_at),
            priced_ids: prices.as_ref().map(|p| p.data.record_count()).unwrap_or(0),
            priced_tokens: tokens.as_ref().map(|t| t.data.priced_count()).unwrap_or(0),
        }
    }
}
