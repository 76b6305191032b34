use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::services::PriceFeedStatus;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub price_feed: PriceFeedStatus,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let price_feed = state.price_feed.status().await;
    let status = if !price_feed.enabled || price_feed.prices_updated_at.is_some() {
        "ok"
    } else {
        "warming_up"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        price_feed,
    })
}
