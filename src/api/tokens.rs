use axum::{extract::State, Json};
use serde::Deserialize;

use super::{AppJson, AppPath, AppQuery, AppState};
use crate::{
    error::{AppError, Result},
    models::{ApiResponse, PriceRecord, Token},
    networks::local_network_id,
    services::token_registry::TokenMutationResult,
    utils::address_key,
};

#[derive(Debug, Deserialize)]
pub struct TokenListQuery {
    pub network_id: Option<String>,
}

/// GET /api/v1/tokens
pub async fn list_tokens(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TokenListQuery>,
) -> Result<Json<ApiResponse<Vec<Token>>>> {
    let mut tokens = state.registry.get_tokens().await?;
    if let Some(network_id) = query.network_id.as_deref() {
        let wanted = local_network_id(network_id);
        tokens.retain(|token| local_network_id(&token.network_id) == wanted);
    }
    Ok(Json(ApiResponse::success(tokens)))
}

/// POST /api/v1/tokens
pub async fn add_token(
    State(state): State<AppState>,
    AppJson(token): AppJson<Token>,
) -> Result<Json<ApiResponse<TokenMutationResult>>> {
    let mutation = state.registry.add_token(token).await?;
    Ok(Json(ApiResponse::success(mutation.into())))
}

/// DELETE /api/v1/tokens/{address}
pub async fn remove_token(
    State(state): State<AppState>,
    AppPath(address): AppPath<String>,
) -> Result<Json<ApiResponse<TokenMutationResult>>> {
    let mutation = state.registry.remove_token(&address).await?;
    Ok(Json(ApiResponse::success(mutation.into())))
}

/// GET /api/v1/tokens/{address}/price
///
/// `data` is null while prices are unavailable for a known token.
pub async fn get_token_price(
    State(state): State<AppState>,
    AppPath(address): AppPath<String>,
) -> Result<Json<ApiResponse<Option<PriceRecord>>>> {
    let tokens = state.registry.get_tokens().await?;
    let key = address_key(&address);
    let token = tokens
        .into_iter()
        .find(|token| address_key(&token.address) == key)
        .ok_or_else(|| AppError::NotFound(format!("Unknown token {}", address)))?;

    let price = state
        .price_feed
        .snapshot()
        .await
        .and_then(|snapshot| snapshot.lookup(&token));
    Ok(Json(ApiResponse::success(price)))
}
