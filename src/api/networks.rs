use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::{
    models::ApiResponse,
    networks::{default_network, local_network_url, Network, NETWORKS},
};

#[derive(Debug, Serialize)]
pub struct NetworkView {
    #[serde(flatten)]
    pub network: &'static Network,
    pub rpc_url: String,
    pub is_default: bool,
}

/// GET /api/v1/networks
pub async fn list_networks(State(state): State<AppState>) -> Json<ApiResponse<Vec<NetworkView>>> {
    let default_id = default_network().id;
    let networks = NETWORKS
        .iter()
        .map(|network| NetworkView {
            network,
            rpc_url: local_network_url(network.id, state.config.local_devnet_port),
            is_default: network.id == default_id,
        })
        .collect();
    Json(ApiResponse::success(networks))
}
