use serde::Serialize;

use crate::constants::{LOCALHOST_URL_PREFIX, NETWORK_GOERLI, NETWORK_LOCALHOST, NETWORK_MAINNET};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_implementation: Option<&'static str>,
}

pub static NETWORKS: [Network; 3] = [
    Network {
        id: NETWORK_MAINNET,
        name: "Ethereum Mainnet",
        explorer_url: Some("https://voyager.online"),
        account_implementation: None,
    },
    Network {
        id: NETWORK_GOERLI,
        name: "Goerli Testnet",
        explorer_url: Some("https://goerli.voyager.online"),
        account_implementation: Some(
            "0x0243638d94e74836f3e73a10e6c90aedf48ae8daa0c586dca6698618471cf639",
        ),
    },
    Network {
        id: NETWORK_LOCALHOST,
        name: "Localhost",
        explorer_url: None,
        account_implementation: None,
    },
];

pub fn default_network() -> &'static Network {
    &NETWORKS[1]
}

/// Collapses any `http://localhost...` URL into the `localhost` network id.
pub fn local_network_id(network_id: &str) -> &str {
    if network_id.starts_with(LOCALHOST_URL_PREFIX) {
        NETWORK_LOCALHOST
    } else {
        network_id
    }
}

/// Resolves the RPC base URL for local networks; other ids pass through.
pub fn local_network_url(network_id: &str, port: u16) -> String {
    if network_id.starts_with(LOCALHOST_URL_PREFIX) {
        return network_id.to_string();
    }
    if network_id == NETWORK_LOCALHOST {
        format!("{}:{}", LOCALHOST_URL_PREFIX, port)
    } else {
        network_id.to_string()
    }
}

/// Unknown ids fall back to the default network.
pub fn get_network(network_id: &str) -> &'static Network {
    let id = local_network_id(network_id);
    NETWORKS
        .iter()
        .find(|network| network.id == id)
        .unwrap_or_else(|| {
            tracing::debug!("Unknown network {}; using default", network_id);
            default_network()
        })
}
