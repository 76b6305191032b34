use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::{Mutex, RwLock};

use crate::{
    constants::{NETWORK_GOERLI, NETWORK_MAINNET, TOKEN_ETH},
    error::{AppError, Result},
    models::Token,
    utils::{address_key, validate_and_parse_address},
};

/// Backing store for user-added tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get_tokens(&self) -> Result<Vec<Token>>;
    async fn set_tokens(&self, tokens: Vec<Token>) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Vec<Token>>,
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get_tokens(&self) -> Result<Vec<Token>> {
        Ok(self.tokens.read().await.clone())
    }

    async fn set_tokens(&self, tokens: Vec<Token>) -> Result<()> {
        *self.tokens.write().await = tokens;
        Ok(())
    }
}

/// Stores custom tokens as a JSON array on disk. A missing file reads as empty.
pub struct JsonFileTokenStore {
    path: PathBuf,
}

impl JsonFileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenStore for JsonFileTokenStore {
    async fn get_tokens(&self) -> Result<Vec<Token>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_tokens(&self, tokens: Vec<Token>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(&tokens)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

/// Outcome of adding or removing a token. `Unchanged` is a normal result
/// (duplicate add, unknown remove), not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenMutation {
    Applied(Vec<Token>),
    Unchanged,
}

#[derive(Debug, Serialize)]
pub struct TokenMutationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<Token>>,
}

impl From<TokenMutation> for TokenMutationResult {
    fn from(mutation: TokenMutation) -> Self {
        match mutation {
            TokenMutation::Applied(tokens) => Self {
                success: true,
                tokens: Some(tokens),
            },
            TokenMutation::Unchanged => Self {
                success: false,
                tokens: None,
            },
        }
    }
}

/// Tokens known to every installation.
pub fn default_tokens() -> Vec<Token> {
    [NETWORK_MAINNET, NETWORK_GOERLI]
        .into_iter()
        .map(|network_id| Token {
            address: TOKEN_ETH.to_string(),
            network_id: network_id.to_string(),
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
            image: None,
            show_always: true,
        })
        .collect()
}

/// Checks required fields and the address format.
pub fn validate_token(token: &Token) -> Result<()> {
    let required = [
        ("address", &token.address),
        ("networkId", &token.network_id),
        ("name", &token.name),
        ("symbol", &token.symbol),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(AppError::InvalidToken(format!("token is missing required field {}", field)));
    }
    validate_and_parse_address(&token.address)?;
    Ok(())
}

/// Token Registry - default tokens plus user-added tokens.
pub struct TokenRegistry {
    store: Box<dyn TokenStore>,
    // serializes read-modify-write cycles on the store
    write_lock: Mutex<()>,
}

impl TokenRegistry {
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryTokenStore::default()))
    }

    pub async fn get_tokens(&self) -> Result<Vec<Token>> {
        let mut tokens = default_tokens();
        tokens.extend(self.store.get_tokens().await?);
        Ok(tokens)
    }

    pub async fn has_token(&self, address: &str) -> Result<bool> {
        let key = address_key(address);
        Ok(self
            .get_tokens()
            .await?
            .iter()
            .any(|token| address_key(&token.address) == key))
    }

    /// Adds a custom token. Returns every known token on success.
    pub async fn add_token(&self, token: Token) -> Result<TokenMutation> {
        validate_token(&token)?;
        let _guard = self.write_lock.lock().await;

        let mut all_tokens = self.get_tokens().await?;
        let key = address_key(&token.address);
        if all_tokens.iter().any(|t| address_key(&t.address) == key) {
            tracing::debug!("Token {} already registered", token.address);
            return Ok(TokenMutation::Unchanged);
        }

        let mut custom_tokens = self.store.get_tokens().await?;
        custom_tokens.push(token.clone());
        self.store.set_tokens(custom_tokens).await?;
        tracing::info!("Added custom token {} ({})", token.symbol, token.address);

        all_tokens.push(token);
        Ok(TokenMutation::Applied(all_tokens))
    }

    /// Removes a custom token. Returns the remaining custom tokens on success.
    pub async fn remove_token(&self, address: &str) -> Result<TokenMutation> {
        let _guard = self.write_lock.lock().await;

        let key = address_key(address);
        let mut custom_tokens = self.store.get_tokens().await?;
        let Some(index) = custom_tokens
            .iter()
            .position(|t| address_key(&t.address) == key)
        else {
            return Ok(TokenMutation::Unchanged);
        };

        let removed = custom_tokens.remove(index);
        self.store.set_tokens(custom_tokens.clone()).await?;
        tracing::info!("Removed custom token {} ({})", removed.symbol, removed.address);

        Ok(TokenMutation::Applied(custom_tokens))
    }
}
