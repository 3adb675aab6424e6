//! In-memory holder for the current token pair
//!
//! Cookies carry the session for same-origin calls; the store additionally
//! keeps the latest access token so calls to the public API can present it
//! as a bearer credential.

use std::sync::Arc;

use bookstore_domain::TokenPair;
use tokio::sync::RwLock;
use tracing::debug;

/// Shared, cloneable token store
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    tokens: Arc<RwLock<Option<TokenPair>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with tokens obtained elsewhere (e.g. read from a cookie).
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self { tokens: Arc::new(RwLock::new(Some(tokens))) }
    }

    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.as_ref().map(|t| t.access_token.clone())
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.as_ref().and_then(|t| t.refresh_token.clone())
    }

    pub async fn tokens(&self) -> Option<TokenPair> {
        self.tokens.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    /// Store a newly issued pair.
    ///
    /// A refresh response that omits the refresh token keeps the previous
    /// one.
    pub async fn store(&self, mut tokens: TokenPair) {
        let mut current = self.tokens.write().await;
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = current.as_ref().and_then(|t| t.refresh_token.clone());
        }
        *current = Some(tokens);
        debug!("session tokens updated");
    }

    pub async fn clear(&self) {
        *self.tokens.write().await = None;
        debug!("session tokens cleared");
    }
}
