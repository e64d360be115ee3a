//! In-memory implementation of OpaqueTokenRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::OpaqueToken;
use crate::errors::DomainError;

use super::r#trait::OpaqueTokenRepository;

/// In-memory token repository for testing
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<String, OpaqueToken>>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of tokens currently stored.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }
}

impl Default for InMemoryTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OpaqueTokenRepository for InMemoryTokenRepository {
    async fn find(&self, token: &str) -> Result<Option<OpaqueToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token).cloned())
    }

    async fn create(&self, token: &OpaqueToken) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(token.token()) {
            return Err(DomainError::Internal {
                message: "token already exists".to_string(),
            });
        }

        tokens.insert(token.token().to_string(), token.clone());
        Ok(())
    }

    async fn delete(&self, token: &OpaqueToken) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().await;
        tokens.remove(token.token());
        Ok(())
    }
}
