//! Mock implementations for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bookstore_oauth::{AccessToken, AccessTokenResolver, RestError};
use tokio::sync::RwLock;

/// Mock access token resolver.
///
/// Known token ids resolve to their registered identity, unknown ids yield a
/// 404 [`RestError`] unless a failure is forced. Every lookup is recorded.
#[derive(Debug, Default, Clone)]
pub struct MockAccessTokenResolver {
    tokens: Arc<RwLock<HashMap<String, AccessToken>>>,
    failure: Arc<RwLock<Option<RestError>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockAccessTokenResolver {
    /// Create an empty mock resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token.
    pub async fn insert(&self, token: AccessToken) {
        self.tokens.write().await.insert(token.id.clone(), token);
    }

    /// Make every lookup fail with `error`.
    pub async fn fail_with(&self, error: RestError) {
        *self.failure.write().await = Some(error);
    }

    /// Stop forcing failures.
    pub async fn clear_failure(&self) {
        *self.failure.write().await = None;
    }

    /// Token ids looked up so far, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    /// Number of lookups.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl AccessTokenResolver for MockAccessTokenResolver {
    async fn get_access_token(&self, access_token_id: &str) -> Result<AccessToken, RestError> {
        self.calls.write().await.push(access_token_id.to_string());

        if let Some(error) = self.failure.read().await.clone() {
            return Err(error);
        }

        self.tokens
            .read()
            .await
            .get(access_token_id)
            .cloned()
            .ok_or_else(|| RestError::not_found("access token not found"))
    }
}
