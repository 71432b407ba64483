use std::sync::Arc;

use shared::domain::Token;
use storage::TokenStorage;
use tracing::warn;
use url::Url;

/// Holds the single bearer token for one API origin.
///
/// Storage failures never reach the caller: reads degrade to "no token",
/// writes and removals are logged and dropped.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
    key: String,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn TokenStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn for_base_url(
        storage: Arc<dyn TokenStorage>,
        base_url: &str,
    ) -> Result<Self, url::ParseError> {
        Ok(Self::new(storage, origin_key(base_url)?))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn get(&self) -> Option<Token> {
        match self.storage.load(&self.key).await {
            Ok(token) => token.map(Token::new),
            Err(err) => {
                warn!(origin = %self.key, error = %err, "session token read failed");
                None
            }
        }
    }

    pub async fn set(&self, token: &Token) {
        if let Err(err) = self.storage.store(&self.key, token.as_str()).await {
            warn!(origin = %self.key, error = %err, "session token write failed");
        }
    }

    pub async fn clear(&self) {
        if let Err(err) = self.storage.remove(&self.key).await {
            warn!(origin = %self.key, error = %err, "session token removal failed");
        }
    }
}

/// Storage key for an API base URL: its scheme, host and port.
pub fn origin_key(base_url: &str) -> Result<String, url::ParseError> {
    let url = Url::parse(base_url)?;
    let origin = url.origin();
    if origin.is_tuple() {
        Ok(origin.ascii_serialization())
    } else {
        Ok(url.as_str().trim_end_matches('/').to_string())
    }
}

#[cfg(test)]
#[path = "tests/session_store_tests.rs"]
mod tests;
