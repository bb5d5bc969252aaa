use crate::{
    constants::TOKEN_EXPIRY_MARGIN_SECS,
    error::TokenError,
    token::{Clock, IssuedToken, SystemClock, TokenIssuer},
};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// An opaque bearer token and its absolute expiry in unix seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub expires_at: i64,
}

/// A cached token that is refreshed on demand.
///
/// Reads never touch the network. Refreshes are not serialized against each
/// other: two callers racing on an expired token may both hit the issuer,
/// and the last successful response wins. Replacement of value and expiry is
/// atomic.
pub struct TokenCache {
    token: RwLock<Option<Token>>,
    issuer: Arc<dyn TokenIssuer>,
    clock: Arc<dyn Clock>,
}

impl TokenCache {
    pub fn new(issuer: Arc<dyn TokenIssuer>) -> Self {
        Self::with_clock(issuer, Arc::new(SystemClock))
    }

    pub fn with_clock(issuer: Arc<dyn TokenIssuer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            token: RwLock::new(None),
            issuer,
            clock,
        }
    }

    /// `true` without a token, or within a minute of its expiry.
    pub fn expired(&self) -> bool {
        match self.read().as_ref() {
            Some(token) => self.clock.now_unix() > token.expires_at - TOKEN_EXPIRY_MARGIN_SECS,
            None => true,
        }
    }

    /// Current token value, expired or not.
    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|token| token.value.clone())
    }

    pub fn snapshot(&self) -> Option<Token> {
        self.read().clone()
    }

    /// Seeds the cache, replacing any current token.
    pub fn set_token(&self, value: impl Into<String>, expires_at: i64) {
        *self.write() = Some(Token {
            value: value.into(),
            expires_at,
        });
    }

    /// Requests a new token. On failure the previous token is kept.
    pub async fn refresh(&self, app_key: &str, expiration_secs: i64) -> Result<String, TokenError> {
        let IssuedToken { token, expires_at } = self
            .issuer
            .issue(app_key, expiration_secs)
            .await
            .inspect_err(|err| tracing::warn!(%err, "token refresh failed"))?;

        self.set_token(token.clone(), expires_at);
        tracing::info!(expires_at, "token refreshed");

        Ok(token)
    }

    /// Returns the cached token, refreshing first if it has expired.
    pub async fn ensure_fresh(&self, app_key: &str, expiration_secs: i64) -> Result<String, TokenError> {
        if !self.expired() {
            if let Some(token) = self.token() {
                return Ok(token);
            }
        }

        self.refresh(app_key, expiration_secs).await
    }

    // A poisoned lock still holds a whole token: replacement is a single move.
    fn read(&self) -> RwLockReadGuard<'_, Option<Token>> {
        self.token.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Token>> {
        self.token.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
