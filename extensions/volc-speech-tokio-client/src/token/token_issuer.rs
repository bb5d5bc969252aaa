use crate::{
    config::OpenApiConfig,
    constants::{TOKEN_ACTION, TOKEN_API_VERSION, TOKEN_SERVICE, TOKEN_VERSION},
    error::{ApiError, TokenError},
    open_api::OpenApiClient,
};
use serde::{Deserialize, Serialize};
use volc_speech::constants::STATUS_CODE_OK;

/// A freshly issued token and its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Unix seconds.
    pub expires_at: i64,
}

/// Obtains new tokens from the control plane.
#[async_trait::async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue(&self, app_key: &str, expiration_secs: i64) -> Result<IssuedToken, TokenError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRequest {
    pub appkey: String,
    pub token_version: String,
    pub expiration: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub status_code: i32,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub expires_at: i64,
}

/// Issues tokens with the signed `GetToken` action.
#[derive(Debug, Clone)]
pub struct OpenApiTokenIssuer {
    client: OpenApiClient,
}

impl OpenApiTokenIssuer {
    pub fn new(config: &OpenApiConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: OpenApiClient::new(config, TOKEN_SERVICE)?,
        })
    }
}

#[async_trait::async_trait]
impl TokenIssuer for OpenApiTokenIssuer {
    async fn issue(&self, app_key: &str, expiration_secs: i64) -> Result<IssuedToken, TokenError> {
        let request = TokenRequest {
            appkey: app_key.to_string(),
            token_version: TOKEN_VERSION.to_string(),
            expiration: expiration_secs,
        };
        let body =
            serde_json::to_vec(&request).map_err(|err| TokenError::Decode(err.to_string()))?;

        let (status, bytes) = self
            .client
            .send_action(TOKEN_ACTION, TOKEN_API_VERSION, &body)
            .await
            .map_err(|err| match err {
                ApiError::Signing(err) => TokenError::Signing(err),
                other => TokenError::Http(other.to_string()),
            })?;

        // The body carries `status_code` even on HTTP errors.
        let response: TokenResponse = serde_json::from_slice(&bytes).map_err(|err| {
            if (200..300).contains(&status) {
                TokenError::Decode(err.to_string())
            } else {
                TokenError::Http(format!("HTTP status {status}"))
            }
        })?;

        if response.status_code != STATUS_CODE_OK {
            return Err(TokenError::Rejected {
                status_code: response.status_code,
                status_text: response.status_text,
            });
        }

        tracing::debug!(
            task_id = %response.task_id,
            expires_at = response.expires_at,
            "token issued"
        );

        Ok(IssuedToken {
            token: response.token,
            expires_at: response.expires_at,
        })
    }
}
