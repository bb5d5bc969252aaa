use crate::{config::OpenApiConfig, constants::DEFAULT_HTTP_TIMEOUT, error::ApiError};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use volc_speech::auth::{CredentialSigner, SignableRequest, encode_component};

/// `Error` member of an OpenAPI `ResponseMetadata`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetadataError {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
}

/// Envelope metadata attached to every OpenAPI response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResponseMetadata {
    #[serde(rename = "RequestId", default)]
    pub request_id: String,
    #[serde(rename = "Action", default)]
    pub action: String,
    #[serde(rename = "Version", default)]
    pub version: String,
    #[serde(rename = "Service", default)]
    pub service: String,
    #[serde(rename = "Region", default)]
    pub region: String,
    #[serde(rename = "Error", default)]
    pub error: Option<MetadataError>,
}

impl ResponseMetadata {
    /// Surfaces a metadata error as [`ApiError::Remote`].
    pub fn check(&self) -> Result<(), ApiError> {
        match &self.error {
            Some(error) => Err(ApiError::Remote {
                code: error.code.clone(),
                message: error.message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Deserialize)]
struct MetadataOnly {
    #[serde(rename = "ResponseMetadata", default)]
    metadata: ResponseMetadata,
}

/// Signed JSON client for the OpenAPI gateway, bound to one service.
#[derive(Debug, Clone)]
pub struct OpenApiClient {
    http: reqwest::Client,
    base_url: String,
    host: String,
    signer: CredentialSigner,
}

impl OpenApiClient {
    pub fn new(config: &OpenApiConfig, service: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()?;

        let base_url = crate::config::base_url(&config.host, "https");
        let host = base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&base_url)
            .to_string();

        Ok(Self {
            http,
            base_url,
            host,
            signer: CredentialSigner::new(config.credential(service)),
        })
    }

    pub fn signer(&self) -> &CredentialSigner {
        &self.signer
    }

    /// Sends a signed action and returns the raw HTTP status and body.
    pub async fn send_action(
        &self,
        action: &str,
        version: &str,
        body: &[u8],
    ) -> Result<(u16, Vec<u8>), ApiError> {
        let request = SignableRequest::new("POST", "/")
            .with_query("Action", action)
            .with_query("Version", version)
            .with_header("Host", &self.host)
            .with_header("Content-Type", "application/json")
            .with_body(body);

        let signed = self.signer.sign(&request, chrono::Utc::now())?;

        let url = format!(
            "{}/?Action={}&Version={}",
            self.base_url,
            encode_component(action),
            encode_component(version)
        );

        let mut builder = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body.to_vec());
        for (name, value) in signed.pairs() {
            builder = builder.header(name, value);
        }

        tracing::debug!(action, version, "posting control-plane action");

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?.to_vec();

        Ok((status, bytes))
    }

    /// Posts `body` as JSON and decodes the response into `R`.
    ///
    /// Non-2xx responses surface their `ResponseMetadata.Error` when present.
    pub async fn post_action<B, R>(&self, action: &str, version: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(|err| ApiError::Encode(err.to_string()))?;
        let (status, bytes) = self.send_action(action, version, &payload).await?;

        if !(200..300).contains(&status) {
            if let Ok(MetadataOnly { metadata }) = serde_json::from_slice(&bytes) {
                metadata.check()?;
            }

            return Err(ApiError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }
}
