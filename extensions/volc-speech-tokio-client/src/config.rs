use crate::constants::{
    DEFAULT_KEEPALIVE_INTERVAL, DEFAULT_TOKEN_EXPIRATION_SECS, OPEN_API_HOST, OPEN_API_REGION,
    SYNTHESIS_HOST, VOICE_CONVERSION_HOST,
};
use serde::Deserialize;
use std::{fmt, time::Duration};
use volc_speech::{auth::Credential, constants::DEFAULT_CHUNK_SIZE};

fn default_open_api_host() -> String {
    OPEN_API_HOST.to_string()
}

fn default_region() -> String {
    OPEN_API_REGION.to_string()
}

fn default_voice_conversion_host() -> String {
    VOICE_CONVERSION_HOST.to_string()
}

fn default_synthesis_host() -> String {
    SYNTHESIS_HOST.to_string()
}

fn default_token_expiration() -> i64 {
    DEFAULT_TOKEN_EXPIRATION_SECS
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_keepalive_ms() -> u64 {
    DEFAULT_KEEPALIVE_INTERVAL.as_millis() as u64
}

/// Access key pair for signed control-plane calls.
#[derive(Clone, Deserialize)]
pub struct OpenApiConfig {
    pub access_key: String,
    pub secret_key: String,
    /// Host (optionally `scheme://host[:port]`) of the OpenAPI gateway.
    #[serde(default = "default_open_api_host")]
    pub host: String,
    #[serde(default = "default_region")]
    pub region: String,
}

impl OpenApiConfig {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            host: default_open_api_host(),
            region: default_region(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// The key pair scoped to `service` in the configured region.
    pub fn credential(&self, service: &str) -> Credential {
        Credential::new(&self.access_key, &self.secret_key, service, &self.region)
    }
}

impl fmt::Debug for OpenApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenApiConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("host", &self.host)
            .field("region", &self.region)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConversionConfig {
    pub open_api: OpenApiConfig,
    pub app_key: String,
    /// Host (optionally `scheme://host[:port]`) of the streaming endpoint.
    #[serde(default = "default_voice_conversion_host")]
    pub host: String,
    #[serde(default = "default_token_expiration")]
    pub token_expiration_secs: i64,
}

impl VoiceConversionConfig {
    pub fn new(open_api: OpenApiConfig, app_key: impl Into<String>) -> Self {
        Self {
            open_api,
            app_key: app_key.into(),
            host: default_voice_conversion_host(),
            token_expiration_secs: default_token_expiration(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

#[derive(Clone, Deserialize)]
pub struct SynthesisConfig {
    pub app_id: String,
    pub access_token: String,
    /// Falls back to the cluster set on each request when empty.
    #[serde(default)]
    pub cluster: String,
    #[serde(default = "default_synthesis_host")]
    pub host: String,
}

impl SynthesisConfig {
    pub fn new(app_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            access_token: access_token.into(),
            cluster: String::new(),
            host: default_synthesis_host(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

impl fmt::Debug for SynthesisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesisConfig")
            .field("app_id", &self.app_id)
            .field("access_token", &"<redacted>")
            .field("cluster", &self.cluster)
            .field("host", &self.host)
            .finish()
    }
}

/// Per-session tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionOptions {
    /// Outbound audio chunk size in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_keepalive_ms")]
    pub keepalive_interval_ms: u64,
    /// Upper bound on the whole `run`, if any.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            keepalive_interval_ms: default_keepalive_ms(),
            timeout_ms: None,
        }
    }
}

impl SessionOptions {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.keepalive_interval_ms.max(1))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Turns a configured host into a base URL, keeping an explicit scheme.
pub(crate) fn base_url(host: &str, default_scheme: &str) -> String {
    if host.contains("://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("{default_scheme}://{}", host.trim_end_matches('/'))
    }
}
