use crate::{
    config::base_url,
    constants::{
        BEARER_PREFIX, DEFAULT_HTTP_TIMEOUT, SPEAKER_RESOURCE_ID, SPEAKER_STATUS_PATH,
        SPEAKER_UPLOAD_PATH, SYNTHESIS_HOST,
    },
    error::ApiError,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;
use volc_speech::server_error::ServerErrorCode;

fn default_host() -> String {
    SYNTHESIS_HOST.to_string()
}

#[derive(Clone, Deserialize)]
pub struct SpeakerClientConfig {
    pub app_id: String,
    pub access_token: String,
    #[serde(default = "default_host")]
    pub host: String,
}

impl SpeakerClientConfig {
    pub fn new(app_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            access_token: access_token.into(),
            host: default_host(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

impl fmt::Debug for SpeakerClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeakerClientConfig")
            .field("app_id", &self.app_id)
            .field("access_token", &"<redacted>")
            .field("host", &self.host)
            .finish()
    }
}

/// Training progress of an uploaded voice.
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum TrainingStatus {
    NotFound = 0,
    Training = 1,
    Success = 2,
    Failed = 3,
    Active = 4,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusRequest {
    /// Filled in from the client configuration.
    pub appid: String,
    pub speaker_id: String,
}

impl StatusRequest {
    pub fn new(speaker_id: impl Into<String>) -> Self {
        Self {
            appid: String::new(),
            speaker_id: speaker_id.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadAudio {
    /// Base64 of the raw audio file.
    pub audio_bytes: String,
    /// Required for `pcm` and `m4a`.
    pub audio_format: String,
    /// Reference text; a large mismatch with the audio yields a WER error.
    pub text: String,
}

impl UploadAudio {
    pub fn new(audio: &[u8], audio_format: impl Into<String>) -> Self {
        Self {
            audio_bytes: STANDARD.encode(audio),
            audio_format: audio_format.into(),
            text: String::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// Training material for one speaker. One audio file per upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadRequest {
    #[serde(flatten)]
    pub speaker: StatusRequest,
    pub audios: Vec<UploadAudio>,
    /// Always `2`.
    pub source: i32,
}

impl UploadRequest {
    pub fn new(speaker_id: impl Into<String>, audio: UploadAudio) -> Self {
        Self {
            speaker: StatusRequest::new(speaker_id),
            audios: vec![audio],
            source: 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub speaker_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub speaker_id: String,
    #[serde(default)]
    pub create_time: i64,
    /// Training version, e.g. `3V`.
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub demo_audio: String,
    pub status: TrainingStatus,
}

impl StatusResponse {
    /// Number of training rounds, parsed from the `<n>V` version string.
    /// Zero when the version is missing or unparseable.
    pub fn training_count(&self) -> u32 {
        self.version
            .trim_end_matches('V')
            .parse()
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct BaseResponse {
    #[serde(rename = "StatusCode", default)]
    status_code: i32,
    #[serde(rename = "StatusMessage", default)]
    status_message: String,
}

/// Bearer-authenticated voice-clone upload and status calls.
#[derive(Debug, Clone)]
pub struct SpeakerClient {
    http: reqwest::Client,
    base_url: String,
    config: SpeakerClientConfig,
}

impl SpeakerClient {
    pub fn new(config: SpeakerClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url(&config.host, "https"),
            config,
        })
    }

    /// Uploads training audio and returns the speaker id.
    pub async fn upload(&self, mut request: UploadRequest) -> Result<String, ApiError> {
        request.speaker.appid = self.config.app_id.clone();
        let response: UploadResponse = self.post(SPEAKER_UPLOAD_PATH, &request).await?;
        Ok(response.speaker_id)
    }

    /// Training status. Only available until some time after activation.
    pub async fn status(&self, mut request: StatusRequest) -> Result<StatusResponse, ApiError> {
        request.appid = self.config.app_id.clone();
        self.post(SPEAKER_STATUS_PATH, &request).await
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .header("Content-Type", "application/json")
            .header(
                "Authorization",
                format!("{BEARER_PREFIX}{}", self.config.access_token),
            )
            .header("Resource-Id", SPEAKER_RESOURCE_ID)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        if status != 200 {
            return match serde_json::from_slice::<BaseResponse>(&bytes) {
                Ok(base) => {
                    let code = ServerErrorCode::from_code(base.status_code);
                    tracing::warn!(path, %code, message = %base.status_message, "speaker request failed");
                    Err(ApiError::Vendor {
                        code,
                        message: base.status_message,
                    })
                }
                Err(_) => Err(ApiError::Status {
                    status,
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                }),
            };
        }

        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }
}
