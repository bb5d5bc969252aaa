use std::time::Duration;

// Voice conversion

pub const VOICE_CONVERSION_HOST: &str = "sami.bytedance.com";
pub const VOICE_CONVERSION_PATH: &str = "/api/v1/ws";
pub const VOICE_CONVERSION_NAMESPACE: &str = "VoiceConversionStream";

// Synthesis

pub const SYNTHESIS_HOST: &str = "openspeech.bytedance.com";
pub const SYNTHESIS_PATH: &str = "/api/v1/tts/ws_binary";

/// Prefix of the bearer `Authorization` value used by openspeech hosts.
/// Note the semicolon: the service does not accept a space here.
pub const BEARER_PREFIX: &str = "Bearer;";

// Control plane

pub const OPEN_API_HOST: &str = "open.volcengineapi.com";
pub const OPEN_API_REGION: &str = "cn-north-1";

pub const TOKEN_SERVICE: &str = "sami";
pub const TOKEN_ACTION: &str = "GetToken";
pub const TOKEN_API_VERSION: &str = "2021-07-27";
pub const TOKEN_VERSION: &str = "volc-auth-v1";

pub const SPEAKER_SERVICE: &str = "speech_saas_prod";
pub const SPEAKER_API_VERSION: &str = "2023-11-07";
pub const SPEAKER_RESOURCE_ID: &str = "volc.megatts.voiceclone";
pub const SPEAKER_UPLOAD_PATH: &str = "/api/v1/mega_tts/audio/upload";
pub const SPEAKER_STATUS_PATH: &str = "/api/v1/mega_tts/status";

// Timing

/// Default lifetime requested for an issued token.
pub const DEFAULT_TOKEN_EXPIRATION_SECS: i64 = 3600;

/// A token is treated as expired this long before its actual expiry.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// The interval at which the session sends Ping messages to the server.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);

/// Timeout applied to each control-plane HTTP request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
