use serde::{Deserialize, Serialize};

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Sample layout of an audio stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioInfo {
    /// 8000 to 48000.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub sample_rate: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub channel: u32,
    /// Only `s16le` is accepted today.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
}

impl AudioInfo {
    pub fn s16le(sample_rate: u32, channel: u32) -> Self {
        Self {
            sample_rate,
            channel,
            format: "s16le".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionExtra {
    /// Align every frame except the first and last to the same length.
    pub downstream_align: bool,
}

/// Payload of the `StartTask` envelope for a voice conversion task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceConversionRequest {
    pub speaker: String,
    /// Input audio.
    pub audio_info: AudioInfo,
    /// Output audio.
    pub audio_config: AudioInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<ConversionExtra>,
}

impl VoiceConversionRequest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
