use serde::{Deserialize, Serialize};

/// Operation value that asks for a streamed (websocket) synthesis.
pub const OPERATION_SUBMIT: &str = "submit";

fn is_zero_i32(value: &i32) -> bool {
    *value == 0
}

fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisApp {
    pub appid: String,
    /// Any non-empty value is accepted by the service.
    pub token: String,
    pub cluster: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisUser {
    pub uid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisAudio {
    pub voice_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub encoding: String,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub compression_rate: i32,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub rate: i32,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub speed_ratio: f64,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub volume_ratio: f64,
    #[serde(default, skip_serializing_if = "is_zero_f64")]
    pub pitch_ratio: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub emotion: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisTask {
    /// Must be unique per call.
    pub reqid: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text_type: String,
    pub operation: String,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub silence_duration: i32,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub with_frontend: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub frontend_type: String,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub with_timestamp: i32,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub split_sentence: i32,
    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub pure_english_opt: i32,
}

/// Configuration document sent in the full client request that starts a
/// synthesis task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub app: SynthesisApp,
    pub user: SynthesisUser,
    pub audio: SynthesisAudio,
    pub request: SynthesisTask,
}

impl SynthesisRequest {
    /// Serializes the request for streaming under `appid`, forcing the
    /// `submit` operation.
    pub fn to_submit_json(&self, appid: &str) -> Result<Vec<u8>, serde_json::Error> {
        let mut request = self.clone();
        request.app.appid = appid.to_string();
        request.request.operation = OPERATION_SUBMIT.to_string();
        serde_json::to_vec(&request)
    }
}
