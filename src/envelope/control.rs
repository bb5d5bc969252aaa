use serde::{Deserialize, Serialize};

/// Lifecycle events carried in the `event` field of a control envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    StartTask,
    TaskStarted,
    FinishTask,
    TaskFinished,
    TaskRequest,
    TaskFailed,
    Other(String),
}

impl TaskEvent {
    pub fn parse(event: &str) -> Self {
        match event {
            "StartTask" => Self::StartTask,
            "TaskStarted" => Self::TaskStarted,
            "FinishTask" => Self::FinishTask,
            "TaskFinished" => Self::TaskFinished,
            "TaskRequest" => Self::TaskRequest,
            "TaskFailed" => Self::TaskFailed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::StartTask => "StartTask",
            Self::TaskStarted => "TaskStarted",
            Self::FinishTask => "FinishTask",
            Self::TaskFinished => "TaskFinished",
            Self::TaskRequest => "TaskRequest",
            Self::TaskFailed => "TaskFailed",
            Self::Other(other) => other,
        }
    }
}

/// Outbound JSON control envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    pub token: String,
    pub appkey: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub event: String,
    /// JSON document serialized into a string, as the service expects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "super::base64_bytes")]
    pub data: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub task_id: String,
}

impl ControlRequest {
    pub fn new(
        token: impl Into<String>,
        appkey: impl Into<String>,
        namespace: impl Into<String>,
        event: TaskEvent,
    ) -> Self {
        Self {
            token: token.into(),
            appkey: appkey.into(),
            namespace: namespace.into(),
            event: event.as_str().to_string(),
            ..Default::default()
        }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Inbound JSON control envelope.
///
/// Every field defaults when absent; the service omits most of them on
/// intermediate messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub status_code: i32,
    #[serde(default)]
    pub status_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "super::base64_bytes")]
    pub data: Option<Vec<u8>>,
}

impl ControlResponse {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn event(&self) -> TaskEvent {
        TaskEvent::parse(&self.event)
    }

    pub fn is_started(&self) -> bool {
        self.event() == TaskEvent::TaskStarted
    }

    pub fn is_finished(&self) -> bool {
        self.event() == TaskEvent::TaskFinished
    }

    pub fn is_failed(&self) -> bool {
        self.event() == TaskEvent::TaskFailed
    }
}
