use crate::{
    config::{VoiceConversionConfig, base_url},
    constants::{VOICE_CONVERSION_NAMESPACE, VOICE_CONVERSION_PATH},
    error::{ProtocolError, SessionError, StartupError},
    protocol::{Handshake, Inbound, SessionProtocol, decode_envelope},
    session::SessionEvent,
    token::TokenCache,
    transport::{ConnectRequest, TransportMessage},
};
use std::sync::Arc;
use volc_speech::{
    envelope::{ControlRequest, ControlResponse, TaskEvent, VoiceConversionRequest},
    server_error::ServerError,
};

/// Streaming voice conversion over JSON control envelopes.
///
/// Outbound audio is raw binary; inbound binary messages are converted
/// audio. The task starts with `StartTask`, is acknowledged with
/// `TaskStarted` and ends with `TaskFinished`.
pub struct VoiceConversionProtocol {
    config: VoiceConversionConfig,
    request: VoiceConversionRequest,
    tokens: Arc<TokenCache>,
}

impl VoiceConversionProtocol {
    pub fn new(
        config: VoiceConversionConfig,
        request: VoiceConversionRequest,
        tokens: Arc<TokenCache>,
    ) -> Self {
        Self {
            config,
            request,
            tokens,
        }
    }

    fn envelope(&self, token: &str, event: TaskEvent) -> ControlRequest {
        ControlRequest::new(token, &self.config.app_key, VOICE_CONVERSION_NAMESPACE, event)
    }
}

#[async_trait::async_trait]
impl SessionProtocol for VoiceConversionProtocol {
    fn name(&self) -> &'static str {
        "voice_conversion"
    }

    async fn handshake(&self) -> Result<Handshake, SessionError> {
        let token = self
            .tokens
            .ensure_fresh(&self.config.app_key, self.config.token_expiration_secs)
            .await?;

        let url = format!(
            "{}{VOICE_CONVERSION_PATH}",
            base_url(&self.config.host, "wss")
        );

        Ok(Handshake {
            request: ConnectRequest::new(url),
            token,
        })
    }

    fn start_message(&self, token: &str) -> Result<TransportMessage, SessionError> {
        let payload = self
            .request
            .to_json()
            .map_err(|err| ProtocolError::Encode(err.to_string()))?;

        let text = self
            .envelope(token, TaskEvent::StartTask)
            .with_payload(payload)
            .to_json()
            .map_err(|err| ProtocolError::Encode(err.to_string()))?;

        Ok(TransportMessage::Text(text))
    }

    fn acknowledge(&self, message: TransportMessage) -> Result<Inbound, StartupError> {
        let text = match message {
            TransportMessage::Text(text) => text,
            other => return Err(StartupError::UnexpectedMessage(other.kind())),
        };

        let response = ControlResponse::from_json(&text)
            .map_err(|err| StartupError::Malformed(ProtocolError::Envelope(err.to_string())))?;

        match response.event() {
            TaskEvent::TaskStarted => Ok(Inbound::Continue(Vec::new())),
            TaskEvent::TaskFailed => Err(StartupError::Rejected(ServerError::new(
                response.status_code,
                response.status_text,
            ))),
            other => Err(StartupError::UnexpectedEvent {
                expected: "TaskStarted",
                actual: other.as_str().to_string(),
            }),
        }
    }

    fn decode(&self, message: TransportMessage) -> Result<Inbound, SessionError> {
        match message {
            TransportMessage::Binary(audio) if audio.is_empty() => Ok(Inbound::Continue(Vec::new())),
            TransportMessage::Binary(audio) => Ok(Inbound::Continue(vec![SessionEvent::Audio(audio)])),
            TransportMessage::Text(text) => Ok(decode_envelope(&text)?),
            other => Err(ProtocolError::UnexpectedMessage(other.kind()).into()),
        }
    }

    fn finish_message(&self, token: &str) -> Result<Option<TransportMessage>, SessionError> {
        let text = self
            .envelope(token, TaskEvent::FinishTask)
            .to_json()
            .map_err(|err| ProtocolError::Encode(err.to_string()))?;

        Ok(Some(TransportMessage::Text(text)))
    }
}
