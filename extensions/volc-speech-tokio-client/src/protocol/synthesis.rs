use crate::{
    config::{SynthesisConfig, base_url},
    constants::{BEARER_PREFIX, SYNTHESIS_PATH},
    error::{ProtocolError, SessionError, StartupError},
    protocol::{Handshake, Inbound, SessionProtocol, decode_envelope},
    session::SessionEvent,
    transport::{ConnectRequest, TransportMessage},
};
use volc_speech::{
    envelope::SynthesisRequest,
    frame::{CompressionMethod, FrameBody, FrameCodec, SerializationMethod},
};

/// Streaming text-to-speech over binary frames.
///
/// The task is started by one gzip JSON full client request and ends with
/// the audio frame carrying a negative sequence number. There is no finish
/// message.
pub struct SynthesisProtocol {
    config: SynthesisConfig,
    request: SynthesisRequest,
}

impl SynthesisProtocol {
    pub fn new(config: SynthesisConfig, mut request: SynthesisRequest) -> Self {
        if request.app.cluster.is_empty() {
            request.app.cluster = config.cluster.clone();
        }
        if request.app.token.is_empty() {
            // Any non-empty value is accepted; the real token travels in the handshake.
            request.app.token = "access_token".to_string();
        }
        if request.user.uid.is_empty() {
            request.user.uid = config.app_id.clone();
        }
        if request.request.reqid.is_empty() {
            request.request.reqid = uuid::Uuid::new_v4().to_string();
        }

        Self { config, request }
    }

    pub fn request(&self) -> &SynthesisRequest {
        &self.request
    }

    /// Interprets one binary frame. Frames a server never sends are errors.
    fn decode_frame(&self, bytes: &[u8]) -> Result<Inbound, ProtocolError> {
        let frame = FrameCodec::decode(bytes)?;
        let is_final = frame.is_final();

        let events = match frame.body {
            FrameBody::AudioAck => Vec::new(),
            FrameBody::Audio(chunk) if chunk.audio.is_empty() => Vec::new(),
            FrameBody::Audio(chunk) => vec![SessionEvent::Audio(chunk.audio)],
            FrameBody::Frontend(message) => message
                .frontend
                .map(SessionEvent::Timestamps)
                .into_iter()
                .collect(),
            FrameBody::Error(error) => return Ok(Inbound::Failed(error)),
            FrameBody::ClientRequest { .. } => {
                return Err(ProtocolError::UnexpectedMessage("full client request"));
            }
        };

        Ok(if is_final {
            Inbound::Finished(events)
        } else {
            Inbound::Continue(events)
        })
    }
}

#[async_trait::async_trait]
impl SessionProtocol for SynthesisProtocol {
    fn name(&self) -> &'static str {
        "synthesis"
    }

    async fn handshake(&self) -> Result<Handshake, SessionError> {
        let url = format!("{}{SYNTHESIS_PATH}", base_url(&self.config.host, "wss"));

        Ok(Handshake {
            request: ConnectRequest::new(url).with_header(
                "Authorization",
                format!("{BEARER_PREFIX}{}", self.config.access_token),
            ),
            token: self.config.access_token.clone(),
        })
    }

    fn start_message(&self, _token: &str) -> Result<TransportMessage, SessionError> {
        let payload = self
            .request
            .to_submit_json(&self.config.app_id)
            .map_err(|err| ProtocolError::Encode(err.to_string()))?;

        let frame = FrameCodec::encode_full_client_request(
            SerializationMethod::Json,
            CompressionMethod::Gzip,
            &payload,
        )
        .map_err(ProtocolError::from)?;

        Ok(TransportMessage::Binary(frame))
    }

    fn acknowledge(&self, message: TransportMessage) -> Result<Inbound, StartupError> {
        let bytes = match message {
            TransportMessage::Binary(bytes) => bytes,
            other => return Err(StartupError::UnexpectedMessage(other.kind())),
        };

        match self.decode_frame(&bytes) {
            Ok(Inbound::Failed(error)) => Err(StartupError::Rejected(error)),
            Ok(inbound) => Ok(inbound),
            Err(err) => Err(StartupError::Malformed(err)),
        }
    }

    fn decode(&self, message: TransportMessage) -> Result<Inbound, SessionError> {
        match message {
            TransportMessage::Binary(bytes) => Ok(self.decode_frame(&bytes)?),
            TransportMessage::Text(text) => Ok(decode_envelope(&text)?),
            other => Err(ProtocolError::UnexpectedMessage(other.kind()).into()),
        }
    }

    fn finish_message(&self, _token: &str) -> Result<Option<TransportMessage>, SessionError> {
        Ok(None)
    }
}
