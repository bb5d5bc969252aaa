mod synthesis;
mod voice_conversion;

pub use synthesis::SynthesisProtocol;
pub use voice_conversion::VoiceConversionProtocol;

use crate::{
    error::{ProtocolError, SessionError, StartupError},
    session::SessionEvent,
    transport::{ConnectRequest, TransportMessage},
};
use volc_speech::{envelope::ControlResponse, server_error::ServerError};

/// What the session should do with one decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Deliver these events and keep reading.
    Continue(Vec<SessionEvent>),
    /// Deliver these events, then end the session successfully.
    Finished(Vec<SessionEvent>),
    /// End the session with a server error. No further reads.
    Failed(ServerError),
}

/// Connection target and credentials resolved for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub request: ConnectRequest,
    /// Token carried in control messages; may be empty.
    pub token: String,
}

/// Service-specific half of a [`StreamSession`](crate::session::StreamSession).
///
/// The session owns the transport, the loops and cancellation; a protocol
/// only builds outbound messages and interprets inbound ones.
#[async_trait::async_trait]
pub trait SessionProtocol: Send + Sync {
    fn name(&self) -> &'static str;

    /// Resolves authorization and the connect request.
    async fn handshake(&self) -> Result<Handshake, SessionError>;

    fn start_message(&self, token: &str) -> Result<TransportMessage, SessionError>;

    /// Checks the first inbound text or binary message.
    fn acknowledge(&self, message: TransportMessage) -> Result<Inbound, StartupError>;

    /// Interprets a text or binary message received while streaming.
    fn decode(&self, message: TransportMessage) -> Result<Inbound, SessionError>;

    /// Message sent once caller input is exhausted, if the service needs one.
    fn finish_message(&self, token: &str) -> Result<Option<TransportMessage>, SessionError>;
}

/// Shared handling of inbound JSON control envelopes.
pub(crate) fn decode_envelope(text: &str) -> Result<Inbound, ProtocolError> {
    let response =
        ControlResponse::from_json(text).map_err(|err| ProtocolError::Envelope(err.to_string()))?;

    if response.is_failed() {
        return Ok(Inbound::Failed(ServerError::new(
            response.status_code,
            response.status_text,
        )));
    }

    let finished = response.is_finished();
    let mut events = Vec::with_capacity(2);
    if let Some(data) = response.data.as_ref().filter(|data| !data.is_empty()) {
        events.push(SessionEvent::Audio(data.clone()));
    }
    events.push(SessionEvent::Status(response));

    Ok(if finished {
        Inbound::Finished(events)
    } else {
        Inbound::Continue(events)
    })
}
