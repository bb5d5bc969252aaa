use thiserror::Error;
use volc_speech::{
    auth::SigningError,
    frame::FrameError,
    server_error::{ServerError, ServerErrorCode},
};

/// Failure of the underlying duplex connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("read failed: {0}")]
    Read(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("transport closed")]
    Closed,
}

/// An inbound message that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("unparseable control envelope: {0}")]
    Envelope(String),

    #[error("unexpected {0} message")]
    UnexpectedMessage(&'static str),

    #[error("failed to encode request: {0}")]
    Encode(String),
}

/// The server did not acknowledge the start of a task.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("first event mismatched: expected {expected}, got {actual:?}")]
    UnexpectedEvent {
        expected: &'static str,
        actual: String,
    },

    #[error("unexpected {0} message before acknowledgement")]
    UnexpectedMessage(&'static str),

    #[error("malformed acknowledgement: {0}")]
    Malformed(ProtocolError),

    #[error("task rejected: {0}")]
    Rejected(ServerError),

    #[error("transport failed during startup: {0}")]
    Transport(TransportError),

    #[error("transport closed before acknowledgement")]
    Closed,
}

/// Token issuance failure.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("token request failed: {0}")]
    Http(String),

    #[error("token response could not be decoded: {0}")]
    Decode(String),

    #[error("token request rejected: status_code={status_code}, status_text={status_text}")]
    Rejected {
        status_code: i32,
        status_text: String,
    },
}

/// Control-plane request failure.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("request failed: {0}")]
    Http(String),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request could not be encoded: {0}")]
    Encode(String),

    #[error("response could not be decoded: {0}")]
    Decode(String),

    /// Error carried in the `ResponseMetadata` of an OpenAPI response.
    #[error("{code}: {message}")]
    Remote { code: String, message: String },

    /// Vendor status code returned by a speaker endpoint.
    #[error("{code}: {message}")]
    Vendor {
        code: ServerErrorCode,
        message: String,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err.to_string())
    }
}

/// The single terminal outcome of a streaming session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("server error: {0}")]
    Server(#[from] ServerError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("session cancelled")]
    Cancelled,

    #[error("session timed out")]
    TimedOut,
}
