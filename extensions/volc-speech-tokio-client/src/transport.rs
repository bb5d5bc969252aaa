mod ws_connector;

pub use ws_connector::WsConnector;

use crate::error::TransportError;

/// A message on the duplex transport, independent of the WebSocket library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportMessage {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

impl TransportMessage {
    /// Short name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportMessage::Text(_) => "text",
            TransportMessage::Binary(_) => "binary",
            TransportMessage::Ping(_) => "ping",
            TransportMessage::Pong(_) => "pong",
            TransportMessage::Close => "close",
        }
    }
}

/// Write half of a transport.
#[async_trait::async_trait]
pub trait TransportSink: Send {
    async fn send(&mut self, message: TransportMessage) -> Result<(), TransportError>;

    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Read half of a transport.
#[async_trait::async_trait]
pub trait TransportSource: Send {
    /// Returns `None` once the peer has closed the stream.
    async fn recv(&mut self) -> Option<Result<TransportMessage, TransportError>>;
}

/// An open duplex connection, split into independently usable halves.
pub struct Transport {
    pub sink: Box<dyn TransportSink>,
    pub source: Box<dyn TransportSource>,
}

/// Where to connect and what to send in the opening handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl ConnectRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Opens transports. Sessions are generic over this so tests can supply an
/// in-memory stand-in.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, request: ConnectRequest) -> Result<Transport, TransportError>;
}
