use crate::{
    error::TransportError,
    transport::{ConnectRequest, Connector, Transport, TransportMessage, TransportSink, TransportSource},
};
use bytes::Bytes;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        client::IntoClientRequest,
        http::{HeaderName, HeaderValue},
        protocol::Message as WsMessage,
    },
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default [`Connector`] backed by `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait::async_trait]
impl Connector for WsConnector {
    async fn connect(&self, request: ConnectRequest) -> Result<Transport, TransportError> {
        let mut ws_request = request
            .url
            .as_str()
            .into_client_request()
            .map_err(|err| TransportError::Connect(err.to_string()))?;

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| TransportError::Connect(err.to_string()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| TransportError::Connect(err.to_string()))?;
            ws_request.headers_mut().insert(name, value);
        }

        let (ws_stream, response) = connect_async(ws_request)
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;

        tracing::debug!(url = %request.url, status = %response.status(), "websocket connected");

        let (sink, source) = ws_stream.split();

        Ok(Transport {
            sink: Box::new(WsSink { sink }),
            source: Box::new(WsSource { source }),
        })
    }
}

struct WsSink {
    sink: SplitSink<WsStream, WsMessage>,
}

#[async_trait::async_trait]
impl TransportSink for WsSink {
    async fn send(&mut self, message: TransportMessage) -> Result<(), TransportError> {
        let message = match message {
            TransportMessage::Text(text) => WsMessage::Text(text.into()),
            TransportMessage::Binary(bytes) => WsMessage::Binary(Bytes::from(bytes)),
            TransportMessage::Ping(bytes) => WsMessage::Ping(Bytes::from(bytes)),
            TransportMessage::Pong(bytes) => WsMessage::Pong(Bytes::from(bytes)),
            TransportMessage::Close => WsMessage::Close(None),
        };

        self.sink
            .send(message)
            .await
            .map_err(|err| TransportError::Write(err.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sink
            .close()
            .await
            .map_err(|err| TransportError::Write(err.to_string()))
    }
}

struct WsSource {
    source: SplitStream<WsStream>,
}

#[async_trait::async_trait]
impl TransportSource for WsSource {
    async fn recv(&mut self) -> Option<Result<TransportMessage, TransportError>> {
        loop {
            let message = match self.source.next().await? {
                Ok(message) => message,
                Err(err) => return Some(Err(TransportError::Read(err.to_string()))),
            };

            let message = match message {
                WsMessage::Text(text) => TransportMessage::Text(text.as_str().to_string()),
                WsMessage::Binary(bytes) => TransportMessage::Binary(bytes.to_vec()),
                WsMessage::Ping(bytes) => TransportMessage::Ping(bytes.to_vec()),
                WsMessage::Pong(bytes) => TransportMessage::Pong(bytes.to_vec()),
                WsMessage::Close(_) => TransportMessage::Close,
                // Raw frames are never surfaced while reading.
                WsMessage::Frame(_) => continue,
            };

            return Some(Ok(message));
        }
    }
}
