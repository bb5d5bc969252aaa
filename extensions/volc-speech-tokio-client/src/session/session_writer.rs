use crate::{
    error::TransportError,
    transport::{TransportMessage, TransportSink},
};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// The one path to the transport sink.
///
/// Audio chunks, control messages, pings and the final close are all
/// serialized through the same async mutex, so a message is never
/// interleaved with another. Once closed, every send fails with
/// [`TransportError::Closed`].
pub struct SessionWriter {
    sink: Mutex<Box<dyn TransportSink>>,
    closed: AtomicBool,
}

impl SessionWriter {
    pub fn new(sink: Box<dyn TransportSink>) -> Self {
        Self {
            sink: Mutex::new(sink),
            closed: AtomicBool::new(false),
        }
    }

    pub async fn send(&self, message: TransportMessage) -> Result<(), TransportError> {
        let mut sink = self.sink.lock().await;

        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }

        sink.send(message).await
    }

    /// Closes the sink. Only the first call reaches the transport.
    pub async fn close(&self) -> Result<(), TransportError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.sink.lock().await.close().await
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
