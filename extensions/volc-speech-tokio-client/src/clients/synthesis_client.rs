use crate::{
    config::{SessionOptions, SynthesisConfig},
    error::SessionError,
    protocol::SynthesisProtocol,
    session::{SessionEvent, StreamSession},
    transport::{Connector, WsConnector},
};
use std::sync::Arc;
use volc_speech::envelope::SynthesisRequest;

/// Streams synthesized speech for one text at a time.
pub struct SynthesisClient {
    config: SynthesisConfig,
    connector: Arc<dyn Connector>,
    options: SessionOptions,
}

impl SynthesisClient {
    pub fn new(config: SynthesisConfig) -> Self {
        Self::with_connector(config, Arc::new(WsConnector))
    }

    pub fn with_connector(config: SynthesisConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            options: SessionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn open(&self, request: SynthesisRequest) -> Result<StreamSession, SessionError> {
        let protocol = SynthesisProtocol::new(self.config.clone(), request);
        StreamSession::open(self.connector.as_ref(), Arc::new(protocol), self.options.clone()).await
    }

    /// Delivers audio and timestamp events until the final audio frame.
    pub async fn synthesize<F>(&self, request: SynthesisRequest, on_event: F) -> Result<(), SessionError>
    where
        F: FnMut(SessionEvent) + Send,
    {
        self.open(request).await?.run(None, on_event).await
    }
}
