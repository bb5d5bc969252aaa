use crate::{
    config::{SessionOptions, VoiceConversionConfig},
    error::{ApiError, SessionError},
    protocol::VoiceConversionProtocol,
    session::{SessionEvent, StreamSession},
    token::{OpenApiTokenIssuer, TokenCache},
    transport::{Connector, WsConnector},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use volc_speech::envelope::VoiceConversionRequest;

/// Converts a live audio stream into another speaker's voice.
///
/// The client owns a [`TokenCache`] shared by every session it opens, so a
/// token is only requested when the cached one is about to expire.
pub struct VoiceConversionClient {
    config: VoiceConversionConfig,
    tokens: Arc<TokenCache>,
    connector: Arc<dyn Connector>,
    options: SessionOptions,
}

impl VoiceConversionClient {
    pub fn new(config: VoiceConversionConfig) -> Result<Self, ApiError> {
        let issuer = OpenApiTokenIssuer::new(&config.open_api)?;
        let tokens = Arc::new(TokenCache::new(Arc::new(issuer)));
        Ok(Self::with_parts(config, tokens, Arc::new(WsConnector)))
    }

    pub fn with_parts(
        config: VoiceConversionConfig,
        tokens: Arc<TokenCache>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            config,
            tokens,
            connector,
            options: SessionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// Opens a session without running it, for callers that want the
    /// cancel handle or state changes.
    pub async fn open(&self, request: VoiceConversionRequest) -> Result<StreamSession, SessionError> {
        let protocol = VoiceConversionProtocol::new(self.config.clone(), request, self.tokens.clone());
        StreamSession::open(self.connector.as_ref(), Arc::new(protocol), self.options.clone()).await
    }

    /// Streams `audio` until the channel closes and hands every converted
    /// audio buffer to `on_audio`.
    pub async fn convert<F>(
        &self,
        request: VoiceConversionRequest,
        audio: mpsc::Receiver<Vec<u8>>,
        mut on_audio: F,
    ) -> Result<(), SessionError>
    where
        F: FnMut(Vec<u8>) + Send,
    {
        let session = self.open(request).await?;

        session
            .run(Some(audio), |event| {
                if let SessionEvent::Audio(audio) = event {
                    on_audio(audio);
                }
            })
            .await
    }
}
