use crate::{
    config::SessionOptions,
    error::{SessionError, StartupError, TransportError},
    protocol::{Inbound, SessionProtocol},
    session::{
        CancelHandle, CancelScope, SessionEvent, SessionState, SessionWriter, StateTracker,
    },
    transport::{Connector, TransportMessage, TransportSource},
};
use std::sync::Arc;
use tokio::{
    sync::mpsc,
    time::{Instant, interval_at, sleep_until},
};
use volc_speech::frame::ChunkScheduler;

/// An opened transport waiting for `run`.
struct Connection {
    writer: SessionWriter,
    source: Box<dyn TransportSource>,
    token: String,
    /// Unit carried by the acknowledgement, delivered first once running.
    pending: Option<Inbound>,
}

/// One streaming task over a duplex transport.
///
/// A session is opened once and run once. While running, three futures
/// share a [`CancelScope`]:
///
/// - the send loop drains caller audio through a [`ChunkScheduler`] and
///   writes the finish message when input ends,
/// - the receive loop decodes inbound messages and hands them to the
///   caller's callback,
/// - the keepalive loop pings the peer and enforces the optional timeout.
///
/// Pings also go out while `start` waits for the acknowledgement.
///
/// The first failure (or the terminal success condition) stops all three.
/// Every write goes through a single [`SessionWriter`], and the transport is
/// closed exactly once when `run` returns.
pub struct StreamSession {
    protocol: Arc<dyn SessionProtocol>,
    options: SessionOptions,
    scope: Arc<CancelScope>,
    state: StateTracker,
    connection: Option<Connection>,
}

impl StreamSession {
    pub fn new(protocol: Arc<dyn SessionProtocol>, options: SessionOptions) -> Self {
        Self {
            protocol,
            options,
            scope: Arc::new(CancelScope::new()),
            state: StateTracker::new(),
            connection: None,
        }
    }

    /// Creates and starts a session in one step.
    pub async fn open(
        connector: &dyn Connector,
        protocol: Arc<dyn SessionProtocol>,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(protocol, options);
        session.start(connector).await?;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    /// Registers an observer called on every state transition.
    pub fn set_state_change_handler(&self, handler: impl Fn(SessionState) + Send + Sync + 'static) {
        self.state.set_handler(Box::new(handler));
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(self.scope.clone())
    }

    /// Connects, sends the start message and waits for the acknowledgement.
    ///
    /// On any failure the session is `Failed` and the transport, if one was
    /// opened, is closed.
    pub async fn start(&mut self, connector: &dyn Connector) -> Result<(), SessionError> {
        if self.state.get() != SessionState::Idle {
            return Err(TransportError::Closed.into());
        }

        let protocol = self.protocol.name();

        let handshake = match self.protocol.handshake().await {
            Ok(handshake) => handshake,
            Err(err) => return Err(self.fail_startup(err)),
        };

        tracing::info!(protocol, url = %handshake.request.url, "opening session");

        let transport = match connector.connect(handshake.request).await {
            Ok(transport) => transport,
            Err(err) => return Err(self.fail_startup(err.into())),
        };

        let writer = SessionWriter::new(transport.sink);
        let mut source = transport.source;

        let start = match self.protocol.start_message(&handshake.token) {
            Ok(start) => start,
            Err(err) => return Err(self.fail_open(&writer, err).await),
        };

        self.state.transition(SessionState::AwaitingStart);

        if let Err(err) = writer.send(start).await {
            return Err(self.fail_open(&writer, StartupError::Transport(err).into()).await);
        }

        let acknowledgement = tokio::select! {
            biased;
            _ = self.scope.stopped() => Err(SessionError::Cancelled),
            result = self.await_acknowledgement(source.as_mut()) => result.map_err(SessionError::from),
            err = self.ping_until_acknowledged(&writer) => Err(StartupError::Transport(err).into()),
        };

        let pending = match acknowledgement {
            Ok(pending) => pending,
            Err(err) => return Err(self.fail_open(&writer, err).await),
        };

        tracing::debug!(protocol, "task acknowledged");

        self.connection = Some(Connection {
            writer,
            source,
            token: handshake.token,
            pending,
        });

        Ok(())
    }

    async fn await_acknowledgement(
        &self,
        source: &mut dyn TransportSource,
    ) -> Result<Option<Inbound>, StartupError> {
        loop {
            let message = match source.recv().await {
                Some(Ok(message)) => message,
                Some(Err(err)) => return Err(StartupError::Transport(err)),
                None => return Err(StartupError::Closed),
            };

            match message {
                TransportMessage::Ping(_) | TransportMessage::Pong(_) => continue,
                TransportMessage::Close => return Err(StartupError::Closed),
                message => {
                    return match self.protocol.acknowledge(message)? {
                        Inbound::Continue(events) if events.is_empty() => Ok(None),
                        inbound => Ok(Some(inbound)),
                    };
                }
            }
        }
    }

    /// Keeps the connection alive while the acknowledgement is pending.
    /// Only returns on a failed ping.
    async fn ping_until_acknowledged(&self, writer: &SessionWriter) -> TransportError {
        let period = self.options.keepalive_interval();
        let mut ticker = interval_at(Instant::now() + period, period);

        loop {
            ticker.tick().await;
            tracing::trace!("sending ping while awaiting acknowledgement");
            if let Err(err) = writer.send(TransportMessage::Ping(Vec::new())).await {
                return err;
            }
        }
    }

    fn fail_startup(&self, err: SessionError) -> SessionError {
        tracing::warn!(protocol = self.protocol.name(), %err, "session failed to start");
        self.state.transition(SessionState::Failed);
        err
    }

    async fn fail_open(&self, writer: &SessionWriter, err: SessionError) -> SessionError {
        if let Err(close_err) = writer.close().await {
            tracing::debug!(%close_err, "close after failed start");
        }
        self.fail_startup(err)
    }

    /// Streams `audio` (if any) and delivers inbound units to `on_event`
    /// until the task finishes, fails or is cancelled.
    ///
    /// Errors are returned here, never passed to `on_event`.
    pub async fn run<F>(
        mut self,
        audio: Option<mpsc::Receiver<Vec<u8>>>,
        mut on_event: F,
    ) -> Result<(), SessionError>
    where
        F: FnMut(SessionEvent) + Send,
    {
        let Some(connection) = self.connection.take() else {
            return Err(TransportError::Closed.into());
        };

        let Connection {
            writer,
            mut source,
            token,
            pending,
        } = connection;

        self.state.transition(SessionState::Streaming);

        if let Some(pending) = pending {
            self.handle_inbound(pending, &mut on_event);
        }

        tokio::join!(
            self.send_loop(&writer, audio, &token),
            self.receive_loop(source.as_mut(), &mut on_event),
            self.keepalive_loop(&writer),
        );

        if let Err(err) = writer.close().await {
            tracing::debug!(%err, "transport close failed");
        }

        let outcome = self.scope.take_outcome().unwrap_or(Ok(()));

        match &outcome {
            Ok(()) => {
                self.state.transition(SessionState::Finished);
                tracing::info!(protocol = self.protocol.name(), "session finished");
            }
            Err(err) => {
                self.state.transition(SessionState::Failed);
                tracing::error!(protocol = self.protocol.name(), %err, "session failed");
            }
        }

        outcome
    }

    /// Delivers the events of one inbound unit. Returns `true` if it ended
    /// the session.
    fn handle_inbound<F>(&self, inbound: Inbound, on_event: &mut F) -> bool
    where
        F: FnMut(SessionEvent),
    {
        match inbound {
            Inbound::Continue(events) => {
                events.into_iter().for_each(&mut *on_event);
                false
            }
            Inbound::Finished(events) => {
                events.into_iter().for_each(&mut *on_event);
                self.scope.stop();
                true
            }
            Inbound::Failed(error) => {
                self.scope.cancel(SessionError::Server(error));
                true
            }
        }
    }

    /// Writes `message` unless the scope stops first. `None` means stopped.
    async fn write(
        &self,
        writer: &SessionWriter,
        message: TransportMessage,
    ) -> Option<Result<(), TransportError>> {
        tokio::select! {
            biased;
            _ = self.scope.stopped() => None,
            result = writer.send(message) => Some(result),
        }
    }

    async fn send_loop(
        &self,
        writer: &SessionWriter,
        audio: Option<mpsc::Receiver<Vec<u8>>>,
        token: &str,
    ) {
        if let Some(mut audio) = audio {
            let mut scheduler = ChunkScheduler::new(self.options.chunk_size);

            loop {
                let next = tokio::select! {
                    biased;
                    _ = self.scope.stopped() => {
                        discard_input(&mut audio);
                        return;
                    }
                    next = audio.recv() => next,
                };

                let Some(buffer) = next else {
                    break;
                };

                for chunk in scheduler.push(&buffer) {
                    tracing::trace!(len = chunk.len(), "sending audio chunk");
                    match self.write(writer, TransportMessage::Binary(chunk)).await {
                        Some(Ok(())) => {}
                        Some(Err(err)) => {
                            self.scope.cancel(err.into());
                            discard_input(&mut audio);
                            return;
                        }
                        None => {
                            discard_input(&mut audio);
                            return;
                        }
                    }
                }
            }

            let tail = scheduler.flush();
            if !tail.is_empty() {
                tracing::trace!(len = tail.len(), "sending final audio chunk");
                match self.write(writer, TransportMessage::Binary(tail)).await {
                    Some(Ok(())) => {}
                    Some(Err(err)) => {
                        self.scope.cancel(err.into());
                        return;
                    }
                    None => return,
                }
            }
        }

        match self.protocol.finish_message(token) {
            Ok(Some(finish)) => match self.write(writer, finish).await {
                Some(Ok(())) => {}
                Some(Err(err)) => {
                    self.scope.cancel(err.into());
                    return;
                }
                None => return,
            },
            Ok(None) => {}
            Err(err) => {
                self.scope.cancel(err);
                return;
            }
        }

        tracing::debug!(protocol = self.protocol.name(), "input exhausted, draining");
        self.state.transition(SessionState::Draining);
    }

    async fn receive_loop<F>(&self, source: &mut dyn TransportSource, on_event: &mut F)
    where
        F: FnMut(SessionEvent) + Send,
    {
        if self.scope.is_stopped() {
            return;
        }

        loop {
            let next = tokio::select! {
                biased;
                _ = self.scope.stopped() => return,
                next = source.recv() => next,
            };

            let message = match next {
                Some(Ok(message)) => message,
                Some(Err(err)) => {
                    self.scope.cancel(err.into());
                    return;
                }
                None => {
                    self.scope.cancel(TransportError::Closed.into());
                    return;
                }
            };

            let inbound = match message {
                // The transport answers pings on its own.
                TransportMessage::Ping(_) | TransportMessage::Pong(_) => continue,
                TransportMessage::Close => {
                    self.scope.cancel(TransportError::Closed.into());
                    return;
                }
                message => match self.protocol.decode(message) {
                    Ok(inbound) => inbound,
                    Err(err) => {
                        self.scope.cancel(err);
                        return;
                    }
                },
            };

            if self.handle_inbound(inbound, on_event) {
                return;
            }
        }
    }

    async fn keepalive_loop(&self, writer: &SessionWriter) {
        let period = self.options.keepalive_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        let deadline = self.options.timeout().map(|timeout| Instant::now() + timeout);

        loop {
            tokio::select! {
                biased;
                _ = self.scope.stopped() => return,
                _ = wait_deadline(deadline) => {
                    self.scope.cancel(SessionError::TimedOut);
                    return;
                }
                _ = ticker.tick() => {
                    tracing::trace!("sending ping");
                    match self.write(writer, TransportMessage::Ping(Vec::new())).await {
                        Some(Ok(())) => {}
                        Some(Err(err)) => {
                            self.scope.cancel(err.into());
                            return;
                        }
                        None => return,
                    }
                }
            }
        }
    }
}

/// Closes the caller's channel and drops whatever is queued, without waiting.
fn discard_input(audio: &mut mpsc::Receiver<Vec<u8>>) {
    audio.close();
    while audio.try_recv().is_ok() {}
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
