#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
};
use tokio::sync::mpsc;
use volc_speech_tokio_client::{
    error::{TokenError, TransportError},
    token::{Clock, IssuedToken, TokenIssuer},
    transport::{
        ConnectRequest, Connector, Transport, TransportMessage, TransportSink, TransportSource,
    },
};

/// Server side of an in-memory transport.
pub struct Peer {
    pub to_client: mpsc::UnboundedSender<Result<TransportMessage, TransportError>>,
    pub from_client: mpsc::UnboundedReceiver<TransportMessage>,
    pub counters: Counters,
}

#[derive(Clone, Default)]
pub struct Counters {
    pub reads: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    pub fail_writes: Arc<AtomicBool>,
    pub requests: Arc<Mutex<Vec<ConnectRequest>>>,
}

impl Counters {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Peer {
    pub fn send(&self, message: TransportMessage) {
        self.to_client.send(Ok(message)).unwrap();
    }

    pub fn fail(&self, error: TransportError) {
        self.to_client.send(Err(error)).unwrap();
    }
}

pub struct MemoryConnector {
    transport: Mutex<Option<Transport>>,
    counters: Counters,
}

#[async_trait::async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, request: ConnectRequest) -> Result<Transport, TransportError> {
        self.counters.requests.lock().unwrap().push(request);
        self.transport
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| TransportError::Connect("already connected".to_string()))
    }
}

struct MemorySink {
    tx: mpsc::UnboundedSender<TransportMessage>,
    counters: Counters,
}

#[async_trait::async_trait]
impl TransportSink for MemorySink {
    async fn send(&mut self, message: TransportMessage) -> Result<(), TransportError> {
        if self.counters.fail_writes.load(Ordering::SeqCst) {
            return Err(TransportError::Write("broken pipe".to_string()));
        }
        self.tx
            .send(message)
            .map_err(|_| TransportError::Write("peer gone".to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MemorySource {
    rx: mpsc::UnboundedReceiver<Result<TransportMessage, TransportError>>,
    counters: Counters,
}

#[async_trait::async_trait]
impl TransportSource for MemorySource {
    async fn recv(&mut self) -> Option<Result<TransportMessage, TransportError>> {
        self.counters.reads.fetch_add(1, Ordering::SeqCst);
        self.rx.recv().await
    }
}

pub fn memory_pair() -> (MemoryConnector, Peer) {
    let (to_client, client_rx) = mpsc::unbounded_channel();
    let (client_tx, from_client) = mpsc::unbounded_channel();
    let counters = Counters::default();

    let transport = Transport {
        sink: Box::new(MemorySink {
            tx: client_tx,
            counters: counters.clone(),
        }),
        source: Box::new(MemorySource {
            rx: client_rx,
            counters: counters.clone(),
        }),
    };

    (
        MemoryConnector {
            transport: Mutex::new(Some(transport)),
            counters: counters.clone(),
        },
        Peer {
            to_client,
            from_client,
            counters,
        },
    )
}

/// Clock that only moves when told to.
#[derive(Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn at(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Issuer returning scripted results and counting calls.
pub struct FakeIssuer {
    pub calls: AtomicUsize,
    results: Mutex<Vec<Result<IssuedToken, TokenError>>>,
}

impl FakeIssuer {
    pub fn new(results: Vec<Result<IssuedToken, TokenError>>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            results: Mutex::new(results),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TokenIssuer for FakeIssuer {
    async fn issue(&self, _app_key: &str, _expiration_secs: i64) -> Result<IssuedToken, TokenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            return Err(TokenError::Http("no scripted result".to_string()));
        }
        results.remove(0)
    }
}

pub fn issued(token: &str, expires_at: i64) -> Result<IssuedToken, TokenError> {
    Ok(IssuedToken {
        token: token.to_string(),
        expires_at,
    })
}

/// Serves `router` on an ephemeral local port.
pub async fn serve(router: axum::Router) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
