mod common;

use common::{FakeIssuer, Peer, memory_pair};
use std::{
    sync::{Arc, Mutex, atomic::Ordering},
    time::Duration,
};
use tokio::sync::mpsc;
use volc_speech::{
    envelope::{
        AudioInfo, ControlRequest, ControlResponse, Frontend, FrontendMessage, SynthesisRequest,
        VoiceConversionRequest, Word,
    },
    frame::{CompressionMethod, Frame, FrameBody, FrameCodec, gzip_decompress},
    server_error::{ServerError, ServerErrorCode},
};
use volc_speech_tokio_client::{
    OpenApiConfig, SessionError, SessionOptions, StartupError, SynthesisConfig, TransportError,
    VoiceConversionConfig,
    protocol::{SynthesisProtocol, VoiceConversionProtocol},
    session::{SessionEvent, SessionState, StreamSession},
    token::TokenCache,
    transport::TransportMessage,
};

const RUN_LIMIT: Duration = Duration::from_secs(5);

fn vc_protocol() -> Arc<VoiceConversionProtocol> {
    let config = VoiceConversionConfig::new(OpenApiConfig::new("ak", "sk"), "app-key");
    let tokens = Arc::new(TokenCache::new(Arc::new(FakeIssuer::new(Vec::new()))));
    tokens.set_token("tkn", i64::MAX / 2);

    let request = VoiceConversionRequest {
        speaker: "zh_female_qingxin".to_string(),
        audio_info: AudioInfo::s16le(16000, 1),
        audio_config: AudioInfo::s16le(24000, 1),
        extra: None,
    };

    Arc::new(VoiceConversionProtocol::new(config, request, tokens))
}

fn tts_protocol() -> Arc<SynthesisProtocol> {
    let mut config = SynthesisConfig::new("app-1", "secret-token");
    config.cluster = "volcano_tts".to_string();

    let mut request = SynthesisRequest::default();
    request.audio.voice_type = "BV001_streaming".to_string();
    request.request.text = "hello".to_string();

    Arc::new(SynthesisProtocol::new(config, request))
}

fn envelope(event: &str) -> TransportMessage {
    TransportMessage::Text(format!(
        r#"{{"task_id":"t-1","event":"{event}","status_code":20000000,"status_text":"OK"}}"#
    ))
}

fn frame(frame: Frame) -> TransportMessage {
    TransportMessage::Binary(FrameCodec::encode(&frame).unwrap())
}

fn fast_options() -> SessionOptions {
    SessionOptions::default().with_keepalive_interval(Duration::from_secs(60))
}

/// Echoes every audio chunk back and finishes on `FinishTask`. Returns the
/// sizes of the chunks it received.
fn spawn_echo_server(mut peer: Peer) -> tokio::task::JoinHandle<(Vec<usize>, ControlRequest)> {
    tokio::spawn(async move {
        let start = match peer.from_client.recv().await {
            Some(TransportMessage::Text(text)) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected StartTask, got {other:?}"),
        };
        peer.send(envelope("TaskStarted"));

        let mut chunks = Vec::new();
        while let Some(message) = peer.from_client.recv().await {
            match message {
                TransportMessage::Binary(chunk) => {
                    chunks.push(chunk.len());
                    peer.send(TransportMessage::Binary(chunk));
                }
                TransportMessage::Text(text) => {
                    let finish: ControlRequest = serde_json::from_str(&text).unwrap();
                    assert_eq!(finish.event, "FinishTask");
                    peer.send(envelope("TaskFinished"));
                    break;
                }
                TransportMessage::Ping(_) => continue,
                other => panic!("unexpected {other:?}"),
            }
        }

        (chunks, start)
    })
}

#[tokio::test]
async fn voice_conversion_streams_chunks_and_finishes() {
    let (connector, peer) = memory_pair();
    let counters = peer.counters.clone();
    let server = spawn_echo_server(peer);

    let session = StreamSession::open(&connector, vc_protocol(), fast_options())
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::AwaitingStart);

    let (tx, rx) = mpsc::channel(8);
    tx.send(vec![1u8; 5000]).await.unwrap();
    tx.send(vec![2u8; 1200]).await.unwrap();
    drop(tx);

    let mut events = Vec::new();
    tokio::time::timeout(RUN_LIMIT, session.run(Some(rx), |event| events.push(event)))
        .await
        .expect("session hung")
        .unwrap();

    let (chunks, start) = server.await.unwrap();
    assert_eq!(chunks, vec![3200, 3000]);

    assert_eq!(start.event, "StartTask");
    assert_eq!(start.token, "tkn");
    assert_eq!(start.appkey, "app-key");
    assert_eq!(start.namespace, "VoiceConversionStream");
    let payload: serde_json::Value = serde_json::from_str(start.payload.as_deref().unwrap()).unwrap();
    assert_eq!(payload["speaker"], "zh_female_qingxin");
    assert_eq!(payload["audio_info"]["sample_rate"], 16000);

    let audio: Vec<usize> = events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Audio(audio) => Some(audio.len()),
            _ => None,
        })
        .collect();
    assert_eq!(audio, vec![3200, 3000]);

    match events.last() {
        Some(SessionEvent::Status(status)) => assert!(status.is_finished()),
        other => panic!("expected final status, got {other:?}"),
    }

    assert_eq!(counters.closes(), 1);
    let requests = counters.requests.lock().unwrap();
    assert_eq!(requests[0].url, "wss://sami.bytedance.com/api/v1/ws");
}

#[tokio::test]
async fn state_handler_sees_every_transition_in_order() {
    let (connector, peer) = memory_pair();
    let _server = spawn_echo_server(peer);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut session = StreamSession::new(vc_protocol(), fast_options());
    {
        let seen = seen.clone();
        session.set_state_change_handler(move |state| seen.lock().unwrap().push(state));
    }

    session.start(&connector).await.unwrap();

    let (tx, rx) = mpsc::channel(1);
    tx.send(vec![0u8; 100]).await.unwrap();
    drop(tx);

    tokio::time::timeout(RUN_LIMIT, session.run(Some(rx), |_| {}))
        .await
        .expect("session hung")
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            SessionState::AwaitingStart,
            SessionState::Streaming,
            SessionState::Draining,
            SessionState::Finished,
        ]
    );
}

#[tokio::test]
async fn synthesis_delivers_audio_and_timestamps_until_final_frame() {
    let (connector, mut peer) = memory_pair();

    let frontend = Frontend {
        words: vec![Word {
            word: "hello".to_string(),
            start_time: 0.0,
            end_time: 0.4,
            ..Default::default()
        }],
        phonemes: Vec::new(),
    };

    peer.send(frame(Frame::audio_ack()));
    peer.send(frame(Frame::audio(1, b"first".to_vec())));
    peer.send(frame(Frame::frontend(
        FrontendMessage {
            duration: Some("400".to_string()),
            frontend: Some(frontend.clone()),
        },
        CompressionMethod::Gzip,
    )));
    peer.send(frame(Frame::audio(-2, b"last".to_vec())));

    let session = StreamSession::open(&connector, tts_protocol(), fast_options())
        .await
        .unwrap();

    let mut events = Vec::new();
    tokio::time::timeout(RUN_LIMIT, session.run(None, |event| events.push(event)))
        .await
        .expect("session hung")
        .unwrap();

    assert_eq!(
        events,
        vec![
            SessionEvent::Audio(b"first".to_vec()),
            SessionEvent::Timestamps(frontend),
            SessionEvent::Audio(b"last".to_vec()),
        ]
    );

    // The start request is a gzip JSON full client request.
    let request = match peer.from_client.recv().await {
        Some(TransportMessage::Binary(bytes)) => bytes,
        other => panic!("expected request frame, got {other:?}"),
    };
    assert_eq!(&request[..4], &[0x11, 0x10, 0x11, 0x00]);

    let decoded = FrameCodec::decode(&request).unwrap();
    let FrameBody::ClientRequest { payload } = decoded.body else {
        panic!("expected client request body");
    };
    let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(json["app"]["appid"], "app-1");
    assert_eq!(json["app"]["cluster"], "volcano_tts");
    assert_eq!(json["request"]["operation"], "submit");
    assert_eq!(json["request"]["text"], "hello");
    assert!(!json["request"]["reqid"].as_str().unwrap().is_empty());

    // Raw gzip, not just a passthrough.
    let length = u32::from_be_bytes([request[4], request[5], request[6], request[7]]) as usize;
    assert_eq!(gzip_decompress(&request[8..8 + length]).unwrap(), payload);

    let requests = peer.counters.requests.lock().unwrap();
    assert_eq!(
        requests[0].headers,
        vec![(
            "Authorization".to_string(),
            "Bearer;secret-token".to_string()
        )]
    );
    assert_eq!(requests[0].url, "wss://openspeech.bytedance.com/api/v1/tts/ws_binary");
}

#[tokio::test]
async fn acknowledgement_carrying_audio_is_delivered_first() {
    let (connector, peer) = memory_pair();

    peer.send(frame(Frame::audio(1, b"a".to_vec())));
    peer.send(frame(Frame::audio(-1, b"b".to_vec())));

    let session = StreamSession::open(&connector, tts_protocol(), fast_options())
        .await
        .unwrap();

    let mut events = Vec::new();
    tokio::time::timeout(RUN_LIMIT, session.run(None, |event| events.push(event)))
        .await
        .expect("session hung")
        .unwrap();

    assert_eq!(
        events,
        vec![
            SessionEvent::Audio(b"a".to_vec()),
            SessionEvent::Audio(b"b".to_vec()),
        ]
    );
}

#[tokio::test]
async fn error_frame_ends_the_session_without_further_reads() {
    let (connector, peer) = memory_pair();
    let counters = peer.counters.clone();

    peer.send(frame(Frame::audio_ack()));
    peer.send(frame(Frame::error(
        ServerError::new(1107, "speaker not found"),
        CompressionMethod::Gzip,
    )));
    peer.send(frame(Frame::audio(-1, b"never".to_vec())));

    let session = StreamSession::open(&connector, tts_protocol(), fast_options())
        .await
        .unwrap();

    let mut events = Vec::new();
    let result = tokio::time::timeout(RUN_LIMIT, session.run(None, |event| events.push(event)))
        .await
        .expect("session hung");

    match result {
        Err(SessionError::Server(error)) => {
            assert_eq!(error.code, 1107);
            assert_eq!(error.kind(), ServerErrorCode::SpeakerIdNotFound);
            assert_eq!(error.message, "speaker not found");
        }
        other => panic!("expected server error, got {other:?}"),
    }

    assert!(events.is_empty());
    // One read for the acknowledgement, one for the error frame.
    assert_eq!(counters.reads(), 2);
    assert_eq!(counters.closes(), 1);
}

#[tokio::test]
async fn task_failed_envelope_is_a_server_error() {
    let (connector, peer) = memory_pair();

    peer.send(envelope("TaskStarted"));
    peer.send(TransportMessage::Text(
        r#"{"event":"TaskFailed","status_code":45000001,"status_text":"invalid speaker"}"#
            .to_string(),
    ));

    let session = StreamSession::open(&connector, vc_protocol(), fast_options())
        .await
        .unwrap();

    let (_tx, rx) = mpsc::channel::<Vec<u8>>(1);
    let result = tokio::time::timeout(RUN_LIMIT, session.run(Some(rx), |_| {}))
        .await
        .expect("session hung");

    match result {
        Err(SessionError::Server(error)) => {
            assert_eq!(error.code, 45000001);
            assert_eq!(error.message, "invalid speaker");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn receive_failure_with_pending_input_returns_one_error() {
    let (connector, peer) = memory_pair();
    let counters = peer.counters.clone();

    peer.send(envelope("TaskStarted"));
    peer.fail(TransportError::Read("connection reset".to_string()));

    let session = StreamSession::open(&connector, vc_protocol(), fast_options())
        .await
        .unwrap();

    // The caller never closes its channel.
    let (tx, rx) = mpsc::channel(4);
    tx.send(vec![0u8; 10]).await.unwrap();

    let result = tokio::time::timeout(RUN_LIMIT, session.run(Some(rx), |_| {}))
        .await
        .expect("session blocked on pending input");

    match result {
        Err(SessionError::Transport(TransportError::Read(message))) => {
            assert_eq!(message, "connection reset");
        }
        other => panic!("expected read error, got {other:?}"),
    }

    assert!(tx.is_closed());
    assert_eq!(counters.closes(), 1);
}

#[tokio::test]
async fn write_failure_ends_the_session() {
    let (connector, peer) = memory_pair();
    let counters = peer.counters.clone();

    peer.send(envelope("TaskStarted"));

    let session = StreamSession::open(&connector, vc_protocol(), fast_options())
        .await
        .unwrap();
    counters.fail_writes.store(true, Ordering::SeqCst);

    let (tx, rx) = mpsc::channel(4);
    tx.send(vec![0u8; 4000]).await.unwrap();

    let result = tokio::time::timeout(RUN_LIMIT, session.run(Some(rx), |_| {}))
        .await
        .expect("session hung");

    assert!(matches!(
        result,
        Err(SessionError::Transport(TransportError::Write(_)))
    ));
    drop(peer);
}

#[tokio::test]
async fn peer_closing_mid_stream_is_a_transport_error() {
    let (connector, peer) = memory_pair();

    peer.send(envelope("TaskStarted"));
    peer.send(TransportMessage::Close);

    let session = StreamSession::open(&connector, vc_protocol(), fast_options())
        .await
        .unwrap();

    let (_tx, rx) = mpsc::channel::<Vec<u8>>(1);
    let result = tokio::time::timeout(RUN_LIMIT, session.run(Some(rx), |_| {}))
        .await
        .expect("session hung");

    assert!(matches!(
        result,
        Err(SessionError::Transport(TransportError::Closed))
    ));
}

#[tokio::test]
async fn mismatched_first_event_fails_startup_and_closes() {
    let (connector, peer) = memory_pair();
    let counters = peer.counters.clone();

    peer.send(envelope("TaskFinished"));

    let mut session = StreamSession::new(vc_protocol(), fast_options());
    let result = session.start(&connector).await;

    match result {
        Err(SessionError::Startup(StartupError::UnexpectedEvent { expected, actual })) => {
            assert_eq!(expected, "TaskStarted");
            assert_eq!(actual, "TaskFinished");
        }
        other => panic!("expected startup error, got {other:?}"),
    }

    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(counters.closes(), 1);

    // A failed session can neither restart nor run.
    assert!(session.start(&connector).await.is_err());
    assert!(session.run(None, |_| {}).await.is_err());
}

#[tokio::test]
async fn rejected_synthesis_start_reports_vendor_error() {
    let (connector, peer) = memory_pair();
    let counters = peer.counters.clone();

    peer.send(frame(Frame::error(
        ServerError::new(1001, "bad request"),
        CompressionMethod::None,
    )));

    let result = StreamSession::open(&connector, tts_protocol(), fast_options()).await;

    match result {
        Err(SessionError::Startup(StartupError::Rejected(error))) => {
            assert_eq!(error.kind(), ServerErrorCode::BadRequest);
        }
        Err(other) => panic!("expected rejection, got {other:?}"),
        Ok(_) => panic!("expected rejection"),
    }
    assert_eq!(counters.closes(), 1);
}

#[tokio::test]
async fn text_acknowledgement_for_synthesis_is_unexpected() {
    let (connector, peer) = memory_pair();
    peer.send(envelope("TaskStarted"));

    let result = StreamSession::open(&connector, tts_protocol(), fast_options()).await;

    assert!(matches!(
        result,
        Err(SessionError::Startup(StartupError::UnexpectedMessage("text")))
    ));
}

#[tokio::test]
async fn peer_closing_before_acknowledgement_fails_startup() {
    let (connector, peer) = memory_pair();
    drop(peer);

    let result = StreamSession::open(&connector, vc_protocol(), fast_options()).await;

    assert!(matches!(
        result,
        Err(SessionError::Startup(StartupError::Closed | StartupError::Transport(_)))
    ));
}

#[tokio::test]
async fn connect_failure_fails_startup() {
    let (connector, peer) = memory_pair();
    peer.send(envelope("TaskStarted"));

    // The first session takes the only transport.
    let _first = StreamSession::open(&connector, vc_protocol(), fast_options())
        .await
        .unwrap();

    let mut second = StreamSession::new(vc_protocol(), fast_options());
    let result = second.start(&connector).await;

    assert!(matches!(
        result,
        Err(SessionError::Transport(TransportError::Connect(_)))
    ));
    assert_eq!(second.state(), SessionState::Failed);
}

#[tokio::test]
async fn cancel_handle_stops_a_running_session() {
    let (connector, peer) = memory_pair();
    peer.send(envelope("TaskStarted"));

    let session = StreamSession::open(&connector, vc_protocol(), fast_options())
        .await
        .unwrap();
    let handle = session.cancel_handle();

    let (tx, rx) = mpsc::channel::<Vec<u8>>(1);

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
        handle
    });

    let result = tokio::time::timeout(RUN_LIMIT, session.run(Some(rx), |_| {}))
        .await
        .expect("session ignored cancellation");

    assert!(matches!(result, Err(SessionError::Cancelled)));
    assert!(canceller.await.unwrap().is_cancelled());
    assert!(tx.is_closed());
    drop(peer);
}

#[tokio::test]
async fn cancel_before_acknowledgement_aborts_startup() {
    let (connector, peer) = memory_pair();
    let counters = peer.counters.clone();

    let mut session = StreamSession::new(vc_protocol(), fast_options());
    session.cancel_handle().cancel();

    let result = tokio::time::timeout(RUN_LIMIT, session.start(&connector))
        .await
        .expect("startup ignored cancellation");

    assert!(matches!(result, Err(SessionError::Cancelled)));
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(counters.closes(), 1);
    drop(peer);
}

#[tokio::test]
async fn timeout_ends_a_silent_session_and_pings_meanwhile() {
    let (connector, mut peer) = memory_pair();
    peer.send(envelope("TaskStarted"));

    let options = SessionOptions::default()
        .with_keepalive_interval(Duration::from_millis(10))
        .with_timeout(Duration::from_millis(100));

    let session = StreamSession::open(&connector, vc_protocol(), options)
        .await
        .unwrap();

    let (_tx, rx) = mpsc::channel::<Vec<u8>>(1);
    let result = tokio::time::timeout(RUN_LIMIT, session.run(Some(rx), |_| {}))
        .await
        .expect("timeout not enforced");

    assert!(matches!(result, Err(SessionError::TimedOut)));

    let mut pings = 0;
    while let Ok(message) = peer.from_client.try_recv() {
        if message == TransportMessage::Ping(Vec::new()) {
            pings += 1;
        }
    }
    assert!(pings >= 1, "expected at least one keepalive ping");
}

#[tokio::test]
async fn empty_binary_messages_are_not_delivered() {
    let (connector, peer) = memory_pair();

    peer.send(envelope("TaskStarted"));
    peer.send(TransportMessage::Binary(Vec::new()));
    peer.send(TransportMessage::Pong(Vec::new()));
    peer.send(TransportMessage::Binary(vec![7, 7]));
    peer.send(envelope("TaskFinished"));

    let session = StreamSession::open(&connector, vc_protocol(), fast_options())
        .await
        .unwrap();

    let mut events = Vec::new();
    tokio::time::timeout(RUN_LIMIT, session.run(None, |event| events.push(event)))
        .await
        .expect("session hung")
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0], SessionEvent::Audio(vec![7, 7]));
    assert!(matches!(&events[1], SessionEvent::Status(status) if status.is_finished()));
}

#[tokio::test]
async fn envelope_data_is_delivered_as_audio() {
    let (connector, peer) = memory_pair();

    peer.send(envelope("TaskStarted"));
    peer.send(TransportMessage::Text(
        r#"{"event":"TaskRequest","data":"AAEC"}"#.to_string(),
    ));
    peer.send(envelope("TaskFinished"));

    let session = StreamSession::open(&connector, vc_protocol(), fast_options())
        .await
        .unwrap();

    let mut events = Vec::new();
    tokio::time::timeout(RUN_LIMIT, session.run(None, |event| events.push(event)))
        .await
        .expect("session hung")
        .unwrap();

    assert_eq!(events[0], SessionEvent::Audio(vec![0, 1, 2]));
    assert!(matches!(
        &events[1],
        SessionEvent::Status(ControlResponse { event, .. }) if event == "TaskRequest"
    ));
}

#[tokio::test]
async fn pings_are_sent_while_awaiting_acknowledgement() {
    let (connector, mut peer) = memory_pair();

    let to_client = peer.to_client.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(80)).await;
        to_client.send(Ok(envelope("TaskStarted"))).unwrap();
    });

    let options = SessionOptions::default().with_keepalive_interval(Duration::from_millis(10));
    let session = tokio::time::timeout(
        RUN_LIMIT,
        StreamSession::open(&connector, vc_protocol(), options),
    )
    .await
    .expect("startup hung")
    .unwrap();
    assert_eq!(session.state(), SessionState::AwaitingStart);

    assert!(matches!(
        peer.from_client.try_recv(),
        Ok(TransportMessage::Text(_))
    ));

    let mut pings = 0;
    while let Ok(message) = peer.from_client.try_recv() {
        assert_eq!(message, TransportMessage::Ping(Vec::new()));
        pings += 1;
    }
    assert!(pings >= 1, "expected a keepalive ping before the acknowledgement");
}

#[tokio::test]
async fn failed_ping_while_awaiting_acknowledgement_fails_startup() {
    let (connector, peer) = memory_pair();
    let counters = peer.counters.clone();

    let failing = counters.clone();
    tokio::spawn(async move {
        // Let the start message through, then break the sink.
        tokio::time::sleep(Duration::from_millis(5)).await;
        failing.fail_writes.store(true, Ordering::SeqCst);
    });

    let options = SessionOptions::default().with_keepalive_interval(Duration::from_millis(20));
    let result = tokio::time::timeout(
        RUN_LIMIT,
        StreamSession::open(&connector, vc_protocol(), options),
    )
    .await
    .expect("startup hung");

    assert!(matches!(
        result,
        Err(SessionError::Startup(StartupError::Transport(TransportError::Write(_))))
    ));
    assert_eq!(counters.closes(), 1);
    drop(peer);
}
