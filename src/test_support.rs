//! Fixtures shared by the in-crate tests: scripted transports, a loopback
//! stub server, and WAV files on disk.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tempfile::NamedTempFile;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

use crate::error::ClientError;
use crate::transport::{Connector, Incoming, Transport};

/// What a scripted transport observed from the client.
#[derive(Debug, Default)]
pub struct Recorded {
    pub sent: Vec<Vec<u8>>,
    pub closed: bool,
}

/// Replays `incoming` in order, then stalls forever.
pub struct ScriptedTransport {
    incoming: VecDeque<Incoming>,
    recorded: Arc<Mutex<Recorded>>,
}

impl ScriptedTransport {
    pub fn new(incoming: Vec<Incoming>) -> (Self, Arc<Mutex<Recorded>>) {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let transport = Self {
            incoming: incoming.into(),
            recorded: Arc::clone(&recorded),
        };
        (transport, recorded)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_binary(&mut self, payload: Vec<u8>) -> Result<(), ClientError> {
        self.recorded
            .lock()
            .expect("recorder mutex should lock")
            .sent
            .push(payload);
        Ok(())
    }

    async fn recv(&mut self) -> Result<Incoming, ClientError> {
        match self.incoming.pop_front() {
            Some(incoming) => Ok(incoming),
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) {
        self.recorded
            .lock()
            .expect("recorder mutex should lock")
            .closed = true;
    }
}

enum ConnectBehavior {
    Hand(Mutex<Option<ScriptedTransport>>),
    Refuse,
    Stall,
}

/// Counts connection attempts and hands out at most one scripted transport.
pub struct SpyConnector {
    behavior: ConnectBehavior,
    calls: AtomicUsize,
}

impl SpyConnector {
    pub fn with_transport(transport: ScriptedTransport) -> Self {
        Self {
            behavior: ConnectBehavior::Hand(Mutex::new(Some(transport))),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn refusing() -> Self {
        Self {
            behavior: ConnectBehavior::Refuse,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn stalling() -> Self {
        Self {
            behavior: ConnectBehavior::Stall,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for SpyConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            ConnectBehavior::Hand(slot) => {
                let transport = slot
                    .lock()
                    .expect("connector mutex should lock")
                    .take()
                    .expect("scripted transport handed out twice");
                Ok(Box::new(transport))
            }
            ConnectBehavior::Refuse => Err(ClientError::ConnectRefused {
                url: url.to_owned(),
            }),
            ConnectBehavior::Stall => std::future::pending().await,
        }
    }
}

/// A canonical 16-bit mono 16 kHz WAV: 44-byte header plus `data_len` bytes
/// of patterned samples.
pub fn wav_bytes(data_len: usize) -> Vec<u8> {
    let data_len_u32 = u32::try_from(data_len).expect("fixture fits in a WAV");
    let mut bytes = Vec::with_capacity(44 + data_len);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len_u32).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16_u32.to_le_bytes());
    bytes.extend_from_slice(&1_u16.to_le_bytes());
    bytes.extend_from_slice(&1_u16.to_le_bytes());
    bytes.extend_from_slice(&16_000_u32.to_le_bytes());
    bytes.extend_from_slice(&32_000_u32.to_le_bytes());
    bytes.extend_from_slice(&2_u16.to_le_bytes());
    bytes.extend_from_slice(&16_u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len_u32.to_le_bytes());
    bytes.extend((0..data_len).map(|index| u8::try_from(index % 251).expect("below 251")));
    bytes
}

pub fn wav_file(data_len: usize) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".wav")
        .tempfile()
        .expect("create temp wav");
    file.write_all(&wav_bytes(data_len))
        .expect("write temp wav");
    file.flush().expect("flush temp wav");
    file
}

pub async fn loopback_listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");
    (listener, format!("ws://{addr}/ws"))
}

/// URL of a loopback port with nothing listening on it.
pub async fn refused_url() -> String {
    let (listener, url) = loopback_listener().await;
    drop(listener);
    url
}

pub async fn accept_one(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (tcp, _) = listener.accept().await.expect("accept tcp");
    accept_async(tcp).await.expect("websocket handshake")
}

/// Behavior of the loopback stub server for one connection.
pub struct StubScript {
    pub greeting: Option<Message>,
    pub replies: Vec<Message>,
    pub close_after_replies: bool,
}

impl StubScript {
    pub fn texts(greeting: &str, replies: &[&str]) -> Self {
        Self {
            greeting: Some(Message::text(greeting.to_owned())),
            replies: replies
                .iter()
                .map(|reply| Message::text((*reply).to_owned()))
                .collect(),
            close_after_replies: false,
        }
    }
}

/// What the stub server observed from the client.
#[derive(Debug, Default)]
pub struct StubReport {
    pub upload: Option<Message>,
    /// Data messages the client sent after the upload.
    pub trailing: Vec<Message>,
}

/// Serve one client: greet, wait for the upload, send the replies, then
/// record anything else the client sends until the connection ends.
pub async fn spawn_stub_server(script: StubScript) -> (String, JoinHandle<StubReport>) {
    let (listener, url) = loopback_listener().await;
    let handle = tokio::spawn(async move {
        let mut ws = accept_one(&listener).await;
        let mut report = StubReport::default();

        if let Some(greeting) = script.greeting {
            ws.send(greeting).await.expect("send greeting");
        }

        while let Some(Ok(message)) = ws.next().await {
            if message.is_text() || message.is_binary() {
                report.upload = Some(message);
                break;
            }
        }
        if report.upload.is_none() {
            return report;
        }

        for reply in script.replies {
            ws.send(reply).await.expect("send reply");
        }
        if script.close_after_replies {
            let _ = ws.close(None).await;
        }

        while let Some(Ok(message)) = ws.next().await {
            if message.is_text() || message.is_binary() {
                report.trailing.push(message);
            }
        }
        report
    });
    (url, handle)
}
