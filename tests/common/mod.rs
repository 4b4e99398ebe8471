//! Shared test utilities

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::mpsc as fmpsc;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc};

use vault_node::gateway::{
    Connector, EventFrame, Frame, FrameSink, FrameStream, RequestFrame, ResponseFrame,
};
use vault_node::{
    ClientOptions, DeviceIdentity, Error, GatewayClient, Result, Settings, SharedSettings,
};

/// Upper bound on any single wait for a frame
const FRAME_WAIT: Duration = Duration::from_secs(120);

/// Gateway side of one in-memory connection
pub struct GatewayPeer {
    /// Frames written by the client
    inbound: fmpsc::UnboundedReceiver<String>,
    /// Frames delivered to the client
    outbound: fmpsc::UnboundedSender<String>,
}

impl GatewayPeer {
    /// Next frame written by the client
    pub async fn next_frame(&mut self) -> Frame {
        let text = tokio::time::timeout(FRAME_WAIT, self.inbound.next())
            .await
            .expect("timed out waiting for a client frame")
            .expect("client closed the connection");
        Frame::parse(&text).expect("client sent a malformed frame")
    }

    /// Next frame, which must be a request for `method`
    pub async fn expect_request(&mut self, method: &str) -> RequestFrame {
        match self.next_frame().await {
            Frame::Request(request) if request.method == method => request,
            other => panic!("expected {method} request, got {other:?}"),
        }
    }

    /// Whether the client has written nothing further
    pub fn is_quiet(&mut self) -> bool {
        self.inbound.try_next().is_err()
    }

    pub fn send(&self, frame: &Frame) {
        self.outbound
            .unbounded_send(frame.to_text().unwrap())
            .expect("client side dropped");
    }

    pub fn send_raw(&self, text: &str) {
        self.outbound
            .unbounded_send(text.to_string())
            .expect("client side dropped");
    }

    pub fn event(&self, name: &str, payload: Value) {
        self.send(&Frame::Event(EventFrame {
            event: name.to_string(),
            payload: Some(payload),
            seq: None,
        }));
    }

    pub fn respond(&self, id: &str, payload: Value) {
        self.send(&Frame::Response(ResponseFrame::ok(id, payload)));
    }

    pub fn challenge(&self, nonce: &str) {
        self.event("connect.challenge", json!({ "nonce": nonce, "ts": 0 }));
    }

    /// Challenge, accept the `connect` request and answer hello-ok
    pub async fn pair(&mut self, nonce: &str) -> RequestFrame {
        self.challenge(nonce);
        let connect = self.expect_request("connect").await;
        self.respond(&connect.id, hello_ok(None));
        connect
    }

    /// Close both directions
    pub fn close(self) {
        drop(self);
    }
}

/// Hello-ok payload, optionally issuing a device token
#[must_use]
pub fn hello_ok(device_token: Option<&str>) -> Value {
    let mut hello = json!({
        "type": "hello-ok",
        "protocol": 3,
        "server": { "version": "test", "connId": "conn-1" },
    });
    if let Some(token) = device_token {
        hello["auth"] = json!({
            "deviceToken": token,
            "role": "node",
            "scopes": ["node.invoke"],
        });
    }
    hello
}

/// Connector that hands each connection to the test as a [`GatewayPeer`]
pub struct MemoryConnector {
    peers_tx: mpsc::UnboundedSender<GatewayPeer>,
    peers_rx: Mutex<mpsc::UnboundedReceiver<GatewayPeer>>,
    attempts: AtomicUsize,
    refuse: AtomicBool,
}

impl MemoryConnector {
    #[must_use]
    pub fn new() -> Arc<Self> {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            peers_tx,
            peers_rx: Mutex::new(peers_rx),
            attempts: AtomicUsize::new(0),
            refuse: AtomicBool::new(false),
        })
    }

    /// Wait for the client to open the next connection
    pub async fn accept(&self) -> GatewayPeer {
        tokio::time::timeout(FRAME_WAIT, self.peers_rx.lock().await.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("connector dropped")
    }

    /// Connection attempts so far, refused ones included
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Make subsequent connects fail
    pub fn refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream)> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return Err(Error::Transport(format!("connect to {url} refused")));
        }

        let (client_tx, gateway_rx) = fmpsc::unbounded::<String>();
        let (gateway_tx, client_rx) = fmpsc::unbounded::<String>();

        self.peers_tx
            .send(GatewayPeer {
                inbound: gateway_rx,
                outbound: gateway_tx,
            })
            .map_err(|_| Error::Transport("test dropped the connector".to_string()))?;

        let sink: FrameSink =
            Box::pin(client_tx.sink_map_err(|e| Error::Transport(e.to_string())));
        let stream: FrameStream = Box::pin(client_rx.map(Ok::<String, Error>));
        Ok((sink, stream))
    }
}

/// Settings pointing at the in-memory gateway
#[must_use]
pub fn test_settings() -> Settings {
    Settings {
        gateway_url: "memory://gateway".to_string(),
        gateway_token: Some("static-token".to_string()),
        display_name: "test-node".to_string(),
        ..Settings::default()
    }
}

/// Client over a fresh [`MemoryConnector`]
#[must_use]
pub fn memory_client(
    options: ClientOptions,
    settings: &SharedSettings,
) -> (GatewayClient, Arc<MemoryConnector>) {
    let connector = MemoryConnector::new();
    let client = GatewayClient::new(
        options,
        Arc::new(settings.clone()),
        Arc::new(DeviceIdentity::generate()),
        connector.clone(),
    );
    (client, connector)
}

/// Temporary vault populated with `files` (`path`, `content`)
#[must_use]
pub fn temp_vault(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    for (path, content) in files {
        write_file(dir.path(), path, content);
    }
    dir
}

pub fn write_file(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent");
    }
    std::fs::write(full, content).expect("failed to write file");
}
