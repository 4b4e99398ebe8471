//! Gateway connection state machine
//!
//! A [`GatewayClient`] owns at most one live transport link. Each link runs
//! on its own task which performs the challenge/`connect` handshake, routes
//! responses to waiting callers and republishes pushes as [`GatewayEvent`]s.
//!
//! ```text
//! disconnected --connect()--> connecting --socket open--> connected
//! connected --hello ok--> paired
//! connected --hello rejected--> disconnected (no reconnect)
//! connected|paired --socket drop--> disconnected --backoff--> connecting
//! any --disconnect()--> disconnected
//! ```

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::Instant;

use super::backoff::ReconnectPolicy;
use super::chat::{CHAT_EVENT, ChatEvent};
use super::events::{ConnectionState, GatewayError, GatewayEvent};
use super::frame::{EventFrame, Frame, RequestFrame, ResponseFrame};
use super::handshake::{
    CHALLENGE_EVENT, CONNECT_METHOD, HandshakeState, HelloOk, NodeAdvert, build_connect_params,
};
use super::pending::{PendingRequests, Reply};
use super::transport::{Connector, WsConnector};
use crate::config::SettingsProvider;
use crate::nodes::types::{INVOKE_METHOD, INVOKE_REQUEST_EVENT, InvokeRequest};
use crate::security::{ConnectRole, DeviceSigner};
use crate::{Error, Result};

/// Time to wait for `connect.challenge` before sending the handshake anyway
pub const DEFAULT_CHALLENGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-request deadline, also applied to the handshake response
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const EVENT_CAPACITY: usize = 256;

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Connection options fixed for the life of a client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub role: ConnectRole,
    pub challenge_timeout: Duration,
    pub request_timeout: Duration,
    pub reconnect: ReconnectPolicy,
    pub auto_reconnect: bool,
    /// Commands announced by node-role connections
    pub node: Option<NodeAdvert>,
}

impl ClientOptions {
    /// Defaults for a role
    #[must_use]
    pub fn new(role: ConnectRole) -> Self {
        Self {
            role,
            challenge_timeout: DEFAULT_CHALLENGE_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            reconnect: ReconnectPolicy::default(),
            auto_reconnect: true,
            node: None,
        }
    }

    /// Node-role options announcing `commands`
    #[must_use]
    pub fn node(commands: Vec<String>) -> Self {
        Self {
            node: Some(NodeAdvert { commands }),
            ..Self::new(ConnectRole::Node)
        }
    }

    /// Operator-role options
    #[must_use]
    pub fn operator() -> Self {
        Self::new(ConnectRole::Operator)
    }
}

/// Handle to one logical Gateway connection
///
/// Cheap to clone; all clones share the same link.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<Inner>,
}

struct Inner {
    options: ClientOptions,
    settings: Arc<dyn SettingsProvider>,
    signer: Arc<dyn DeviceSigner>,
    connector: Arc<dyn Connector>,
    state: watch::Sender<ConnectionState>,
    events: broadcast::Sender<GatewayEvent>,
    pending: Mutex<PendingRequests>,
    link: Mutex<Option<Link>>,
    generation: AtomicU64,
    attempt: AtomicU32,
    last_error: Mutex<Option<String>>,
    rejection: Mutex<Option<GatewayError>>,
}

/// Live transport of one connection attempt
struct Link {
    generation: u64,
    outbound: Option<mpsc::UnboundedSender<String>>,
    shutdown: Option<oneshot::Sender<()>>,
}

/// Why a link ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// `disconnect()` was called
    Closed,
    /// Transport failed or the peer went away
    Dropped,
    /// Handshake was refused; reconnecting would fail the same way
    Rejected,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-unique request id that stays unique across reconnects
fn next_request_id() -> String {
    let seq = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{seq}", chrono::Utc::now().timestamp_millis())
}

impl GatewayClient {
    /// Create a disconnected client
    #[must_use]
    pub fn new(
        options: ClientOptions,
        settings: Arc<dyn SettingsProvider>,
        signer: Arc<dyn DeviceSigner>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                options,
                settings,
                signer,
                connector,
                state,
                events,
                pending: Mutex::new(PendingRequests::new()),
                link: Mutex::new(None),
                generation: AtomicU64::new(0),
                attempt: AtomicU32::new(0),
                last_error: Mutex::new(None),
                rejection: Mutex::new(None),
            }),
        }
    }

    /// Create a disconnected client over WebSocket
    #[must_use]
    pub fn websocket(
        options: ClientOptions,
        settings: Arc<dyn SettingsProvider>,
        signer: Arc<dyn DeviceSigner>,
    ) -> Self {
        Self::new(options, settings, signer, Arc::new(WsConnector::default()))
    }

    /// Open the transport and start the handshake
    ///
    /// No-op while a link is connecting, connected or paired. Must be called
    /// from within a tokio runtime.
    pub fn connect(&self) {
        let mut link = lock(&self.inner.link);
        if link.is_some() {
            return;
        }
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        *link = Some(Link {
            generation,
            outbound: None,
            shutdown: Some(shutdown_tx),
        });
        *lock(&self.inner.rejection) = None;

        tracing::debug!(generation, role = %self.inner.options.role, "connect requested");
        // Published before the task can move past it
        self.inner.set_state(ConnectionState::Connecting);
        tokio::spawn(run_connection(
            Arc::clone(&self.inner),
            generation,
            shutdown_rx,
        ));
    }

    /// Close the link on purpose
    ///
    /// Suppresses reconnect (including one already scheduled), rejects every
    /// pending request with `Error::ConnectionClosed` and moves to
    /// `Disconnected`.
    pub fn disconnect(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);

        let link = {
            let mut guard = lock(&self.inner.link);
            self.inner.set_state(ConnectionState::Disconnected);
            guard.take()
        };
        if let Some(mut link) = link {
            if let Some(shutdown) = link.shutdown.take() {
                let _ = shutdown.send(());
            }
            tracing::info!(role = %self.inner.options.role, "disconnected from gateway");
        }

        let rejected = lock(&self.inner.pending).reject_all();
        if rejected > 0 {
            tracing::debug!(rejected, "rejected pending requests on disconnect");
        }
    }

    /// Send a request and wait for its response frame
    ///
    /// Fails fast with `Error::NotConnected` when no socket is open; nothing
    /// is queued. Business methods should wait for `Paired` first.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected`, `Error::RequestTimeout` after the
    /// request deadline, or `Error::ConnectionClosed` if the link is torn
    /// down while waiting
    pub async fn request(&self, method: &str, params: Option<Value>) -> Result<ResponseFrame> {
        let (generation, outbound) = self.inner.outbound().ok_or(Error::NotConnected)?;

        let id = next_request_id();
        let text = Frame::Request(RequestFrame {
            id: id.clone(),
            method: method.to_string(),
            params,
        })
        .to_text()?;

        let rx = self.inner.register(&id, generation)?;
        if outbound.send(text).is_err() {
            lock(&self.inner.pending).remove(&id);
            return Err(Error::NotConnected);
        }
        tracing::debug!(%method, %id, "request sent");

        match tokio::time::timeout(self.inner.options.request_timeout, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                lock(&self.inner.pending).remove(&id);
                tracing::debug!(%method, %id, "request timed out");
                Err(Error::RequestTimeout(method.to_string()))
            }
        }
    }

    /// Send a request and return its payload
    ///
    /// # Errors
    ///
    /// Same as [`request`](Self::request), plus `Error::Gateway` when the
    /// response has `ok: false`
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value> {
        self.request(method, params).await?.into_result()
    }

    /// Wait until the handshake is accepted
    ///
    /// # Errors
    ///
    /// Returns `Error::HandshakeRejected` if the Gateway refuses the
    /// handshake, or `Error::RequestTimeout` when `timeout` elapses first
    pub async fn wait_until_paired(&self, timeout: Duration) -> Result<()> {
        let mut rx = self.inner.state.subscribe();
        let inner = Arc::clone(&self.inner);
        let waited = tokio::time::timeout(timeout, async {
            rx.wait_for(|state| {
                *state == ConnectionState::Paired || lock(&inner.rejection).is_some()
            })
            .await
            .map(|_| ())
        })
        .await;

        if let Some(rejection) = lock(&self.inner.rejection).clone() {
            return Err(Error::HandshakeRejected {
                code: rejection.code,
                message: rejection.message,
            });
        }
        match waited {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => Err(Error::RequestTimeout(match self.last_error() {
                Some(last) => format!("pairing ({last})"),
                None => "pairing".to_string(),
            })),
        }
    }

    /// Subscribe to gateway events; drop the receiver to unsubscribe
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.inner.events.subscribe()
    }

    /// Current connection state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Observe state changes
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Text of the most recent transport or protocol error
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        lock(&self.inner.last_error).clone()
    }

    /// Role announced by this client
    #[must_use]
    pub fn role(&self) -> ConnectRole {
        self.inner.options.role
    }

    /// Number of requests awaiting a response
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        lock(&self.inner.pending).len()
    }

    /// Consecutive reconnect attempts since the last successful pairing
    #[must_use]
    pub fn reconnect_attempt(&self) -> u32 {
        self.inner.attempt.load(Ordering::SeqCst)
    }
}

impl Inner {
    fn set_state(&self, next: ConnectionState) {
        let changed = self.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
        if changed {
            tracing::debug!(state = %next, role = %self.options.role, "connection state changed");
            self.emit(GatewayEvent::StateChanged(next));
        }
    }

    fn emit(&self, event: GatewayEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn report_error(&self, code: Option<String>, message: String) {
        tracing::warn!(code = code.as_deref(), %message, role = %self.options.role, "gateway error");
        *lock(&self.last_error) = Some(message.clone());
        self.emit(GatewayEvent::Error(GatewayError { code, message }));
    }

    fn outbound(&self) -> Option<(u64, mpsc::UnboundedSender<String>)> {
        lock(&self.link)
            .as_ref()
            .and_then(|l| Some((l.generation, l.outbound.clone()?)))
    }

    fn is_current(&self, generation: u64) -> bool {
        lock(&self.link)
            .as_ref()
            .is_some_and(|l| l.generation == generation)
    }

    /// Add a pending entry for a request sent on link `generation`
    ///
    /// Teardown takes the link before rejecting pending entries, so an entry
    /// inserted while the link is still current is always rejected with it.
    fn register(&self, id: &str, generation: u64) -> Result<oneshot::Receiver<Reply>> {
        let rx = lock(&self.pending).insert(id)?;
        if !self.is_current(generation) {
            lock(&self.pending).remove(id);
            return Err(Error::ConnectionClosed);
        }
        Ok(rx)
    }

    /// Install the writer channel; false if the link was superseded
    fn attach(&self, generation: u64, outbound: mpsc::UnboundedSender<String>) -> bool {
        match lock(&self.link).as_mut() {
            Some(link) if link.generation == generation => {
                link.outbound = Some(outbound);
                true
            }
            _ => false,
        }
    }

    /// Tear down a link if it is still the current one
    fn teardown(self: &Arc<Self>, generation: u64, outcome: Outcome) {
        {
            let mut link = lock(&self.link);
            match link.as_ref() {
                Some(current) if current.generation == generation => {
                    link.take();
                }
                _ => return,
            }
            // Under the link lock so a racing connect() is not overwritten
            self.set_state(ConnectionState::Disconnected);
        }

        let rejected = lock(&self.pending).reject_all();
        tracing::info!(
            ?outcome,
            rejected,
            role = %self.options.role,
            "gateway connection closed"
        );

        if outcome == Outcome::Dropped && self.options.auto_reconnect {
            self.schedule_reconnect();
        }
    }

    fn schedule_reconnect(self: &Arc<Self>) {
        let attempt = self.attempt.fetch_add(1, Ordering::SeqCst);
        let delay = self.options.reconnect.delay_for_attempt(attempt);
        // Any connect() or disconnect() before the timer fires bumps this
        let generation = self.generation.load(Ordering::SeqCst);

        tracing::info!(
            attempt,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            role = %self.options.role,
            "scheduling reconnect"
        );

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if inner.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!("stale reconnect timer ignored");
                return;
            }
            GatewayClient { inner }.connect();
        });
    }
}

/// Drive one link from open to close
async fn run_connection(inner: Arc<Inner>, generation: u64, mut shutdown: oneshot::Receiver<()>) {
    let settings = inner.settings.snapshot();
    tracing::info!(url = %settings.gateway_url, role = %inner.options.role, "connecting to gateway");

    let opened = tokio::select! {
        _ = &mut shutdown => return,
        opened = inner.connector.connect(&settings.gateway_url) => opened,
    };
    let (mut sink, mut stream) = match opened {
        Ok(pair) => pair,
        Err(e) => {
            inner.report_error(None, e.to_string());
            inner.teardown(generation, Outcome::Dropped);
            return;
        }
    };

    let (outbound, mut queue) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        while let Some(text) = queue.recv().await {
            if let Err(e) = sink.send(text).await {
                tracing::warn!(error = %e, "failed to send frame");
                break;
            }
        }
        let _ = sink.close().await;
    });

    if !inner.attach(generation, outbound.clone()) {
        return;
    }
    inner.set_state(ConnectionState::Connected);

    let mut session = Session {
        inner: Arc::clone(&inner),
        outbound,
        handshake: HandshakeState::new(),
        paired: false,
        debug_frames: settings.debug_frames,
    };
    session.handshake.begin_wait();

    // Challenge wait first, then reused as the hello deadline
    let deadline = tokio::time::sleep(inner.options.challenge_timeout);
    tokio::pin!(deadline);

    let outcome = loop {
        let step = tokio::select! {
            _ = &mut shutdown => break Outcome::Closed,
            () = &mut deadline, if !session.paired => {
                if session.handshake.on_challenge_timeout() {
                    tracing::debug!("no challenge received, sending handshake without nonce");
                    session.send_handshake()
                } else {
                    inner.report_error(Some("TIMEOUT".to_string()), "handshake response timed out".to_string());
                    break Outcome::Dropped;
                }
            }
            message = stream.next() => match message {
                None => break Outcome::Dropped,
                Some(Err(e)) => {
                    // The close that follows drives the transition
                    inner.report_error(None, e.to_string());
                    Step::Continue
                }
                Some(Ok(text)) => session.on_text(&text),
            }
        };

        match step {
            Step::Continue => {}
            Step::HandshakeSent => {
                deadline
                    .as_mut()
                    .reset(Instant::now() + inner.options.request_timeout);
            }
            Step::Stop(outcome) => break outcome,
        }
    };

    session.handshake.reset();
    inner.teardown(generation, outcome);
}

enum Step {
    Continue,
    HandshakeSent,
    Stop(Outcome),
}

/// Per-link frame handling
struct Session {
    inner: Arc<Inner>,
    outbound: mpsc::UnboundedSender<String>,
    handshake: HandshakeState,
    paired: bool,
    debug_frames: bool,
}

impl Session {
    fn send_handshake(&mut self) -> Step {
        let settings = self.inner.settings.snapshot();
        let params = match build_connect_params(
            self.inner.options.role,
            &settings,
            self.inner.signer.as_ref(),
            self.handshake.nonce(),
            self.inner.options.node.as_ref(),
            chrono::Utc::now().timestamp_millis(),
        ) {
            Ok(params) => params,
            Err(e) => {
                self.inner.report_error(None, format!("failed to build handshake: {e}"));
                return Step::Stop(Outcome::Rejected);
            }
        };

        let id = next_request_id();
        let frame = Frame::Request(RequestFrame {
            id: id.clone(),
            method: CONNECT_METHOD.to_string(),
            params: Some(params),
        });
        let sent = frame
            .to_text()
            .ok()
            .is_some_and(|text| self.outbound.send(text).is_ok());
        if !sent {
            self.inner
                .report_error(None, "failed to send handshake".to_string());
            return Step::Stop(Outcome::Dropped);
        }

        tracing::debug!(
            %id,
            with_nonce = self.handshake.nonce().is_some(),
            "handshake sent"
        );
        self.handshake.mark_sent(id);
        Step::HandshakeSent
    }

    fn on_text(&mut self, text: &str) -> Step {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "dropping non-JSON frame");
                return Step::Continue;
            }
        };
        if self.debug_frames {
            self.inner.emit(GatewayEvent::Frame(value.clone()));
        }

        match serde_json::from_value::<Frame>(value) {
            Ok(Frame::Response(response)) => self.on_response(response),
            Ok(Frame::Event(event)) => self.on_event(event),
            Ok(Frame::Request(request)) => {
                self.on_request(request);
                Step::Continue
            }
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed frame");
                Step::Continue
            }
        }
    }

    fn on_response(&mut self, response: ResponseFrame) -> Step {
        if !self.handshake.is_handshake_response(&response.id) {
            // Unknown ids are stale responses from superseded requests
            lock(&self.inner.pending).resolve(response);
            return Step::Continue;
        }
        self.handshake.complete();

        if !response.ok {
            let (code, message) = response.error.map_or_else(
                || (None, "handshake rejected".to_string()),
                |e| (Some(e.code), e.message),
            );
            *lock(&self.inner.rejection) = Some(GatewayError {
                code: code.clone(),
                message: message.clone(),
            });
            self.inner.report_error(code, message);
            return Step::Stop(Outcome::Rejected);
        }

        let hello = HelloOk::from_payload(response.payload.as_ref());
        self.paired = true;
        self.inner.attempt.store(0, Ordering::SeqCst);
        *lock(&self.inner.last_error) = None;
        tracing::info!(
            protocol = hello.protocol,
            role = %self.inner.options.role,
            "paired with gateway"
        );
        self.inner.set_state(ConnectionState::Paired);

        if let Some(token) = hello.issued_token() {
            tracing::info!(role = token.role.as_deref(), "gateway issued device token");
            self.inner.emit(GatewayEvent::DeviceToken(token));
        }
        Step::Continue
    }

    fn on_event(&mut self, event: EventFrame) -> Step {
        match event.event.as_str() {
            CHALLENGE_EVENT => {
                let nonce = event
                    .payload
                    .as_ref()
                    .and_then(|p| p.get("nonce"))
                    .and_then(Value::as_str);
                match nonce {
                    Some(nonce) if self.handshake.on_challenge(nonce) => self.send_handshake(),
                    Some(_) => {
                        tracing::debug!("late challenge ignored");
                        Step::Continue
                    }
                    None => {
                        tracing::debug!("challenge without nonce ignored");
                        Step::Continue
                    }
                }
            }
            INVOKE_REQUEST_EVENT => {
                if let Some(request) = event.payload.and_then(InvokeRequest::from_value) {
                    self.inner.emit(GatewayEvent::InvokeRequest(request));
                }
                Step::Continue
            }
            CHAT_EVENT => {
                if let Some(chat) = event.payload.and_then(ChatEvent::from_value) {
                    self.inner.emit(GatewayEvent::Chat(chat));
                }
                Step::Continue
            }
            other => {
                tracing::trace!(event = other, "ignoring event");
                Step::Continue
            }
        }
    }

    fn on_request(&self, request: RequestFrame) {
        if request.method != INVOKE_METHOD {
            tracing::debug!(method = %request.method, "ignoring server request");
            return;
        }
        if let Some(invoke) = request.params.and_then(InvokeRequest::from_value) {
            self.inner.emit(GatewayEvent::InvokeRequest(invoke));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, SharedSettings};
    use crate::security::DeviceIdentity;

    #[test]
    fn test_request_ids_unique() {
        let a = next_request_id();
        let b = next_request_id();
        assert_ne!(a, b);
        assert!(a.contains('-'));
    }

    fn idle_client() -> GatewayClient {
        GatewayClient::new(
            ClientOptions::operator(),
            Arc::new(SharedSettings::new(Settings::default())),
            Arc::new(DeviceIdentity::generate()),
            Arc::new(WsConnector::default()),
        )
    }

    fn install_link(client: &GatewayClient, generation: u64) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        *lock(&client.inner.link) = Some(Link {
            generation,
            outbound: Some(tx),
            shutdown: None,
        });
        rx
    }

    #[test]
    fn test_register_on_current_link() {
        let client = idle_client();
        let _rx = install_link(&client, 3);
        let (generation, _) = client.inner.outbound().unwrap();
        assert_eq!(generation, 3);

        let reply = client.inner.register("a", generation);
        assert!(reply.is_ok());
        assert!(lock(&client.inner.pending).contains("a"));
    }

    #[test]
    fn test_register_after_teardown_fails_fast() {
        let client = idle_client();
        let _rx = install_link(&client, 3);
        let (generation, _) = client.inner.outbound().unwrap();

        // Link torn down between taking the sender and registering
        lock(&client.inner.link).take();
        assert_eq!(lock(&client.inner.pending).reject_all(), 0);
        let err = client.inner.register("a", generation).unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
        assert_eq!(lock(&client.inner.pending).len(), 0);

        // A newer link does not revive a request bound to the old one
        let _rx = install_link(&client, 4);
        let err = client.inner.register("b", generation).unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
        assert!(!lock(&client.inner.pending).contains("b"));
    }

    #[test]
    fn test_options_per_role() {
        let node = ClientOptions::node(vec!["obsidian.note.read".to_string()]);
        assert_eq!(node.role, ConnectRole::Node);
        assert!(node.auto_reconnect);
        assert_eq!(node.node.unwrap().commands.len(), 1);

        let operator = ClientOptions::operator();
        assert_eq!(operator.role, ConnectRole::Operator);
        assert!(operator.node.is_none());
        assert_eq!(operator.challenge_timeout, DEFAULT_CHALLENGE_TIMEOUT);
    }
}
