#![expect(
    clippy::module_name_repetitions,
    reason = "Connection types expose their domain in the name for clarity"
)]

use std::future::pending;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use backoff::backoff::Backoff as _;
use futures::stream::SplitSink;
use futures::{SinkExt as _, StreamExt as _};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until, timeout};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use url::Url;

use super::config::Config;
use super::dispatcher::ObserverRegistry;
use super::error::WsError;
use super::event::{ABNORMAL_CLOSURE, CloseInfo, Event, NORMAL_CLOSURE};
use super::frame::Frame;
use super::retry::CappedBackoff;
use crate::types::request::Command as WireCommand;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// Close code browsers report when a close frame carried no status.
const NO_STATUS_RECEIVED: u16 = 1005;
const CLIENT_CLOSE_REASON: &str = "Closed by client";
const PONG_FRAME: &str = r#"{"type":"pong"}"#;

/// Lifecycle state of the client.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Constructed, no transport opened yet
    Idle,
    /// A transport is being opened
    Connecting,
    /// The transport is open and `send` is legal
    Open,
    /// A client-initiated close is in progress
    Closing,
    /// No transport; a retry may be scheduled
    Closed,
}

impl ClientState {
    /// Check if the connection is currently open.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Requests from [`Client`](super::Client) handles to the connection task.
#[derive(Debug)]
pub(crate) enum Command {
    Connect,
    Disconnect,
    Send(String),
}

/// Something that happened to a transport, tagged with the generation of the
/// transport it belongs to.
enum TransportEvent {
    Opened { generation: u64, stream: WsStream },
    OpenFailed { generation: u64, error: WsError },
    Text { generation: u64, text: String },
    Closed { generation: u64, close: CloseInfo },
}

/// An outstanding liveness probe.
#[derive(Debug, Clone, Copy)]
struct PendingProbe {
    sent_at: Instant,
    deadline: Instant,
}

/// State shared between the connection task and client handles.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    pub(crate) manual_disconnect: AtomicBool,
    pub(crate) attempts: AtomicU32,
}

/// Owns the transport and every timer, and reacts to commands, transport
/// events and timer expiries one at a time.
///
/// Each transport is tagged with a generation number. Events from a
/// transport that is no longer current are dropped, so a superseded socket
/// can never deliver messages after a reconnect.
pub(crate) struct ConnectionManager {
    endpoint: String,
    config: Config,
    observers: ObserverRegistry,
    shared: Arc<Shared>,
    state: ClientState,
    state_tx: watch::Sender<ClientState>,
    backoff: CappedBackoff,
    generation: u64,
    transport_tx: mpsc::UnboundedSender<TransportEvent>,
    opening: Option<JoinHandle<()>>,
    writer: Option<WsSink>,
    reader: Option<JoinHandle<()>>,
    heartbeat: Option<Interval>,
    probe: Option<PendingProbe>,
    reconnect_at: Option<Instant>,
}

impl ConnectionManager {
    /// Spawn the connection task and return the channel used to drive it.
    ///
    /// The task exits, closing any open transport, once every sender for the
    /// returned channel has been dropped.
    pub(crate) fn spawn(
        endpoint: String,
        config: Config,
        observers: ObserverRegistry,
        shared: Arc<Shared>,
        state_tx: watch::Sender<ClientState>,
    ) -> mpsc::UnboundedSender<Command> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (manager, transport_rx) = Self::new(endpoint, config, observers, shared, state_tx);

        tokio::spawn(manager.run(command_rx, transport_rx));

        command_tx
    }

    fn new(
        endpoint: String,
        config: Config,
        observers: ObserverRegistry,
        shared: Arc<Shared>,
        state_tx: watch::Sender<ClientState>,
    ) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (transport_tx, transport_rx) = mpsc::unbounded_channel();

        let manager = Self {
            endpoint,
            backoff: config.reconnect.clone().into(),
            config,
            observers,
            shared,
            state: ClientState::Idle,
            state_tx,
            generation: 0,
            transport_tx,
            opening: None,
            writer: None,
            reader: None,
            heartbeat: None,
            probe: None,
            reconnect_at: None,
        };

        (manager, transport_rx)
    }

    /// Main event loop.
    async fn run(
        mut self,
        mut command_rx: mpsc::UnboundedReceiver<Command>,
        mut transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
    ) {
        loop {
            tokio::select! {
                command = command_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    // Every client handle is gone
                    None => break,
                },

                Some(event) = transport_rx.recv() => self.handle_transport_event(event).await,

                () = tick(self.heartbeat.as_mut()) => self.send_probe().await,

                () = wait_until(self.probe.map(|probe| probe.deadline)) => self.on_probe_timeout(),

                () = wait_until(self.reconnect_at) => {
                    self.reconnect_at = None;
                    self.open_transport();
                }
            }
        }

        self.shutdown().await;
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect => {
                self.shared.manual_disconnect.store(false, Ordering::SeqCst);
                // A fresh budget only once the previous one has been spent
                if self.backoff.is_exhausted() {
                    self.backoff.reset();
                    self.publish_attempts();
                }
                self.open_transport();
            }
            Command::Disconnect => self.disconnect().await,
            Command::Send(text) => self.send_text(text).await,
        }
    }

    /// Start opening a new transport unless one is already opening or open,
    /// or the caller has disconnected.
    fn open_transport(&mut self) {
        if matches!(self.state, ClientState::Connecting | ClientState::Open)
            || self.shared.manual_disconnect.load(Ordering::SeqCst)
        {
            return;
        }

        self.reconnect_at = None;
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        self.set_state(ClientState::Connecting);

        #[cfg(feature = "tracing")]
        tracing::debug!(endpoint = %self.endpoint, generation, "Connecting to WebSocket server");

        // Invalid endpoints take the same route as asynchronous connection failures
        let url = match validate_endpoint(&self.endpoint) {
            Ok(url) => url,
            Err(error) => {
                _ = self
                    .transport_tx
                    .send(TransportEvent::OpenFailed { generation, error });
                return;
            }
        };

        let transport_tx = self.transport_tx.clone();
        let connect_timeout = self.config.connect_timeout;
        self.opening = Some(tokio::spawn(async move {
            let event = match timeout(connect_timeout, connect_async(url.as_str())).await {
                Ok(Ok((stream, _))) => TransportEvent::Opened { generation, stream },
                Ok(Err(e)) => TransportEvent::OpenFailed {
                    generation,
                    error: WsError::Connection(e),
                },
                Err(_) => TransportEvent::OpenFailed {
                    generation,
                    error: WsError::ConnectTimeout(connect_timeout),
                },
            };
            _ = transport_tx.send(event);
        }));
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened { generation, stream } => {
                if generation != self.generation || self.state != ClientState::Connecting {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(generation, "Dropping superseded transport");
                    return;
                }
                self.on_open(stream);
            }
            TransportEvent::OpenFailed { generation, error } => {
                if generation != self.generation || self.state != ClientState::Connecting {
                    return;
                }
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %error, "Unable to connect");
                self.opening = None;
                self.set_state(ClientState::Closed);
                self.emit(&Event::error(error));
                self.schedule_reconnect();
            }
            TransportEvent::Text { generation, text } => {
                if generation != self.generation || !self.state.is_open() {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(generation, "Ignoring frame from superseded transport");
                    return;
                }
                self.on_text(text).await;
            }
            TransportEvent::Closed { generation, close } => {
                if generation != self.generation || !self.state.is_open() {
                    return;
                }
                self.on_close(close);
            }
        }
    }

    fn on_open(&mut self, stream: WsStream) {
        let (writer, mut read) = stream.split();
        let transport_tx = self.transport_tx.clone();
        let generation = self.generation;

        let reader = tokio::spawn(async move {
            let close = loop {
                match read.next().await {
                    Some(Ok(Message::Text(text))) => {
                        let event = TransportEvent::Text {
                            generation,
                            text: text.to_string(),
                        };
                        if transport_tx.send(event).is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        break frame.map_or_else(
                            || CloseInfo::new(NO_STATUS_RECEIVED, ""),
                            |frame| CloseInfo::new(u16::from(frame.code), frame.reason.as_str()),
                        );
                    }
                    Some(Err(e)) => break CloseInfo::new(ABNORMAL_CLOSURE, e.to_string()),
                    None => break CloseInfo::new(ABNORMAL_CLOSURE, ""),
                    Some(Ok(_)) => {
                        // Binary frames are not part of the protocol.
                        // Transport pings are answered by tungstenite.
                    }
                }
            };
            _ = transport_tx.send(TransportEvent::Closed { generation, close });
        });

        self.opening = None;
        self.writer = Some(writer);
        self.reader = Some(reader);
        self.backoff.reset();
        self.publish_attempts();
        self.start_heartbeat();
        self.set_state(ClientState::Open);

        #[cfg(feature = "tracing")]
        tracing::info!(endpoint = %self.endpoint, generation, "WebSocket connected");

        self.emit(&Event::Connect(format!("Connected to {}", self.endpoint)));
    }

    async fn on_text(&mut self, text: String) {
        #[cfg(feature = "tracing")]
        tracing::trace!(%text, "Received WebSocket text message");

        match Frame::classify(&text) {
            Frame::Acknowledgment => {
                if let Some(probe) = self.probe.take() {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(rtt = ?probe.sent_at.elapsed(), "Liveness probe acknowledged");
                    #[cfg(not(feature = "tracing"))]
                    let _ = probe.sent_at;
                }
            }
            Frame::Ping => {
                self.write(PONG_FRAME.to_owned()).await;
            }
            Frame::Message(value) => self.emit(&Event::Message(value)),
        }
    }

    fn on_close(&mut self, close: CloseInfo) {
        #[cfg(feature = "tracing")]
        tracing::info!(code = close.code, reason = %close.reason, "WebSocket disconnected");

        self.release_transport();
        self.set_state(ClientState::Closed);
        let normal = close.is_normal();
        self.emit(&Event::Disconnect(close.clone()));

        if !normal {
            self.emit(&Event::error(WsError::ConnectionClosed {
                code: close.code,
                reason: close.reason,
            }));
            self.schedule_reconnect();
        }
    }

    fn start_heartbeat(&mut self) {
        self.probe = None;
        let period = self.config.heartbeat_interval;
        if period.is_zero() {
            self.heartbeat = None;
            return;
        }

        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.heartbeat = Some(heartbeat);
    }

    async fn send_probe(&mut self) {
        // At most one outstanding probe
        if !self.state.is_open() || self.probe.is_some() {
            return;
        }

        let ping = match serde_json::to_string(&WireCommand::Ping) {
            Ok(ping) => ping,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::error!(error = %e, "Unable to encode ping");
                #[cfg(not(feature = "tracing"))]
                let _ = &e;
                return;
            }
        };

        let sent_at = Instant::now();
        if self.write(ping).await {
            self.probe = Some(PendingProbe {
                sent_at,
                deadline: sent_at + self.config.heartbeat_timeout,
            });
        }
    }

    fn on_probe_timeout(&mut self) {
        let heartbeat_timeout = self.config.heartbeat_timeout;
        #[cfg(feature = "tracing")]
        tracing::warn!(
            "Heartbeat timeout: no acknowledgment received within {:?}",
            heartbeat_timeout
        );

        self.release_transport();
        self.set_state(ClientState::Closed);
        self.emit(&Event::error(WsError::HeartbeatTimeout(heartbeat_timeout)));
        self.emit(&Event::Disconnect(CloseInfo::new(
            ABNORMAL_CLOSURE,
            "heartbeat timeout",
        )));
        self.schedule_reconnect();
    }

    /// Write a frame queued by [`Client::send`](super::Client::send).
    ///
    /// A frame queued while open may find the transport gone by the time it
    /// is processed. It is dropped and reported as [`WsError::NotConnected`].
    async fn send_text(&mut self, text: String) {
        if !self.state.is_open() {
            #[cfg(feature = "tracing")]
            tracing::warn!(state = ?self.state, "Dropping message queued before the close");
            self.emit(&Event::error(WsError::NotConnected));
            return;
        }
        self.write(text).await;
    }

    /// Write a text frame to the open transport.
    ///
    /// A failed write closes the transport and hands off to reconnection.
    async fn write(&mut self, text: String) -> bool {
        let Some(writer) = self.writer.as_mut() else {
            return false;
        };

        match writer.send(Message::Text(text.into())).await {
            Ok(()) => true,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "Failed to send WebSocket message");

                let reason = e.to_string();
                self.release_transport();
                self.set_state(ClientState::Closed);
                self.emit(&Event::error(WsError::SendFailed(e)));
                self.emit(&Event::Disconnect(CloseInfo::new(ABNORMAL_CLOSURE, reason)));
                self.schedule_reconnect();
                false
            }
        }
    }

    /// Schedule the next reconnection attempt, or report that the budget is spent.
    fn schedule_reconnect(&mut self) {
        if self.shared.manual_disconnect.load(Ordering::SeqCst) {
            return;
        }

        let next = self.backoff.next_backoff();
        self.publish_attempts();
        match next {
            Some(delay) => {
                let attempt = self.backoff.attempts();
                #[cfg(feature = "tracing")]
                tracing::info!(attempt, ?delay, "Scheduling reconnection");

                self.reconnect_at = Some(Instant::now() + delay);
                self.emit(&Event::error(WsError::ReconnectScheduled { attempt, delay }));
            }
            None => {
                let attempts = self.backoff.attempts();
                #[cfg(feature = "tracing")]
                tracing::warn!(attempts, "Maximum reconnection attempts reached");

                self.reconnect_at = None;
                self.emit(&Event::error(WsError::ReconnectExhausted { attempts }));
            }
        }
    }

    /// Cancel every timer and close the transport with a normal closure.
    async fn disconnect(&mut self) {
        self.shared.manual_disconnect.store(true, Ordering::SeqCst);
        self.reconnect_at = None;
        self.heartbeat = None;
        self.probe = None;
        // Opens still in flight become stale
        self.generation = self.generation.wrapping_add(1);
        if let Some(opening) = self.opening.take() {
            opening.abort();
        }

        let was_open = self.state.is_open();
        if was_open {
            self.set_state(ClientState::Closing);
        }
        self.close_writer().await;
        self.release_transport();

        self.set_state(ClientState::Closed);

        if was_open {
            #[cfg(feature = "tracing")]
            tracing::info!(endpoint = %self.endpoint, "WebSocket disconnected by client");
            self.emit(&Event::Disconnect(CloseInfo::new(
                NORMAL_CLOSURE,
                CLIENT_CLOSE_REASON,
            )));
        }
    }

    /// Send a normal close frame, giving up after `close_timeout`.
    async fn close_writer(&mut self) {
        let Some(mut writer) = self.writer.take() else {
            return;
        };

        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: CLIENT_CLOSE_REASON.into(),
        };
        let result = timeout(
            self.config.close_timeout,
            writer.send(Message::Close(Some(frame))),
        )
        .await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(error = %e, "Close frame was not delivered");
                #[cfg(not(feature = "tracing"))]
                let _ = &e;
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Timed out sending close frame");
            }
        }
    }

    /// Drop the current transport and its heartbeat without emitting anything.
    fn release_transport(&mut self) {
        self.writer = None;
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.heartbeat = None;
        self.probe = None;
    }

    async fn shutdown(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(endpoint = %self.endpoint, "Client dropped, stopping connection task");

        self.shared.manual_disconnect.store(true, Ordering::SeqCst);
        self.reconnect_at = None;
        if let Some(opening) = self.opening.take() {
            opening.abort();
        }
        self.close_writer().await;
        self.release_transport();
        self.observers.clear();
        self.set_state(ClientState::Closed);
    }

    fn set_state(&mut self, state: ClientState) {
        self.state = state;
        _ = self.state_tx.send_replace(state);
    }

    fn publish_attempts(&self) {
        self.shared
            .attempts
            .store(self.backoff.attempts(), Ordering::SeqCst);
    }

    fn emit(&self, event: &Event) {
        self.observers.publish(event);
    }
}

/// Parse the endpoint, accepting only WebSocket schemes.
fn validate_endpoint(endpoint: &str) -> Result<Url, WsError> {
    let url = Url::parse(endpoint)
        .map_err(|e| WsError::InvalidEndpoint(format!("{endpoint}: {e}")))?;

    match url.scheme() {
        "ws" | "wss" => Ok(url),
        scheme => Err(WsError::InvalidEndpoint(format!(
            "{endpoint}: unsupported scheme `{scheme}`"
        ))),
    }
}

async fn tick(heartbeat: Option<&mut Interval>) {
    match heartbeat {
        Some(heartbeat) => {
            heartbeat.tick().await;
        }
        None => pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use futures::{SinkExt as _, StreamExt as _};
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    use super::*;
    use crate::ws::config::ReconnectConfig;
    use crate::ws::event::EventKind;

    type Recorded = Arc<Mutex<Vec<Event>>>;

    fn manager(config: Config) -> (ConnectionManager, Recorded) {
        let observers = ObserverRegistry::new();
        let events: Recorded = Arc::new(Mutex::new(Vec::new()));
        for kind in [
            EventKind::Connect,
            EventKind::Disconnect,
            EventKind::Error,
            EventKind::Message,
        ] {
            let events = Arc::clone(&events);
            observers.subscribe(
                kind,
                Arc::new(move |event: &Event| events.lock().unwrap().push(event.clone())),
            );
        }

        let (state_tx, _state_rx) = watch::channel(ClientState::Idle);
        let (manager, _transport_rx) = ConnectionManager::new(
            "ws://127.0.0.1:9".to_owned(),
            config,
            observers,
            Arc::new(Shared::default()),
            state_tx,
        );
        (manager, events)
    }

    /// A client stream to a local server that reads until the peer goes away.
    async fn open_stream() -> WsStream {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut server = accept_async(stream).await.unwrap();
            while let Some(Ok(_)) = server.next().await {}
        });

        let (stream, _) = connect_async(format!("ws://{addr}")).await.unwrap();
        stream
    }

    async fn open_manager(config: Config) -> (ConnectionManager, Recorded) {
        let (mut manager, events) = manager(config);
        manager.generation = 1;
        manager.set_state(ClientState::Connecting);
        manager.on_open(open_stream().await);
        (manager, events)
    }

    fn ws_error(event: &Event) -> Option<&WsError> {
        match event {
            Event::Error(error) => error.downcast_ref::<WsError>(),
            _ => None,
        }
    }

    #[tokio::test]
    async fn superseded_transport_events_are_ignored() {
        let (mut manager, events) = manager(Config::default());
        manager.generation = 3;
        manager.set_state(ClientState::Open);

        manager
            .handle_transport_event(TransportEvent::Text {
                generation: 2,
                text: r#"{"status":"info","msg":"late"}"#.to_owned(),
            })
            .await;
        manager
            .handle_transport_event(TransportEvent::Closed {
                generation: 2,
                close: CloseInfo::new(ABNORMAL_CLOSURE, ""),
            })
            .await;

        assert!(events.lock().unwrap().is_empty());
        assert_eq!(manager.state, ClientState::Open);
        assert!(manager.reconnect_at.is_none());

        manager
            .handle_transport_event(TransportEvent::Text {
                generation: 3,
                text: r#"{"status":"info","msg":"current"}"#.to_owned(),
            })
            .await;

        assert!(matches!(
            events.lock().unwrap().as_slice(),
            [Event::Message(value)] if value["msg"] == "current"
        ));
    }

    #[tokio::test]
    async fn superseded_open_failure_is_ignored() {
        let (mut manager, events) = manager(Config::default());
        manager.generation = 5;
        manager.set_state(ClientState::Connecting);

        manager
            .handle_transport_event(TransportEvent::OpenFailed {
                generation: 4,
                error: WsError::ConnectTimeout(Duration::from_secs(1)),
            })
            .await;

        assert!(events.lock().unwrap().is_empty());
        assert_eq!(manager.state, ClientState::Connecting);
        assert_eq!(manager.backoff.attempts(), 0);
    }

    #[tokio::test]
    async fn failed_write_closes_and_schedules_retry() {
        let config = Config::builder()
            .reconnect(
                ReconnectConfig::builder()
                    .initial_backoff(Duration::from_millis(50))
                    .build(),
            )
            .build();
        let (mut manager, events) = open_manager(config).await;
        assert!(matches!(events.lock().unwrap().as_slice(), [Event::Connect(_)]));
        events.lock().unwrap().clear();

        // Writes after a close frame are refused by the transport
        manager.writer.as_mut().unwrap().close().await.unwrap();
        manager.send_text(r#"{"command":"ping"}"#.to_owned()).await;

        {
            let events = events.lock().unwrap();
            match events.as_slice() {
                [failed, Event::Disconnect(close), scheduled] => {
                    assert!(matches!(ws_error(failed), Some(WsError::SendFailed(_))));
                    assert_eq!(close.code, ABNORMAL_CLOSURE);
                    assert!(matches!(
                        ws_error(scheduled),
                        Some(WsError::ReconnectScheduled { attempt: 1, delay })
                            if *delay == Duration::from_millis(50)
                    ));
                }
                other => panic!("Unexpected events: {other:?}"),
            }
        }

        assert_eq!(manager.state, ClientState::Closed);
        assert!(manager.writer.is_none());
        assert!(manager.reconnect_at.is_some());
        assert_eq!(manager.shared.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn send_after_close_is_reported() {
        let (mut manager, events) = manager(Config::default());
        manager.set_state(ClientState::Closed);

        manager.send_text(r#"{"command":"ping"}"#.to_owned()).await;

        let events = events.lock().unwrap();
        assert!(matches!(
            events.as_slice(),
            [event] if matches!(ws_error(event), Some(WsError::NotConnected))
        ));
    }

    #[tokio::test]
    async fn zero_heartbeat_interval_disables_probes() {
        let config = Config::builder()
            .heartbeat_interval(Duration::ZERO)
            .build();
        let (mut manager, events) = open_manager(config).await;

        assert_eq!(manager.state, ClientState::Open);
        assert!(manager.heartbeat.is_none());
        assert!(matches!(events.lock().unwrap().as_slice(), [Event::Connect(_)]));

        let never =
            tokio::time::timeout(Duration::from_millis(20), tick(manager.heartbeat.as_mut())).await;
        assert!(never.is_err(), "disabled heartbeat should never tick");
    }

    #[test]
    fn accepts_websocket_schemes_only() {
        assert!(validate_endpoint("ws://localhost:6789").is_ok());
        assert!(validate_endpoint("wss://robo.example.com/ws").is_ok());

        let err = validate_endpoint("http://localhost:6789").unwrap_err();
        assert!(matches!(err, WsError::InvalidEndpoint(ref reason) if reason.contains("http")));

        assert!(matches!(
            validate_endpoint("not a url"),
            Err(WsError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn only_open_allows_sending() {
        assert!(ClientState::Open.is_open());
        assert!(!ClientState::Connecting.is_open());
        assert!(!ClientState::Closing.is_open());
        assert!(!ClientState::Closed.is_open());
        assert!(!ClientState::Idle.is_open());
    }

    #[tokio::test]
    async fn idle_timers_never_fire() {
        let never = tokio::time::timeout(Duration::from_millis(20), wait_until(None)).await;
        assert!(never.is_err(), "no deadline should pend forever");

        let soon = tokio::time::timeout(
            Duration::from_millis(200),
            wait_until(Some(Instant::now() + Duration::from_millis(5))),
        )
        .await;
        assert!(soon.is_ok(), "deadline should elapse");
    }
}
