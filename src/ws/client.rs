use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};

use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::{mpsc, watch};

use super::config::Config;
use super::connection::{ClientState, Command, ConnectionManager, Shared};
use super::dispatcher::{Listener, ObserverRegistry};
use super::error::WsError;
use super::event::EventKind;
use crate::Result;
use crate::types::request::{Command as WireCommand, RobotSettings, TestEntry};

/// Resilient WebSocket client for the robot backend control channel.
///
/// The client keeps one transport open to its endpoint, probes it with
/// `{"command":"ping"}` frames, and reopens it with bounded exponential
/// backoff after any closure that was not a normal one. Everything that
/// happens is reported to observers registered with [`Client::on`].
///
/// Cloning is cheap and every clone drives the same connection. Once the
/// last clone is dropped the connection is closed and all timers stop. An
/// observer that needs the client should capture a [`WeakClient`], otherwise
/// the observer keeps the connection alive.
///
/// # Example
///
/// ```rust, no_run
/// use std::sync::Arc;
///
/// use robo_trader_client::ws::{Client, Event, EventKind};
/// use robo_trader_client::ws::config::Config;
///
/// #[tokio::main]
/// async fn main() {
///     let client = Client::new("ws://localhost:6789", Config::default());
///
///     client
///         .on(EventKind::Connect, Arc::new(|_event: &Event| println!("connected")))
///         .on(EventKind::Message, Arc::new(|event: &Event| println!("{event:?}")));
///
///     if client.is_connected() {
///         client.request_available_pairs();
///     }
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    /// Endpoint the connection task dials
    endpoint: String,
    /// Commands for the connection task
    commands: mpsc::UnboundedSender<Command>,
    /// Latest lifecycle state published by the connection task
    state_rx: watch::Receiver<ClientState>,
    /// Disconnect flag and attempt counter
    shared: Arc<Shared>,
    /// Observers, shared with the connection task
    observers: ObserverRegistry,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(crate::DEFAULT_ENDPOINT, Config::default())
    }
}

impl Client {
    /// Create a client for `endpoint` and start connecting.
    ///
    /// An unusable endpoint does not fail here: it is reported through an
    /// `error` event and handled like any other failed connection attempt.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use]
    pub fn new(endpoint: &str, config: Config) -> Self {
        let observers = ObserverRegistry::new();
        let shared = Arc::new(Shared::default());
        let (state_tx, state_rx) = watch::channel(ClientState::Idle);

        let commands = ConnectionManager::spawn(
            endpoint.to_owned(),
            config,
            observers.clone(),
            Arc::clone(&shared),
            state_tx,
        );

        let client = Self {
            inner: Arc::new(ClientInner {
                endpoint: endpoint.to_owned(),
                commands,
                state_rx,
                shared,
                observers,
            }),
        };
        client.connect();
        client
    }

    /// Open the connection if it is not already open or opening.
    ///
    /// This also lifts a previous [`Client::disconnect`] and, if the retry
    /// budget was exhausted, grants a fresh one.
    pub fn connect(&self) {
        self.inner
            .shared
            .manual_disconnect
            .store(false, Ordering::SeqCst);
        self.command(Command::Connect);
    }

    /// Close the connection with a normal closure and stop every timer.
    ///
    /// No automatic reconnection happens afterwards until [`Client::connect`]
    /// is called. Calling this repeatedly, or while not connected, is harmless.
    pub fn disconnect(&self) {
        self.inner
            .shared
            .manual_disconnect
            .store(true, Ordering::SeqCst);
        self.command(Command::Disconnect);
    }

    /// Queue `payload` for sending.
    ///
    /// Strings are sent as-is; anything else is serialized to JSON. Fails with
    /// [`WsError::NotConnected`] unless the client is open.
    ///
    /// `Ok` only means the payload was queued. If the connection closes
    /// before it is written, the payload is dropped and an `error` event with
    /// [`WsError::NotConnected`] is emitted. Failures of the write itself are
    /// reported through `error` and `disconnect` events and trigger
    /// reconnection.
    pub fn try_send<T: Serialize + ?Sized>(&self, payload: &T) -> Result<()> {
        if !self.is_connected() {
            return Err(WsError::NotConnected.into());
        }

        let text = match serde_json::to_value(payload)? {
            Value::String(text) => text,
            value => value.to_string(),
        };

        self.inner
            .commands
            .send(Command::Send(text))
            .map_err(|_e| WsError::NotConnected)?;
        Ok(())
    }

    /// Like [`Client::try_send`], reporting only whether the payload was queued.
    ///
    /// `true` does not mean the frame reached the wire; see [`Client::try_send`].
    pub fn send<T: Serialize + ?Sized>(&self, payload: &T) -> bool {
        match self.try_send(payload) {
            Ok(()) => true,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "Unable to send message");
                #[cfg(not(feature = "tracing"))]
                let _ = &e;
                false
            }
        }
    }

    /// Register `listener` for events of `kind`.
    pub fn on(&self, kind: EventKind, listener: Listener) -> &Self {
        self.inner.observers.subscribe(kind, listener);
        self
    }

    /// Unregister every registration of `listener` for events of `kind`.
    pub fn off(&self, kind: EventKind, listener: &Listener) -> &Self {
        self.inner.observers.unsubscribe(kind, listener);
        self
    }

    /// Ask the backend for every available pair.
    pub fn request_available_pairs(&self) -> bool {
        self.send(&WireCommand::available_pairs())
    }

    pub fn check_pair_availability(&self, pair: &str) -> bool {
        self.send(&WireCommand::check_pair_availability(pair))
    }

    pub fn diagnose_pair(&self, pair: &str) -> bool {
        self.send(&WireCommand::diagnose_pair(pair))
    }

    /// Push the robot configuration to the backend.
    pub fn update_settings(&self, settings: &RobotSettings) -> bool {
        self.send(settings)
    }

    /// Switch the robot off without touching the rest of its configuration.
    pub fn stop_robot(&self) -> bool {
        self.send(&json!({ "ligado": false }))
    }

    pub fn request_test_entry(&self, entry: TestEntry) -> bool {
        self.send(&WireCommand::TestEntry(entry))
    }

    /// Get the current connection state.
    #[must_use]
    pub fn state(&self) -> ClientState {
        *self.inner.state_rx.borrow()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_open()
    }

    /// Subscribe to connection state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ClientState> {
        self.inner.state_rx.clone()
    }

    /// Reconnection attempts made since the last successful open.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.shared.attempts.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// A handle that does not keep the connection alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakClient {
        WeakClient {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn command(&self, command: Command) {
        if self.inner.commands.send(command).is_err() {
            #[cfg(feature = "tracing")]
            tracing::error!("Connection task is no longer running");
        }
    }
}

/// Non-owning handle to a [`Client`], suitable for capturing in observers.
#[derive(Clone)]
pub struct WeakClient {
    inner: Weak<ClientInner>,
}

impl WeakClient {
    #[must_use]
    pub fn upgrade(&self) -> Option<Client> {
        self.inner.upgrade().map(|inner| Client { inner })
    }
}
