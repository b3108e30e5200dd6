//! Resilient WebSocket client for the robot backend control channel.
//!
//! # Architecture
//!
//! - [`Client`]: cheap, cloneable handle exposing `connect`, `disconnect`, `send`, `on` and `off`
//! - `ConnectionManager`: background task owning the transport, heartbeat and reconnection timers
//! - [`CappedBackoff`]: reconnection delays, implementing the `backoff` crate's `Backoff` trait
//! - [`ObserverRegistry`]: ordered observer lists with panic isolation
//! - [`Frame`]: separates control frames (`ping`/`pong`/`heartbeat`) from application messages
//!
//! # Example
//!
//! ```rust, no_run
//! use std::sync::Arc;
//!
//! use robo_trader_client::ws::{Client, Event, EventKind};
//! use robo_trader_client::ws::config::Config;
//!
//! # async fn example() {
//! let client = Client::new("ws://localhost:6789", Config::default());
//! client.on(
//!     EventKind::Disconnect,
//!     Arc::new(|event: &Event| eprintln!("lost connection: {event:?}")),
//! );
//! # }
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod frame;
pub mod retry;

pub use client::{Client, WeakClient};
pub use connection::ClientState;
pub use dispatcher::{Listener, ObserverRegistry};
#[expect(
    clippy::module_name_repetitions,
    reason = "WsError includes module name for clarity when used outside this module"
)]
pub use error::WsError;
pub use event::{CloseInfo, Event, EventKind};
pub use frame::Frame;
pub use retry::CappedBackoff;
