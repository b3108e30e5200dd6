//! Robot backend monitor.
//!
//! Connects to the robot backend, asks for the available pairs on every
//! (re)connection and logs everything the backend reports.
//!
//! Run with tracing enabled:
//! ```sh
//! RUST_LOG=info cargo run --example monitor --features tracing
//! ```
//!
//! Point it at another backend with `ROBO_TRADER_WS_URL=ws://host:port`.

use std::sync::Arc;
use std::time::Duration;

use robo_trader_client::types::{ServerMessage, robot_status};
use robo_trader_client::ws::config::Config;
use robo_trader_client::ws::{Client, Event, EventKind, WsError};
use robo_trader_client::{DEFAULT_ENDPOINT, ENDPOINT_VAR};
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let endpoint = std::env::var(ENDPOINT_VAR).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_owned());
    let client = Client::new(&endpoint, Config::default());
    info!(endpoint = %client.endpoint(), "Monitoring robot backend");

    let weak = client.downgrade();
    client
        .on(
            EventKind::Connect,
            Arc::new(move |event: &Event| {
                info!(event = ?event, "Connected");
                if let Some(client) = weak.upgrade() {
                    client.request_available_pairs();
                }
            }),
        )
        .on(
            EventKind::Disconnect,
            Arc::new(|event: &Event| {
                if let Event::Disconnect(close) = event {
                    warn!(code = close.code, reason = %close.reason, "Disconnected");
                }
            }),
        )
        .on(
            EventKind::Error,
            Arc::new(|event: &Event| {
                let Event::Error(e) = event else { return };
                match e.downcast_ref::<WsError>() {
                    Some(ws) if ws.is_informational() => info!(%ws),
                    Some(ws) if ws.is_terminal() => error!(%ws, "Giving up"),
                    _ => warn!(error = %e),
                }
            }),
        )
        .on(EventKind::Message, Arc::new(log_message));

    let mut state = client.state_receiver();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                debug!(state = ?*state.borrow(), "State changed");
            }
        }
    }

    client.disconnect();
    tokio::time::sleep(Duration::from_millis(200)).await;
    info!(attempts = client.reconnect_attempts(), "Stopped");

    Ok(())
}

fn log_message(event: &Event) {
    let Event::Message(value) = event else { return };

    if let Some(running) = robot_status(value) {
        info!(running, "Robot status");
    }

    match ServerMessage::from_value(value) {
        ServerMessage::PairsList { pairs } => info!(count = pairs.len(), pairs = ?pairs, "Pairs"),
        ServerMessage::PairAvailability { pair, available } => {
            info!(%pair, available, "Pair availability");
        }
        ServerMessage::TestEntryResult { success, msg } => {
            info!(success, msg = msg.as_deref().unwrap_or_default(), "Test entry");
        }
        message @ ServerMessage::Error { .. } => {
            error!(msg = message.msg().unwrap_or_default(), "Backend error");
        }
        message => info!(msg = message.msg().unwrap_or_default(), raw = %value),
    }
}
