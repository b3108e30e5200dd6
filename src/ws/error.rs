#![expect(
    clippy::module_name_repetitions,
    reason = "Error types include the module name to indicate their scope"
)]

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

/// WebSocket error variants.
///
/// Everything except [`WsError::NotConnected`] is recovered inside the
/// connection actor and only ever reaches the application through an
/// [`Event::Error`](super::Event::Error).
#[non_exhaustive]
#[derive(Debug)]
pub enum WsError {
    /// The configured endpoint is not a usable `ws://` or `wss://` URL
    InvalidEndpoint(String),
    /// Error connecting to or communicating with the WebSocket server
    Connection(tokio_tungstenite::tungstenite::Error),
    /// The opening handshake did not complete in time
    ConnectTimeout(Duration),
    /// Writing a frame to an open transport failed
    SendFailed(tokio_tungstenite::tungstenite::Error),
    /// A send was attempted while the client was not open
    NotConnected,
    /// The transport closed without a normal closure
    ConnectionClosed {
        /// Close code reported by the peer, or 1006 when none was received
        code: u16,
        /// Close reason reported by the peer
        reason: String,
    },
    /// No acknowledgment arrived for a liveness probe in time
    HeartbeatTimeout(Duration),
    /// A reconnection attempt has been scheduled
    ReconnectScheduled {
        /// Attempt number, starting at 1
        attempt: u32,
        /// Delay before the attempt fires
        delay: Duration,
    },
    /// The reconnection budget is spent; only an explicit `connect()` resumes
    ReconnectExhausted {
        /// Number of attempts that were made
        attempts: u32,
    },
}

impl WsError {
    /// Whether this error only informs about recovery in progress.
    #[must_use]
    pub const fn is_informational(&self) -> bool {
        matches!(self, Self::ReconnectScheduled { .. })
    }

    /// Whether this error ends automatic recovery.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::ReconnectExhausted { .. })
    }
}

impl fmt::Display for WsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEndpoint(reason) => write!(f, "Invalid WebSocket endpoint: {reason}"),
            Self::Connection(e) => write!(f, "WebSocket connection error: {e}"),
            Self::ConnectTimeout(timeout) => {
                write!(f, "WebSocket connection timed out after {timeout:?}")
            }
            Self::SendFailed(e) => write!(f, "Failed to send WebSocket message: {e}"),
            Self::NotConnected => write!(f, "WebSocket is not connected"),
            Self::ConnectionClosed { code, reason } => {
                write!(f, "WebSocket connection closed (code {code}): {reason}")
            }
            Self::HeartbeatTimeout(timeout) => {
                write!(f, "Heartbeat timeout: no acknowledgment within {timeout:?}")
            }
            Self::ReconnectScheduled { attempt, delay } => {
                write!(f, "Reconnecting in {delay:?} (attempt {attempt})")
            }
            Self::ReconnectExhausted { attempts } => {
                write!(f, "Failed to reconnect after {attempts} attempts")
            }
        }
    }
}

impl StdError for WsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Connection(e) | Self::SendFailed(e) => Some(e),
            _ => None,
        }
    }
}

// Integration with main Error type
impl From<WsError> for crate::error::Error {
    fn from(e: WsError) -> Self {
        crate::error::Error::with_source(crate::error::Kind::WebSocket, e)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for crate::error::Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        crate::error::Error::with_source(crate::error::Kind::WebSocket, WsError::Connection(e))
    }
}
