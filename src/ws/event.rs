use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use strum_macros::Display;

use crate::error::Error;

/// Close code for a normal, negotiated closure.
pub const NORMAL_CLOSURE: u16 = 1000;
/// Close code reported when the transport ended without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Kinds of events observers can register for.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    Message,
    Connect,
    Disconnect,
    Error,
}

/// Close code and reason carried by a `disconnect` event.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

impl CloseInfo {
    #[must_use]
    pub fn new<S: Into<String>>(code: u16, reason: S) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Whether this closure was negotiated with the normal status code.
    #[must_use]
    pub const fn is_normal(&self) -> bool {
        self.code == NORMAL_CLOSURE
    }
}

impl fmt::Display for CloseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "code {}, no reason given", self.code)
        } else {
            write!(f, "code {}: {}", self.code, self.reason)
        }
    }
}

/// An event delivered to observers.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Event {
    /// An application message. Non-JSON text arrives as [`Value::String`].
    Message(Value),
    /// The transport opened.
    Connect(String),
    /// An open transport closed.
    Disconnect(CloseInfo),
    /// A failure, a scheduled retry, or an exhausted retry budget.
    ///
    /// The source is usually a [`WsError`](super::WsError); inspect it with
    /// [`Error::downcast_ref`].
    Error(Arc<Error>),
}

impl Event {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Message(_) => EventKind::Message,
            Self::Connect(_) => EventKind::Connect,
            Self::Disconnect(_) => EventKind::Disconnect,
            Self::Error(_) => EventKind::Error,
        }
    }

    pub(crate) fn error<E: Into<Error>>(error: E) -> Self {
        Self::Error(Arc::new(error.into()))
    }
}
