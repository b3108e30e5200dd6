use serde::Deserialize;
use serde_json::Value;

/// Typed view of an application message, keyed by its `status` field.
///
/// Messages whose status is unknown, or whose fields do not match the
/// expected shape, are kept verbatim in [`ServerMessage::Other`].
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Reply to `get_available_pairs`
    PairsList {
        #[serde(default)]
        pairs: Vec<String>,
    },
    /// Reply to `check_pair_availability`
    PairAvailability { pair: String, available: bool },
    /// Reply to `test_entry`
    TestEntryResult {
        #[serde(default)]
        success: bool,
        msg: Option<String>,
    },
    #[serde(alias = "erro")]
    Error { msg: Option<String> },
    Info { msg: Option<String> },
    #[serde(rename = "ok")]
    Success { msg: Option<String> },
    #[serde(rename = "aviso")]
    Warning { msg: Option<String> },
    #[serde(skip)]
    Other(Value),
}

impl ServerMessage {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|_| Self::Other(value.clone()))
    }

    /// The human readable text carried by the message, if any.
    #[must_use]
    pub fn msg(&self) -> Option<&str> {
        match self {
            Self::TestEntryResult { msg, .. }
            | Self::Error { msg }
            | Self::Info { msg }
            | Self::Success { msg }
            | Self::Warning { msg } => msg.as_deref(),
            Self::Other(value) => value.get("msg").and_then(Value::as_str),
            Self::PairsList { .. } | Self::PairAvailability { .. } => None,
        }
    }
}

/// Robot on/off state piggybacked on any message as `robo_status`.
#[must_use]
pub fn robot_status(value: &Value) -> Option<bool> {
    value.get("robo_status").and_then(Value::as_bool)
}
