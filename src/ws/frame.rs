//! Classification of inbound text frames into control and application traffic.

use serde_json::Value;

const CONTROL_FIELDS: [&str; 2] = ["status", "type"];

/// What an inbound text frame means to the connection.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// `pong` or `heartbeat`: acknowledges liveness, never forwarded.
    Acknowledgment,
    /// `ping` from the server: answered with a pong, never forwarded.
    Ping,
    /// Anything else, forwarded to `message` observers.
    Message(Value),
}

impl Frame {
    /// Classify a text frame.
    ///
    /// A JSON object whose `status` or `type` is `pong`, `heartbeat` or `ping` is a
    /// control frame. Text that is not valid JSON is kept as [`Value::String`].
    #[must_use]
    pub fn classify(text: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(text) else {
            return Self::Message(Value::String(text.to_owned()));
        };

        match control_marker(&value) {
            Some("pong" | "heartbeat") => Self::Acknowledgment,
            Some("ping") => Self::Ping,
            _ => Self::Message(value),
        }
    }

    #[must_use]
    pub const fn is_control(&self) -> bool {
        !matches!(self, Self::Message(_))
    }
}

fn control_marker(value: &Value) -> Option<&str> {
    let object = value.as_object()?;
    CONTROL_FIELDS
        .iter()
        .filter_map(|field| object.get(*field).and_then(Value::as_str))
        .find(|marker| matches!(*marker, "pong" | "heartbeat" | "ping"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn acknowledgments_are_absorbed() {
        assert_eq!(Frame::classify(r#"{"status":"heartbeat"}"#), Frame::Acknowledgment);
        assert_eq!(Frame::classify(r#"{"status":"pong"}"#), Frame::Acknowledgment);
        assert_eq!(Frame::classify(r#"{"type":"heartbeat"}"#), Frame::Acknowledgment);
        assert_eq!(Frame::classify(r#"{"type":"pong","ts":1}"#), Frame::Acknowledgment);
    }

    #[test]
    fn server_ping_is_control() {
        let frame = Frame::classify(r#"{"type":"ping"}"#);

        assert_eq!(frame, Frame::Ping);
        assert!(frame.is_control());
    }

    #[test]
    fn application_message_is_forwarded_unchanged() {
        let frame = Frame::classify(r#"{"status":"pairs_list","pairs":["A","B"]}"#);

        assert_eq!(
            frame,
            Frame::Message(json!({"status": "pairs_list", "pairs": ["A", "B"]}))
        );
        assert!(!frame.is_control());
    }

    #[test]
    fn control_marker_in_either_field_wins() {
        assert_eq!(
            Frame::classify(r#"{"status":"info","type":"heartbeat"}"#),
            Frame::Acknowledgment
        );
    }

    #[test]
    fn non_json_falls_back_to_raw_text() {
        assert_eq!(
            Frame::classify("robot started"),
            Frame::Message(Value::String("robot started".to_owned()))
        );
        assert_eq!(Frame::classify("[1,2]"), Frame::Message(json!([1, 2])));
    }
}
