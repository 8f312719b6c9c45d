//! Chat wire format.
//!
//! Every frame is a JSON object tagged by `type`.

use serde::{Deserialize, Serialize};

/// Frames sent by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// A line typed into the chat box.
    Message { message: String },
    /// Liveness ping, sent every few seconds while the page is open.
    Heartbeat,
}

/// Events broadcast to everyone in an order's chat group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    ChatJoin { username: String },
    ChatLeave { username: String },
    ChatMessage { username: String, message: String },
}

impl ClientFrame {
    /// Parse a text frame. Malformed JSON and unknown types yield `None`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match serde_json::from_str(text) {
            Ok(frame) => Some(frame),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring chat frame");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_message_frame() {
        assert_eq!(
            ClientFrame::parse(r#"{"type":"message","message":"Where is my parcel?"}"#),
            Some(ClientFrame::Message {
                message: "Where is my parcel?".to_string()
            })
        );
    }

    #[test]
    fn parses_heartbeat_with_extra_fields() {
        assert_eq!(
            ClientFrame::parse(r#"{"type":"heartbeat","ts":12}"#),
            Some(ClientFrame::Heartbeat)
        );
    }

    #[test]
    fn unknown_and_malformed_frames_are_ignored() {
        assert_eq!(ClientFrame::parse(r#"{"type":"typing"}"#), None);
        assert_eq!(ClientFrame::parse(r#"{"message":"no type"}"#), None);
        assert_eq!(ClientFrame::parse(r#"{"type":"message"}"#), None);
        assert_eq!(ClientFrame::parse("not json"), None);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let join = serde_json::to_value(ChatEvent::ChatJoin {
            username: "Amina Otieno".to_string(),
        })
        .unwrap();
        assert_eq!(
            join,
            serde_json::json!({"type": "chat_join", "username": "Amina Otieno"})
        );

        let msg = serde_json::to_value(ChatEvent::ChatMessage {
            username: "Amina Otieno".to_string(),
            message: "Hello".to_string(),
        })
        .unwrap();
        assert_eq!(
            msg,
            serde_json::json!({"type": "chat_message", "username": "Amina Otieno", "message": "Hello"})
        );
    }
}
