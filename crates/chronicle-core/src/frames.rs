//! Wire frames for client <-> server communication.
//!
//! Everything on the wire is `{"type": ..., "data": ...}`. Inbound frames
//! that fail to parse are treated as raw player text by the connection
//! handler, never as an error.

use serde::{Deserialize, Serialize};

use crate::state::GameStateView;

/// Frames sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Player input text.
    Message { text: String },
}

impl ClientFrame {
    /// Parse a raw inbound payload. Malformed framing degrades to literal
    /// player text rather than failing.
    pub fn parse_lossy(raw: &str) -> ClientFrame {
        match serde_json::from_str::<ClientFrame>(raw) {
            Ok(frame) => frame,
            Err(_) => ClientFrame::Message {
                text: raw.to_string(),
            },
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ClientFrame::Message { text } => text,
        }
    }
}

/// Frames sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Connection lifecycle notification.
    ConnectionStatus { status: String, message: String },
    /// Out-of-band server text (prompts, errors).
    SystemMessage { text: String },
    /// Story text produced by the narrative engine.
    Narrative { text: String },
    /// Full game state snapshot for this user.
    GameState(GameStateView),
}

impl ServerFrame {
    pub fn connected(message: impl Into<String>) -> Self {
        ServerFrame::ConnectionStatus {
            status: "connected".to_string(),
            message: message.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        ServerFrame::SystemMessage { text: text.into() }
    }

    pub fn narrative(text: impl Into<String>) -> Self {
        ServerFrame::Narrative { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_frame_round_trip() {
        let raw = r#"{"type":"message","data":{"text":"look around"}}"#;
        let frame = ClientFrame::parse_lossy(raw);
        assert_eq!(frame.text(), "look around");
    }

    #[test]
    fn test_malformed_frame_degrades_to_text() {
        let frame = ClientFrame::parse_lossy("attack the goblin");
        assert_eq!(frame.text(), "attack the goblin");

        // Valid JSON but wrong shape also falls back to literal text.
        let frame = ClientFrame::parse_lossy(r#"{"kind":"other"}"#);
        assert_eq!(frame.text(), r#"{"kind":"other"}"#);
    }

    #[test]
    fn test_server_frame_tagging() {
        let json = serde_json::to_value(ServerFrame::system("hello")).unwrap();
        assert_eq!(json["type"], "system_message");
        assert_eq!(json["data"]["text"], "hello");

        let json = serde_json::to_value(ServerFrame::connected("ok")).unwrap();
        assert_eq!(json["type"], "connection_status");
        assert_eq!(json["data"]["status"], "connected");
    }
}
