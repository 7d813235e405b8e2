//! Wire messages exchanged with clients over the socket.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::Action;
use crate::errors::ActionError;
use crate::view::ClientGameState;

/// Machine-readable category of an error sent to a client.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ActionError,
    ParseError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    StateUpdate { state: ClientGameState },
    Error { code: ErrorCode, message: String },
}

impl ServerMessage {
    pub fn state(state: ClientGameState) -> Self {
        ServerMessage::StateUpdate { state }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&ActionError> for ServerMessage {
    fn from(err: &ActionError) -> Self {
        ServerMessage::Error {
            code: ErrorCode::ActionError,
            message: err.to_string(),
        }
    }
}

impl From<&ProtocolError> for ServerMessage {
    fn from(err: &ProtocolError) -> Self {
        ServerMessage::Error {
            code: ErrorCode::ParseError,
            message: err.to_string(),
        }
    }
}

/// An inbound frame that could not be turned into an [`Action`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("Unknown action")]
    UnknownAction,
}

/// Decodes one text frame. Malformed JSON and well-formed JSON that is not
/// a recognised action are reported separately.
pub fn decode_action(text: &str) -> Result<Action, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| ProtocolError::InvalidJson)?;
    serde_json::from_value(value).map_err(|_| ProtocolError::UnknownAction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_invalid_json() {
        assert_eq!(decode_action("{not json"), Err(ProtocolError::InvalidJson));
    }

    #[test]
    fn unknown_type_or_missing_field_is_unknown_action() {
        assert_eq!(
            decode_action(r#"{"type":"FLIP_TABLE"}"#),
            Err(ProtocolError::UnknownAction)
        );
        assert_eq!(
            decode_action(r#"{"type":"DISCARD_CHIP"}"#),
            Err(ProtocolError::UnknownAction)
        );
        assert_eq!(decode_action("[1,2]"), Err(ProtocolError::UnknownAction));
    }

    #[test]
    fn error_message_shape() {
        let msg = ServerMessage::from(&ActionError::NameTaken);
        let json: serde_json::Value =
            serde_json::from_str(&msg.to_json().expect("encode")).expect("json");
        assert_eq!(
            json,
            serde_json::json!({
                "type": "ERROR",
                "code": "ACTION_ERROR",
                "message": "Name already taken"
            })
        );

        let parse = ServerMessage::from(&ProtocolError::InvalidJson);
        let json = serde_json::to_value(&parse).expect("encode");
        assert_eq!(json["code"], "PARSE_ERROR");
        assert_eq!(json["message"], "Invalid JSON");
    }
}
