//! Push-transport collaborator and wire envelope.

use async_trait::async_trait;
use kkutu_core::TransportError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

/// One decoded server push: an opaque type plus its JSON payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    /// Message type, matched against [`MessageTypes`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Raw payload.
    #[serde(default)]
    pub payload: Value,
}

impl PushMessage {
    /// Message of type `kind`.
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// Wire names of the message types the core consumes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageTypes {
    /// Session greeting.
    pub welcome: String,
    /// Room snapshot.
    pub room: String,
    /// Round setup.
    pub round_ready: String,
    /// Turn start.
    pub turn_start: String,
    /// Turn end.
    pub turn_end: String,
    /// Rejected word.
    pub turn_error: String,
}

impl Default for MessageTypes {
    fn default() -> Self {
        Self {
            welcome: "welcome".into(),
            room: "room".into(),
            round_ready: "roundReady".into(),
            turn_start: "turnStart".into(),
            turn_end: "turnEnd".into(),
            turn_error: "turnError".into(),
        }
    }
}

impl MessageTypes {
    /// Every name, for filter registration.
    pub fn all(&self) -> [&str; 6] {
        [
            &self.welcome,
            &self.room,
            &self.round_ready,
            &self.turn_start,
            &self.turn_end,
            &self.turn_error,
        ]
    }
}

/// Source of push messages.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// New receiver for every message delivered from now on.
    fn subscribe(&self) -> broadcast::Receiver<PushMessage>;

    /// Limit delivery to `types`. Called every primary tick; must be
    /// idempotent.
    async fn register_filters(&self, types: &MessageTypes) -> Result<(), TransportError>;

    /// Install in-game helper functions on the transport side.
    async fn register_in_game_functions(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_uses_type_key() {
        let msg: PushMessage =
            serde_json::from_value(json!({"type": "turnEnd", "payload": {"ok": true}})).unwrap();
        assert_eq!(msg.kind, "turnEnd");
        assert_eq!(msg.payload["ok"], true);
    }

    #[test]
    fn payload_defaults_to_null() {
        let msg: PushMessage = serde_json::from_str(r#"{"type":"welcome"}"#).unwrap();
        assert!(msg.payload.is_null());
    }

    #[test]
    fn partial_type_overrides() {
        let types: MessageTypes = serde_json::from_value(json!({"turnStart": "ts"})).unwrap();
        assert_eq!(types.turn_start, "ts");
        assert_eq!(types.turn_end, "turnEnd");
        assert_eq!(types.all().len(), 6);
    }
}
