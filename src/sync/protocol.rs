use crate::state::Snapshot;
use crate::sync::{SyncCause, SyncFrame};
use serde::{Deserialize, Serialize};

/// Client → Server message types
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Ask for the current snapshot right away
    #[serde(rename = "refresh")]
    Refresh,
}

/// Server → Client: whole-state replace
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub revision: u64,
    pub cause: SyncCause,
    pub data: Snapshot,
}

impl From<SyncFrame> for SnapshotMessage {
    fn from(frame: SyncFrame) -> Self {
        Self {
            msg_type: "snapshot".to_string(),
            revision: frame.snapshot.revision,
            cause: frame.cause,
            data: frame.snapshot,
        }
    }
}

/// Server → Client: Error message
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub error: String,
}

impl ErrorMessage {
    pub fn new(error: String) -> Self {
        Self {
            msg_type: "error".to_string(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EntityStore;
    use serde_json::json;

    #[test]
    fn test_parse_refresh() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"refresh"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Refresh));
    }

    #[test]
    fn test_unknown_client_message_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"subscribe"}"#).is_err());
    }

    #[test]
    fn test_snapshot_message_shape() {
        let frame = SyncFrame {
            cause: SyncCause::Tick,
            snapshot: EntityStore::new().snapshot(),
        };
        let value = serde_json::to_value(SnapshotMessage::from(frame)).unwrap();

        assert_eq!(value["type"], json!("snapshot"));
        assert_eq!(value["cause"], json!("tick"));
        assert_eq!(value["revision"], json!(0));
        assert!(value["data"]["machines"].is_array());
        assert!(value["data"]["chat_messages"].is_array());
    }
}
