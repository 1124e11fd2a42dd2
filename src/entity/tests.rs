use super::*;
use serde_json::json;

#[test]
fn test_new_entity_id_is_unique() {
    let a = new_entity_id();
    let b = new_entity_id();
    assert_ne!(a, b);
    assert!(Uuid::parse_str(&a).is_ok());
}

#[test]
fn test_machine_status_serializes_lowercase() {
    assert_eq!(serde_json::to_value(MachineStatus::Operational).unwrap(), json!("operational"));
    assert_eq!(serde_json::to_value(MachineStatus::Maintenance).unwrap(), json!("maintenance"));

    let status: MachineStatus = serde_json::from_value(json!("critical")).unwrap();
    assert_eq!(status, MachineStatus::Critical);
}

#[test]
fn test_needs_attention() {
    assert!(!MachineStatus::Operational.needs_attention());
    assert!(MachineStatus::Warning.needs_attention());
    assert!(MachineStatus::Critical.needs_attention());
    assert!(!MachineStatus::Maintenance.needs_attention());
}

#[test]
fn test_notification_kind_serialized_as_type() {
    let notification = Notification {
        id: "n-1".to_string(),
        title: "Emergency Stop".to_string(),
        message: "Packaging Unit D4 experienced sudden downtime.".to_string(),
        kind: NotificationKind::Error,
        read: false,
        created_at: Utc::now(),
    };

    let value = serde_json::to_value(&notification).unwrap();
    assert_eq!(value["type"], json!("error"));
    assert_eq!(value["read"], json!(false));
    assert!(value.get("kind").is_none());
}

#[test]
fn test_optimization_without_approval_serializes_null() {
    let suggestion = OptimizationSuggestion {
        id: "o-1".to_string(),
        title: "Optimize Assembly Line Speed".to_string(),
        description: "Increase conveyor speed".to_string(),
        impact: "12% more throughput".to_string(),
        status: OptimizationStatus::Pending,
        created_at: Utc::now(),
        approved_at: None,
    };

    let value = serde_json::to_value(&suggestion).unwrap();
    assert_eq!(value["status"], json!("pending"));
    assert!(value["approved_at"].is_null());
}

#[test]
fn test_chat_message_new() {
    let now = Utc::now();
    let msg = ChatMessage::new("hello", ChatRole::User, now);
    assert_eq!(msg.message, "hello");
    assert_eq!(msg.role, ChatRole::User);
    assert_eq!(msg.created_at, now);
    assert_eq!(serde_json::to_value(&msg).unwrap()["role"], json!("user"));
}
