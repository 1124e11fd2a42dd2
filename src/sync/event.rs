use chrono::{DateTime, Utc};
use serde::Serialize;

/// Why a snapshot needs to be re-fetched
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncCause {
    /// First snapshot handed to a new reader
    InitialLoad,
    /// Reader fell behind the signal channel and re-fetched
    Resync,
    Tick,
    MaintenanceScheduled,
    MaintenanceCompleted,
    OptimizationApproved,
    OptimizationRejected,
    NotificationRead,
    ChatMessage,
}

/// Re-fetch signal published after every applied mutation
#[derive(Clone, Debug, Serialize)]
pub struct SyncEvent {
    /// Store revision right after the mutation
    pub revision: u64,
    pub cause: SyncCause,
    pub timestamp: DateTime<Utc>,
}
