use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// Generate a new opaque entity identifier (UUIDv7, time-ordered)
pub fn new_entity_id() -> String {
    Uuid::now_v7().to_string()
}

/// Health status of a machine on the factory floor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Operational,
    Warning,
    Critical,
    Maintenance,
}

impl MachineStatus {
    /// Warning and critical machines show up as "needs attention" on the dashboard
    pub fn needs_attention(self) -> bool {
        matches!(self, MachineStatus::Warning | MachineStatus::Critical)
    }
}

/// A monitored machine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    pub name: String,
    pub status: MachineStatus,

    /// Percentage in [0, 100]. Pinned to 0 while under maintenance.
    pub efficiency: f64,

    pub last_maintenance: DateTime<Utc>,
    pub next_maintenance: DateTime<Utc>,

    /// Diagnostic text; `None` only while operational
    pub issue_detected: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One point of the production time series
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionMetricSample {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Units per hour
    pub production_rate: f64,
    /// kWh
    pub energy_usage: f64,
    pub efficiency: f64,
}

/// One point of the sustainability series (daily)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SustainabilityMetricSample {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// kg
    pub co2_reduction: f64,
    /// kWh
    pub energy_saved: f64,
    /// Percent, may be fractional
    pub efficiency_gain: f64,
}

/// Lifecycle of an optimization suggestion
///
/// `Pending` → `Approved` | `Rejected`. `Implemented` follows `Approved` but is
/// advanced outside this engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationStatus {
    Pending,
    Approved,
    Rejected,
    Implemented,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Free-text expected impact
    pub impact: String,
    pub status: OptimizationStatus,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Success,
    Error,
}

/// Notification shown in the dashboard inbox
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One line of the assistant chat log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub message: String,
    pub role: ChatRole,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(message: impl Into<String>, role: ChatRole, now: DateTime<Utc>) -> Self {
        Self {
            id: new_entity_id(),
            message: message.into(),
            role,
            created_at: now,
        }
    }
}
