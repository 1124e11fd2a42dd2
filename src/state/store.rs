use crate::entity::{
    new_entity_id, ChatMessage, Machine, MachineStatus, Notification, NotificationKind,
    OptimizationStatus, OptimizationSuggestion, ProductionMetricSample,
    SustainabilityMetricSample,
};
use crate::state::notifications::NotificationLog;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Immutable, fully copied view of every collection at one point in time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Store revision the snapshot was taken at
    pub revision: u64,
    pub taken_at: DateTime<Utc>,
    pub machines: Vec<Machine>,
    /// Oldest first
    pub production_metrics: Vec<ProductionMetricSample>,
    /// Oldest first
    pub sustainability_metrics: Vec<SustainabilityMetricSample>,
    pub optimizations: Vec<OptimizationSuggestion>,
    /// Most recent first
    pub notifications: Vec<Notification>,
    /// Oldest first
    pub chat_messages: Vec<ChatMessage>,
}

impl Snapshot {
    pub fn machine(&self, id: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id == id)
    }

    pub fn optimization(&self, id: &str) -> Option<&OptimizationSuggestion> {
        self.optimizations.iter().find(|o| o.id == id)
    }

    pub fn latest_production(&self) -> Option<&ProductionMetricSample> {
        self.production_metrics.last()
    }
}

/// Sole owner of the authoritative in-memory state
///
/// Only the tick simulator and the command handlers write here; readers get
/// a [`Snapshot`].
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    pub(crate) machines: Vec<Machine>,
    pub(crate) production: VecDeque<ProductionMetricSample>,
    pub(crate) sustainability: Vec<SustainabilityMetricSample>,
    pub(crate) optimizations: Vec<OptimizationSuggestion>,
    pub(crate) notifications: NotificationLog,
    pub(crate) chat: Vec<ChatMessage>,
    revision: u64,
}

impl EntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store populated with the demo factory floor
    ///
    /// Randomized seed values (production and sustainability series) are drawn
    /// from `rng`, so a seeded source yields a reproducible store.
    pub fn seeded<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>, production_window: usize) -> Self {
        let machines = vec![
            seed_machine("Assembly Line A1", MachineStatus::Operational, 95.5, 5, 25, None, now),
            seed_machine(
                "Welding Robot B2",
                MachineStatus::Warning,
                78.3,
                15,
                5,
                Some("Temperature sensor showing anomalies"),
                now,
            ),
            seed_machine("CNC Machine C3", MachineStatus::Operational, 92.1, 2, 28, None, now),
            seed_machine(
                "Packaging Unit D4",
                MachineStatus::Critical,
                45.2,
                45,
                -2,
                Some("Hydraulic pressure below threshold"),
                now,
            ),
        ];

        let production = (0..production_window)
            .map(|i| {
                let hours_ago = (production_window - 1 - i) as i64;
                ProductionMetricSample {
                    id: new_entity_id(),
                    timestamp: now - Duration::hours(hours_ago),
                    production_rate: 850.0 + rng.gen::<f64>() * 150.0,
                    energy_usage: 220.0 + rng.gen::<f64>() * 40.0,
                    efficiency: 85.0 + rng.gen::<f64>() * 10.0,
                }
            })
            .collect();

        let sustainability = (0..7)
            .map(|i| {
                let day = i as f64;
                SustainabilityMetricSample {
                    id: new_entity_id(),
                    timestamp: now - Duration::days(6 - i as i64),
                    co2_reduction: 120.0 + day * 10.0 + rng.gen::<f64>() * 20.0,
                    energy_saved: 300.0 + day * 25.0 + rng.gen::<f64>() * 50.0,
                    efficiency_gain: 2.0 + day * 0.3 + rng.gen::<f64>() * 0.5,
                }
            })
            .collect();

        let optimizations = vec![
            OptimizationSuggestion {
                id: new_entity_id(),
                title: "Optimize Assembly Line Speed".to_string(),
                description: "Increase conveyor speed by 8% during peak hours to maximize throughput"
                    .to_string(),
                impact: "Expected 12% increase in production rate".to_string(),
                status: OptimizationStatus::Pending,
                created_at: now - Duration::days(2),
                approved_at: None,
            },
            OptimizationSuggestion {
                id: new_entity_id(),
                title: "Predictive Maintenance Schedule".to_string(),
                description: "Shift maintenance window for Welding Robot B2 to minimize downtime"
                    .to_string(),
                impact: "Reduce downtime by 3 hours per month".to_string(),
                status: OptimizationStatus::Pending,
                created_at: now - Duration::days(1),
                approved_at: None,
            },
        ];

        let notifications = NotificationLog::from_entries(vec![
            Notification {
                id: new_entity_id(),
                title: "Critical Alert".to_string(),
                message: "Packaging Unit D4 requires immediate maintenance.".to_string(),
                kind: NotificationKind::Error,
                read: false,
                created_at: now - Duration::hours(2),
            },
            Notification {
                id: new_entity_id(),
                title: "System Update".to_string(),
                message: "AI Model updated to version 2.4 with improved anomaly detection."
                    .to_string(),
                kind: NotificationKind::Info,
                read: true,
                created_at: now - Duration::hours(24),
            },
        ]);

        Self {
            machines,
            production,
            sustainability,
            optimizations,
            notifications,
            chat: Vec::new(),
            revision: 0,
        }
    }

    /// Deep copy of every collection
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            taken_at: Utc::now(),
            machines: self.machines.clone(),
            production_metrics: self.production.iter().cloned().collect(),
            sustainability_metrics: self.sustainability.clone(),
            optimizations: self.optimizations.clone(),
            notifications: self.notifications.entries().to_vec(),
            chat_messages: self.chat.clone(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Record that a mutation was applied; returns the new revision
    pub(crate) fn bump_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    pub(crate) fn machine_mut(&mut self, id: &str) -> Option<&mut Machine> {
        self.machines.iter_mut().find(|m| m.id == id)
    }

    pub(crate) fn optimization_mut(&mut self, id: &str) -> Option<&mut OptimizationSuggestion> {
        self.optimizations.iter_mut().find(|o| o.id == id)
    }

    /// Append a production sample, dropping the oldest beyond `window`
    pub(crate) fn push_production_sample(&mut self, sample: ProductionMetricSample, window: usize) {
        self.production.push_back(sample);
        while self.production.len() > window {
            self.production.pop_front();
        }
    }

    pub(crate) fn latest_production(&self) -> Option<&ProductionMetricSample> {
        self.production.back()
    }
}

fn seed_machine(
    name: &str,
    status: MachineStatus,
    efficiency: f64,
    days_since_maintenance: i64,
    days_until_maintenance: i64,
    issue: Option<&str>,
    now: DateTime<Utc>,
) -> Machine {
    Machine {
        id: new_entity_id(),
        name: name.to_string(),
        status,
        efficiency,
        last_maintenance: now - Duration::days(days_since_maintenance),
        next_maintenance: now + Duration::days(days_until_maintenance),
        issue_detected: issue.map(str::to_string),
        created_at: now,
        updated_at: now,
    }
}
