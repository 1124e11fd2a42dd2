use crate::entity::{new_entity_id, Machine, MachineStatus, NotificationKind, ProductionMetricSample};
use crate::state::config::{SimulationConfig, MAX_JITTER};
use crate::state::store::EntityStore;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

pub const VIBRATION_ANOMALY: &str = "Vibration anomaly detected";
pub const FAILURE_IMMINENT: &str = "Component failure imminent";
pub const SUDDEN_LOSS: &str = "Sudden Power Loss / Emergency Stop";

/// Status change raised by a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// operational → warning
    Warning,
    /// warning → critical
    Critical,
    /// any non-maintenance status → critical at 0% efficiency
    SuddenLoss,
}

impl AlertKind {
    fn issue(self) -> &'static str {
        match self {
            AlertKind::Warning => VIBRATION_ANOMALY,
            AlertKind::Critical => FAILURE_IMMINENT,
            AlertKind::SuddenLoss => SUDDEN_LOSS,
        }
    }

    fn notification(self, machine_name: &str) -> (&'static str, String, NotificationKind) {
        match self {
            AlertKind::Warning => (
                "Machine Warning",
                format!("{} is showing vibration anomalies.", machine_name),
                NotificationKind::Warning,
            ),
            AlertKind::Critical => (
                "Critical Failure Alert",
                format!("{} critical failure detected!", machine_name),
                NotificationKind::Error,
            ),
            AlertKind::SuddenLoss => (
                "Emergency Stop",
                format!("{} experienced sudden downtime.", machine_name),
                NotificationKind::Error,
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MachineAlert {
    pub machine_id: String,
    pub machine_name: String,
    pub kind: AlertKind,
}

/// What a single tick changed
#[derive(Clone, Debug, Serialize)]
pub struct TickReport {
    pub alerts: Vec<MachineAlert>,
    /// Production sample appended by this tick
    pub sample: ProductionMetricSample,
}

/// Advances machine health and the production series by one step
///
/// All randomness comes from the caller-supplied source, so a seeded RNG
/// makes a run reproducible.
#[derive(Clone, Debug)]
pub struct TickSimulator {
    config: SimulationConfig,
}

impl TickSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Run one tick against `store`
    ///
    /// Machines under maintenance are left untouched. Exactly one production
    /// sample is appended and the window is trimmed back to its configured
    /// length. Sustainability samples are not advanced.
    pub fn step<R: Rng + ?Sized>(
        &self,
        store: &mut EntityStore,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> TickReport {
        let mut alerts = Vec::new();

        for machine in store.machines.iter_mut() {
            if let Some(kind) = self.advance_machine(machine, rng, now) {
                let (title, message, level) = kind.notification(&machine.name);
                store.notifications.add(title, message, level, now);
                alerts.push(MachineAlert {
                    machine_id: machine.id.clone(),
                    machine_name: machine.name.clone(),
                    kind,
                });
            }
        }

        let sample = self.next_sample(store.latest_production(), rng, now);
        store.push_production_sample(sample.clone(), self.config.production_window);

        TickReport { alerts, sample }
    }

    /// Perturb one machine and roll its escalation paths
    fn advance_machine<R: Rng + ?Sized>(
        &self,
        machine: &mut Machine,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Option<AlertKind> {
        if machine.status == MachineStatus::Maintenance {
            return None;
        }

        machine.efficiency =
            (machine.efficiency + jitter(rng, self.config.efficiency_jitter)).clamp(0.0, 100.0);
        machine.updated_at = now;

        let gradual = match machine.status {
            MachineStatus::Operational if roll(rng, self.config.warning_probability) => {
                Some(AlertKind::Warning)
            }
            MachineStatus::Warning if roll(rng, self.config.critical_probability) => {
                Some(AlertKind::Critical)
            }
            _ => None,
        };

        // Emergency stop is rolled independently and wins over a gradual step.
        let alert = if roll(rng, self.config.sudden_loss_probability) {
            machine.efficiency = 0.0;
            Some(AlertKind::SuddenLoss)
        } else {
            gradual
        };

        if let Some(kind) = alert {
            machine.status = match kind {
                AlertKind::Warning => MachineStatus::Warning,
                AlertKind::Critical | AlertKind::SuddenLoss => MachineStatus::Critical,
            };
            machine.issue_detected = Some(kind.issue().to_string());
        }

        alert
    }

    fn next_sample<R: Rng + ?Sized>(
        &self,
        last: Option<&ProductionMetricSample>,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> ProductionMetricSample {
        let (rate, energy, efficiency) = last
            .map(|s| (s.production_rate, s.energy_usage, s.efficiency))
            .unwrap_or((900.0, 240.0, 90.0));

        ProductionMetricSample {
            id: new_entity_id(),
            timestamp: now,
            production_rate: (rate + jitter(rng, self.config.production_rate_jitter)).max(0.0),
            energy_usage: (energy + jitter(rng, self.config.energy_usage_jitter)).max(0.0),
            efficiency: (efficiency + jitter(rng, self.config.sample_efficiency_jitter))
                .clamp(0.0, 100.0),
        }
    }
}

/// Uniform draw in `[-amplitude, amplitude]`, amplitude capped at [`MAX_JITTER`]
fn jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f64) -> f64 {
    if amplitude.is_nan() || amplitude <= 0.0 {
        return 0.0;
    }
    let amplitude = amplitude.min(MAX_JITTER);
    rng.gen_range(-amplitude..=amplitude)
}

fn roll<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.gen_bool(probability.clamp(0.0, 1.0))
}
