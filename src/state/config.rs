use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest accepted per-tick jitter amplitude
pub const MAX_JITTER: f64 = 1_000_000.0;

/// Tunables for the tick simulator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Wall-clock period between ticks (milliseconds)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Fixed seed for the random source; entropy-seeded when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Number of production samples kept in the sliding window
    #[serde(default = "default_production_window")]
    pub production_window: usize,

    /// Max per-tick change of machine efficiency (percentage points)
    #[serde(default = "default_efficiency_jitter")]
    pub efficiency_jitter: f64,

    /// Per-tick chance an operational machine degrades to warning
    #[serde(default = "default_warning_probability")]
    pub warning_probability: f64,

    /// Per-tick chance a warning machine degrades to critical
    #[serde(default = "default_critical_probability")]
    pub critical_probability: f64,

    /// Per-tick chance of an emergency stop on any machine not in maintenance
    #[serde(default = "default_sudden_loss_probability")]
    pub sudden_loss_probability: f64,

    #[serde(default = "default_production_rate_jitter")]
    pub production_rate_jitter: f64,

    #[serde(default = "default_energy_usage_jitter")]
    pub energy_usage_jitter: f64,

    #[serde(default = "default_efficiency_jitter")]
    pub sample_efficiency_jitter: f64,
}

fn default_tick_interval_ms() -> u64 {
    5000
}

fn default_production_window() -> usize {
    12
}

fn default_efficiency_jitter() -> f64 {
    2.5
}

fn default_warning_probability() -> f64 {
    0.02
}

fn default_critical_probability() -> f64 {
    0.01
}

fn default_sudden_loss_probability() -> f64 {
    0.005
}

fn default_production_rate_jitter() -> f64 {
    25.0
}

fn default_energy_usage_jitter() -> f64 {
    10.0
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            seed: None,
            production_window: default_production_window(),
            efficiency_jitter: default_efficiency_jitter(),
            warning_probability: default_warning_probability(),
            critical_probability: default_critical_probability(),
            sudden_loss_probability: default_sudden_loss_probability(),
            production_rate_jitter: default_production_rate_jitter(),
            energy_usage_jitter: default_energy_usage_jitter(),
            sample_efficiency_jitter: default_efficiency_jitter(),
        }
    }
}
