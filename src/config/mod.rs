use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

// Re-export section types owned by their modules
pub use crate::responder::{ResponderConfig, ResponderKind};
pub use crate::state::config::MAX_JITTER;
pub use crate::state::SimulationConfig;

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "FACTORYPULSE_CONFIG";

/// Environment variable overriding `server.bind`
pub const BIND_ENV: &str = "FACTORYPULSE_BIND";

/// Complete factorypulse configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FactoryConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub responder: ResponderConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address for the HTTP/WebSocket listener
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl FactoryConfig {
    /// Load from `FACTORYPULSE_CONFIG` (defaults when unset), then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                info!(path = %path, "Loading configuration");
                load_config(&path)?
            }
            Err(_) => {
                info!("No configuration file set, using defaults");
                FactoryConfig::default()
            }
        };

        if let Ok(bind) = std::env::var(BIND_ENV) {
            config.server.bind = bind;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the simulator cannot run with
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;

        for (name, p) in [
            ("warning_probability", sim.warning_probability),
            ("critical_probability", sim.critical_probability),
            ("sudden_loss_probability", sim.sudden_loss_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                bail!("simulation.{} must be within [0, 1], got {}", name, p);
            }
        }

        for (name, jitter) in [
            ("efficiency_jitter", sim.efficiency_jitter),
            ("production_rate_jitter", sim.production_rate_jitter),
            ("energy_usage_jitter", sim.energy_usage_jitter),
            ("sample_efficiency_jitter", sim.sample_efficiency_jitter),
        ] {
            if !(0.0..=MAX_JITTER).contains(&jitter) {
                bail!(
                    "simulation.{} must be within [0, {}], got {}",
                    name,
                    MAX_JITTER,
                    jitter
                );
            }
        }

        if sim.production_window == 0 {
            bail!("simulation.production_window must be at least 1");
        }
        if sim.tick_interval_ms == 0 {
            bail!("simulation.tick_interval_ms must be at least 1");
        }
        if self.responder.timeout_ms == 0 {
            bail!("responder.timeout_ms must be at least 1");
        }

        Ok(())
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<FactoryConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: FactoryConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}
