// Entity store, tick simulator and command handlers

pub mod config;
mod engine;
mod notifications;
pub mod simulator;
mod store;
mod summary;
mod ticker;

pub use config::SimulationConfig;
pub use engine::{ChatExchange, CommandOutcome, FactoryEngine, SCHEDULED_MAINTENANCE};
pub use notifications::NotificationLog;
pub use simulator::{AlertKind, MachineAlert, TickReport, TickSimulator};
pub use store::{EntityStore, Snapshot};
pub use summary::{DashboardSummary, FactorySummary, MaintenanceSummary, SustainabilitySummary};
pub use ticker::{run_tick_loop, spawn_ticker, TickerHandle};
