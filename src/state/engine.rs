use crate::config::FactoryConfig;
use crate::entity::{ChatMessage, ChatRole, MachineStatus, NotificationKind, OptimizationStatus};
use crate::error::EngineError;
use crate::responder::{
    build_responder, build_system_context, Responder, ResponderRequest, FALLBACK_REPLY,
};
use crate::state::config::SimulationConfig;
use crate::state::simulator::{TickReport, TickSimulator};
use crate::state::store::{EntityStore, Snapshot};
use crate::sync::{SyncCause, SyncEvent};
use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Issue text set while a machine is under scheduled maintenance
pub const SCHEDULED_MAINTENANCE: &str = "Scheduled Maintenance";

/// Days until the next maintenance once one completes
const MAINTENANCE_CYCLE_DAYS: i64 = 30;

/// Result of a command that did not fail
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandOutcome {
    /// State changed; a sync event was published
    Applied,
    /// Target already in that state or transition not allowed
    Unchanged,
}

impl CommandOutcome {
    pub fn is_applied(self) -> bool {
        self == CommandOutcome::Applied
    }
}

/// The user message and the reply derived for it
#[derive(Clone, Debug, Serialize)]
pub struct ChatExchange {
    pub user: ChatMessage,
    pub assistant: ChatMessage,
}

/// Everything guarded by the engine lock
struct EngineState {
    store: EntityStore,
    rng: StdRng,
}

/// Factory engine: owns the entity store and serializes every write
///
/// Ticks and commands each run as one critical section on a single mutex, so
/// a tick can never interleave with a command on the same machine. Every
/// applied mutation bumps the store revision and publishes a [`SyncEvent`].
pub struct FactoryEngine {
    state: Mutex<EngineState>,

    simulator: TickSimulator,

    responder: Arc<dyn Responder>,

    /// Upper bound on one responder call
    responder_timeout: Duration,

    /// Re-fetch signals for the synchronization layer
    sync_tx: broadcast::Sender<SyncEvent>,
}

impl FactoryEngine {
    /// Create an engine over the seeded demo factory
    pub fn new(
        simulation: SimulationConfig,
        responder: Arc<dyn Responder>,
        responder_timeout: Duration,
    ) -> Self {
        let mut rng = match simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let store = EntityStore::seeded(&mut rng, Utc::now(), simulation.production_window);
        Self::with_store(store, rng, simulation, responder, responder_timeout)
    }

    /// Create an engine over an explicit store and random source
    pub fn with_store(
        store: EntityStore,
        rng: StdRng,
        simulation: SimulationConfig,
        responder: Arc<dyn Responder>,
        responder_timeout: Duration,
    ) -> Self {
        let (sync_tx, _) = broadcast::channel(100);

        Self {
            state: Mutex::new(EngineState { store, rng }),
            simulator: TickSimulator::new(simulation),
            responder,
            responder_timeout,
            sync_tx,
        }
    }

    /// Build the engine described by the loaded configuration
    pub fn from_config(config: &FactoryConfig) -> Result<Self> {
        let responder = build_responder(&config.responder)?;
        info!(
            responder = responder.name(),
            seed = ?config.simulation.seed,
            "Factory engine initialized"
        );
        Ok(Self::new(
            config.simulation.clone(),
            responder,
            config.responder.timeout(),
        ))
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bump the revision and signal subscribers (call with the lock held)
    fn commit(&self, state: &mut EngineState, cause: SyncCause) -> u64 {
        let revision = state.store.bump_revision();
        // No subscribers is fine
        let _ = self.sync_tx.send(SyncEvent {
            revision,
            cause,
            timestamp: Utc::now(),
        });
        revision
    }

    /// Whole-state deep copy
    pub fn snapshot(&self) -> Snapshot {
        self.lock().store.snapshot()
    }

    pub fn revision(&self) -> u64 {
        self.lock().store.revision()
    }

    /// Subscribe to re-fetch signals
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sync_tx.subscribe()
    }

    /// Advance the simulation by one tick
    pub fn tick(&self) -> TickReport {
        let mut guard = self.lock();
        let state = &mut *guard;

        let report = self
            .simulator
            .step(&mut state.store, &mut state.rng, Utc::now());
        let revision = self.commit(state, SyncCause::Tick);

        for alert in &report.alerts {
            warn!(
                machine_id = %alert.machine_id,
                machine = %alert.machine_name,
                alert = ?alert.kind,
                "Machine alert raised"
            );
        }
        debug!(
            revision = revision,
            production_rate = report.sample.production_rate,
            "Tick applied"
        );

        report
    }

    /// Take a machine offline for maintenance
    pub fn schedule_maintenance(&self, machine_id: &str) -> Result<CommandOutcome, EngineError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let now = Utc::now();

        let machine = state
            .store
            .machine_mut(machine_id)
            .ok_or_else(|| EngineError::machine_not_found(machine_id))?;

        if machine.status == MachineStatus::Maintenance {
            return Ok(CommandOutcome::Unchanged);
        }

        machine.status = MachineStatus::Maintenance;
        machine.efficiency = 0.0;
        machine.issue_detected = Some(SCHEDULED_MAINTENANCE.to_string());
        machine.updated_at = now;
        let name = machine.name.clone();

        state.store.notifications.add(
            "Maintenance Scheduled",
            format!("Maintenance has been scheduled and started for {}.", name),
            NotificationKind::Info,
            now,
        );
        let revision = self.commit(state, SyncCause::MaintenanceScheduled);

        info!(machine_id = %machine_id, machine = %name, revision = revision, "Maintenance scheduled");
        Ok(CommandOutcome::Applied)
    }

    /// Bring a machine back online after maintenance
    pub fn complete_maintenance(&self, machine_id: &str) -> Result<CommandOutcome, EngineError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let now = Utc::now();

        let machine = state
            .store
            .machine_mut(machine_id)
            .ok_or_else(|| EngineError::machine_not_found(machine_id))?;

        if machine.status != MachineStatus::Maintenance {
            return Ok(CommandOutcome::Unchanged);
        }

        machine.status = MachineStatus::Operational;
        machine.efficiency = 100.0;
        machine.issue_detected = None;
        machine.last_maintenance = now;
        machine.next_maintenance = now + ChronoDuration::days(MAINTENANCE_CYCLE_DAYS);
        machine.updated_at = now;
        let name = machine.name.clone();

        state.store.notifications.add(
            "Maintenance Completed",
            format!("Maintenance completed successfully. {} is back online.", name),
            NotificationKind::Success,
            now,
        );
        let revision = self.commit(state, SyncCause::MaintenanceCompleted);

        info!(machine_id = %machine_id, machine = %name, revision = revision, "Maintenance completed");
        Ok(CommandOutcome::Applied)
    }

    /// Approve a pending optimization suggestion
    pub fn approve_optimization(&self, id: &str) -> Result<CommandOutcome, EngineError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let now = Utc::now();

        let suggestion = state
            .store
            .optimization_mut(id)
            .ok_or_else(|| EngineError::optimization_not_found(id))?;

        if suggestion.status != OptimizationStatus::Pending {
            return Ok(CommandOutcome::Unchanged);
        }

        suggestion.status = OptimizationStatus::Approved;
        suggestion.approved_at = Some(now);
        let title = suggestion.title.clone();

        state.store.notifications.add(
            "Optimization Approved",
            format!("'{}' has been approved and applied.", title),
            NotificationKind::Success,
            now,
        );
        let revision = self.commit(state, SyncCause::OptimizationApproved);

        info!(optimization_id = %id, revision = revision, "Optimization approved");
        Ok(CommandOutcome::Applied)
    }

    /// Reject a pending optimization suggestion (no notification)
    pub fn reject_optimization(&self, id: &str) -> Result<CommandOutcome, EngineError> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let suggestion = state
            .store
            .optimization_mut(id)
            .ok_or_else(|| EngineError::optimization_not_found(id))?;

        if suggestion.status != OptimizationStatus::Pending {
            return Ok(CommandOutcome::Unchanged);
        }

        suggestion.status = OptimizationStatus::Rejected;
        let revision = self.commit(state, SyncCause::OptimizationRejected);

        info!(optimization_id = %id, revision = revision, "Optimization rejected");
        Ok(CommandOutcome::Applied)
    }

    /// Mark a notification read; unknown or already-read ids are ignored
    pub fn mark_notification_read(&self, id: &str) -> CommandOutcome {
        let mut guard = self.lock();
        let state = &mut *guard;

        let outcome = state.store.notifications.mark_read(id);
        if outcome.is_applied() {
            self.commit(state, SyncCause::NotificationRead);
        }
        outcome
    }

    /// Append a user message and the assistant reply derived for it
    ///
    /// The user message is committed before the responder is consulted. The
    /// responder call is the only await point and is bounded by the configured
    /// timeout; any failure becomes [`FALLBACK_REPLY`]. If the returned future
    /// is dropped while waiting, the fallback reply is appended on drop so every
    /// user message still gets exactly one assistant message.
    pub async fn post_chat_message(&self, text: &str) -> ChatExchange {
        let (user, request) = {
            let mut guard = self.lock();
            let state = &mut *guard;

            let user = ChatMessage::new(text, ChatRole::User, Utc::now());
            state.store.chat.push(user.clone());
            self.commit(state, SyncCause::ChatMessage);

            let snapshot = state.store.snapshot();
            let request = ResponderRequest {
                system_context: build_system_context(&snapshot, text),
                user_message: text.to_string(),
            };
            (user, request)
        };

        let pending = PendingReply {
            engine: self,
            done: false,
        };

        let reply = match tokio::time::timeout(
            self.responder_timeout,
            self.responder.respond(&request),
        )
        .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!(responder = self.responder.name(), error = %e, "Responder failed, using fallback reply");
                FALLBACK_REPLY.to_string()
            }
            Err(_) => {
                warn!(
                    responder = self.responder.name(),
                    timeout_ms = self.responder_timeout.as_millis() as u64,
                    "Responder timed out, using fallback reply"
                );
                FALLBACK_REPLY.to_string()
            }
        };

        let assistant = pending.complete(reply);
        ChatExchange { user, assistant }
    }

    fn append_assistant_message(&self, reply: String) -> ChatMessage {
        let mut guard = self.lock();
        let state = &mut *guard;
        let assistant = ChatMessage::new(reply, ChatRole::Assistant, Utc::now());
        state.store.chat.push(assistant.clone());
        self.commit(state, SyncCause::ChatMessage);

        info!(chat_len = state.store.chat.len(), "Chat exchange recorded");
        assistant
    }
}

/// Owes the chat log one assistant message until completed
///
/// Dropped without [`PendingReply::complete`] (the posting future was
/// cancelled), it appends [`FALLBACK_REPLY`].
struct PendingReply<'a> {
    engine: &'a FactoryEngine,
    done: bool,
}

impl PendingReply<'_> {
    fn complete(mut self, reply: String) -> ChatMessage {
        self.done = true;
        self.engine.append_assistant_message(reply)
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if !self.done {
            warn!("Chat posting cancelled before a reply, using fallback reply");
            self.engine
                .append_assistant_message(FALLBACK_REPLY.to_string());
        }
    }
}
