use crate::state::FactoryEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

/// Handle to the background tick loop
///
/// Dropping the handle leaves the loop running; call [`TickerHandle::stop`]
/// for teardown.
pub struct TickerHandle {
    handle: JoinHandle<()>,
}

impl TickerHandle {
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the loop. A tick already applied is never rolled back; aborting
    /// can only land between ticks since each tick runs without yielding.
    pub async fn stop(self) {
        self.handle.abort();
        let _ = self.handle.await;
        info!("Tick loop stopped");
    }
}

/// Spawn the periodic simulation loop on the current runtime
pub fn spawn_ticker(engine: Arc<FactoryEngine>, period: Duration) -> TickerHandle {
    TickerHandle {
        handle: tokio::spawn(run_tick_loop(engine, period)),
    }
}

/// Tick the engine every `period`
pub async fn run_tick_loop(engine: Arc<FactoryEngine>, period: Duration) {
    let mut ticker = interval(period);

    // Skip missed ticks to prevent backlog under load
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // First tick completes immediately; the seeded state is the initial load
    ticker.tick().await;

    info!(period_ms = period.as_millis() as u64, "Tick loop started");

    loop {
        ticker.tick().await;
        engine.tick();
    }
}
