use crate::state::{FactoryEngine, Snapshot};
use crate::sync::{SyncCause, SyncEvent};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

/// One whole-state refresh handed to a reader
#[derive(Clone, Debug)]
pub struct SyncFrame {
    pub cause: SyncCause,
    pub snapshot: Snapshot,
}

/// Polling-style reader of the engine
///
/// Yields the initial snapshot first, then a freshly fetched whole snapshot
/// after every tick or applied command. Signals for revisions the reader has
/// already seen are skipped, so a burst of mutations can collapse into one
/// frame. Falling behind the signal channel only triggers a re-fetch.
pub struct SnapshotFeed {
    engine: Arc<FactoryEngine>,
    rx: broadcast::Receiver<SyncEvent>,
    last_revision: Option<u64>,
}

impl SnapshotFeed {
    /// Subscribe before the first read so no mutation can slip between them
    pub fn new(engine: Arc<FactoryEngine>) -> Self {
        let rx = engine.subscribe();
        Self {
            engine,
            rx,
            last_revision: None,
        }
    }

    /// Current whole snapshot, without waiting for a signal
    pub fn get_all(&self) -> Snapshot {
        self.engine.snapshot()
    }

    fn fetch(&mut self, cause: SyncCause) -> SyncFrame {
        let snapshot = self.engine.snapshot();
        self.last_revision = Some(snapshot.revision);
        SyncFrame { cause, snapshot }
    }

    /// Wait for the next refresh; `None` once the engine is gone
    pub async fn next(&mut self) -> Option<SyncFrame> {
        let seen = match self.last_revision {
            None => return Some(self.fetch(SyncCause::InitialLoad)),
            Some(revision) => revision,
        };

        loop {
            match self.rx.recv().await {
                Ok(event) if event.revision <= seen => continue,
                Ok(event) => return Some(self.fetch(event.cause)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Snapshot feed lagged, re-fetching");
                    return Some(self.fetch(SyncCause::Resync));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::KeywordResponder;
    use crate::state::SimulationConfig;
    use std::time::Duration;

    fn engine() -> Arc<FactoryEngine> {
        Arc::new(FactoryEngine::new(
            SimulationConfig {
                seed: Some(3),
                ..SimulationConfig::default()
            },
            Arc::new(KeywordResponder::new()),
            Duration::from_secs(1),
        ))
    }

    #[tokio::test]
    async fn test_initial_load_then_tick() {
        let engine = engine();
        let mut feed = SnapshotFeed::new(engine.clone());

        let first = feed.next().await.unwrap();
        assert_eq!(first.cause, SyncCause::InitialLoad);
        assert_eq!(first.snapshot.revision, 0);

        engine.tick();

        let second = feed.next().await.unwrap();
        assert_eq!(second.cause, SyncCause::Tick);
        assert_eq!(second.snapshot.revision, 1);
    }

    #[tokio::test]
    async fn test_refetch_after_command() {
        let engine = engine();
        let mut feed = SnapshotFeed::new(engine.clone());
        let initial = feed.next().await.unwrap().snapshot;
        let machine_id = initial.machines[0].id.clone();

        engine.schedule_maintenance(&machine_id).unwrap();

        let frame = feed.next().await.unwrap();
        assert_eq!(frame.cause, SyncCause::MaintenanceScheduled);
        assert_eq!(
            frame.snapshot.machine(&machine_id).unwrap().status,
            crate::entity::MachineStatus::Maintenance
        );
    }

    #[tokio::test]
    async fn test_stale_signals_are_coalesced() {
        let engine = engine();
        let mut feed = SnapshotFeed::new(engine.clone());
        feed.next().await.unwrap();

        engine.tick();
        engine.tick();
        engine.tick();

        // First signal triggers a fetch at revision 3; the other two are stale
        let frame = feed.next().await.unwrap();
        assert_eq!(frame.snapshot.revision, 3);

        engine.tick();
        let frame = feed.next().await.unwrap();
        assert_eq!(frame.snapshot.revision, 4);
    }

    #[tokio::test]
    async fn test_noop_command_does_not_signal() {
        let engine = engine();
        let mut feed = SnapshotFeed::new(engine.clone());
        feed.next().await.unwrap();

        engine.mark_notification_read("missing");

        let pending = tokio::time::timeout(Duration::from_millis(50), feed.next()).await;
        assert!(pending.is_err());
    }

    #[test]
    fn test_get_all_matches_engine() {
        let engine = engine();
        let feed = SnapshotFeed::new(engine.clone());
        assert_eq!(feed.get_all().machines, engine.snapshot().machines);
    }
}
