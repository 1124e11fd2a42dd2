// Synchronization layer: whole-snapshot reads and re-fetch signals

mod event;
mod feed;
pub mod manager;
pub mod protocol;

pub use event::{SyncCause, SyncEvent};
pub use feed::{SnapshotFeed, SyncFrame};
pub use manager::ConnectionManager;
