use crate::entity::{new_entity_id, Notification, NotificationKind};
use crate::state::CommandOutcome;
use chrono::{DateTime, Utc};

/// Append-only notification inbox, most recent first
///
/// Entries are never removed; the only mutation is flipping `read` to true.
#[derive(Clone, Debug, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from existing entries, already ordered most recent first
    pub fn from_entries(entries: Vec<Notification>) -> Self {
        Self { entries }
    }

    /// Prepend a new unread notification and return a copy of it
    pub fn add(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
        now: DateTime<Utc>,
    ) -> Notification {
        let notification = Notification {
            id: new_entity_id(),
            title: title.into(),
            message: message.into(),
            kind,
            read: false,
            created_at: now,
        };
        self.entries.insert(0, notification.clone());
        notification
    }

    /// Mark one notification as read
    ///
    /// Unknown ids and already-read notifications are left alone.
    pub fn mark_read(&mut self, id: &str) -> CommandOutcome {
        match self.entries.iter_mut().find(|n| n.id == id) {
            Some(notification) if !notification.read => {
                notification.read = true;
                CommandOutcome::Applied
            }
            _ => CommandOutcome::Unchanged,
        }
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }
}
