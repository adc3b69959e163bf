// History log - bounded record of dispatch attempts
//
// Most-recent-first, capped at 100 entries: appending the 101st evicts the
// oldest. Both sent and unsent (all channels ineligible) attempts are
// recorded for audit; cooldown-suppressed attempts never reach the log.
// Persisted as a JSON blob with the same parse-or-default guard as the
// other state files.

use crate::notifications::{ChannelKind, NotificationRequest};
use crate::storage;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::PathBuf;

/// Maximum number of history entries kept.
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// One recorded dispatch attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// Snapshot of the request as dispatched, resolved priority included.
    pub request: NotificationRequest,
    pub sent: bool,
    /// Channels that attempted delivery, in email-then-desktop order.
    pub channels: Vec<ChannelKind>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl HistoryEntry {
    pub fn record(
        request: NotificationRequest,
        sent: bool,
        channels: Vec<ChannelKind>,
        created_at: i64,
    ) -> Self {
        Self {
            id: generate_id(),
            request,
            sent,
            channels,
            created_at,
        }
    }
}

/// Generate a unique entry id: epoch millis plus a process-local counter,
/// so back-to-back entries within one millisecond still differ.
fn generate_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let count = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", Utc::now().timestamp_millis(), count)
}

/// Bounded most-recent-first dispatch log.
#[derive(Debug)]
pub struct HistoryLog {
    path: PathBuf,
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    /// Load the persisted log, falling back to empty on a missing or
    /// malformed blob. Oversized blobs are trimmed back to the cap.
    pub fn load(path: PathBuf) -> Self {
        let mut entries: VecDeque<HistoryEntry> = storage::load_or_default(&path);
        entries.truncate(MAX_HISTORY_ENTRIES);
        Self { path, entries }
    }

    /// Prepend an entry (most recent first), evicting the oldest past the
    /// cap, and persist.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(MAX_HISTORY_ENTRIES);
        self.persist();
    }

    /// Snapshot of the current entries; not live-updating.
    pub fn get_all(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empty the log and delete the persisted blob.
    pub fn clear(&mut self) {
        self.entries.clear();
        storage::remove(&self.path);
    }

    fn persist(&self) {
        if let Err(e) = storage::save(&self.path, &self.entries) {
            tracing::warn!("Failed to persist notification history: {:?}", e);
        }
    }
}
