// Cooldown tracker - suppresses duplicate alerts of the same kind
//
// Keeps a per-key last-sent timestamp map (epoch milliseconds) and refuses
// a key that fired within the last five minutes. The map is only marked on
// a successful dispatch: a suppressed or fully-ineligible attempt never
// extends the window, so the next eligible attempt goes through as soon as
// the window allows.

use crate::notifications::NotificationRequest;
use crate::storage;
use std::collections::HashMap;
use std::path::PathBuf;

/// Minimum interval between two dispatches of the same cooldown key.
pub const COOLDOWN_MS: i64 = 5 * 60 * 1000;

#[derive(Debug)]
pub struct CooldownTracker {
    path: PathBuf,
    last_sent: HashMap<String, i64>,
}

impl CooldownTracker {
    /// Load the persisted map, falling back to empty on a missing or
    /// malformed blob.
    pub fn load(path: PathBuf) -> Self {
        let last_sent = storage::load_or_default(&path);
        Self { path, last_sent }
    }

    /// True iff the request's key has never been sent, or was last sent at
    /// least the cooldown window ago.
    pub fn can_send(&self, request: &NotificationRequest, now_ms: i64) -> bool {
        let last = self
            .last_sent
            .get(&request.cooldown_key())
            .copied()
            .unwrap_or(0);
        now_ms - last >= COOLDOWN_MS
    }

    /// Record a successful dispatch and persist immediately.
    pub fn mark_sent(&mut self, request: &NotificationRequest, now_ms: i64) {
        self.last_sent.insert(request.cooldown_key(), now_ms);
        if let Err(e) = storage::save(&self.path, &self.last_sent) {
            tracing::warn!("Failed to persist cooldown state: {:?}", e);
        }
    }

    #[cfg(test)]
    pub(crate) fn last_sent_for(&self, key: &str) -> Option<i64> {
        self.last_sent.get(key).copied()
    }
}
