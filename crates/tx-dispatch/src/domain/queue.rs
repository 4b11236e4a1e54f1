//! # Optimistic Action Queue
//!
//! Locally originated actions that a backend accepted but the indexer has
//! not yet confirmed. Consumers render them most-recent-first and use
//! [`OptimisticActionQueue::is_pending`] to disable duplicate actions.
//!
//! ```text
//! [ACCEPTED] ──append──→ [QUEUED] ──reconcile / evict_expired──→ [REMOVED]
//! ```
//!
//! Entries are never mutated in place. The dispatcher only appends; out of
//! band confirmation and readers past the optimistic window only remove.

use super::entities::OptimisticTransaction;
use super::value_objects::{AccountId, ActionKind, TargetRef, Timestamp};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

/// Shared, lock-guarded list of pending actions in insertion order.
#[derive(Debug, Default)]
pub struct OptimisticActionQueue {
    entries: Mutex<Vec<OptimisticTransaction>>,
}

impl OptimisticActionQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an accepted action at the end.
    pub fn append(&self, entry: OptimisticTransaction) {
        debug!(
            kind = %entry.kind,
            key = entry.key.as_str(),
            "Queued optimistic transaction"
        );
        self.entries.lock().push(entry);
    }

    /// Remove every entry whose tx id or tx hash is in `confirmed`.
    ///
    /// Returns how many entries were removed.
    pub fn reconcile(&self, confirmed: &HashSet<String>) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|entry| !confirmed.contains(entry.key.as_str()));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "Reconciled optimistic queue");
        }
        removed
    }

    /// Remove entries created more than `window` before `now`.
    pub fn evict_expired(&self, now: Timestamp, window: Duration) -> usize {
        let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|entry| now.saturating_sub(entry.created_at) <= window_ms);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, remaining = entries.len(), "Evicted expired optimistic entries");
        }
        evicted
    }

    /// Is an action of `kind` against `target` still outstanding?
    pub fn is_pending(&self, target: &TargetRef, kind: ActionKind) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|entry| entry.kind == kind && &entry.target == target)
    }

    /// Pending follow of `profile_id`.
    pub fn is_follow_pending(&self, profile_id: &AccountId) -> bool {
        self.is_pending(&TargetRef::Account(profile_id.clone()), ActionKind::Follow)
    }

    /// Pending unfollow of `profile_id`.
    pub fn is_unfollow_pending(&self, profile_id: &AccountId) -> bool {
        self.is_pending(&TargetRef::Account(profile_id.clone()), ActionKind::Unfollow)
    }

    /// Snapshot in insertion order (oldest first).
    pub fn entries(&self) -> Vec<OptimisticTransaction> {
        self.entries.lock().clone()
    }

    /// Snapshot in render order (newest first).
    pub fn newest_first(&self) -> Vec<OptimisticTransaction> {
        let mut entries = self.entries();
        entries.reverse();
        entries
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// No pending entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop everything (session teardown).
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
