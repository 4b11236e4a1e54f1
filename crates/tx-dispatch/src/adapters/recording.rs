//! Recording navigator and manual clock.

use crate::domain::{PublicationId, Timestamp};
use crate::ports::outbound::{PublicationNavigator, TimeSource};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Navigator that records every request.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    opened: Mutex<Vec<PublicationId>>,
    refreshed: Mutex<Vec<PublicationId>>,
}

impl RecordingNavigator {
    /// Create navigator
    pub fn new() -> Self {
        Self::default()
    }

    /// Publications opened.
    pub fn opened(&self) -> Vec<PublicationId> {
        self.opened.lock().clone()
    }

    /// Publications refreshed in place.
    pub fn refreshed(&self) -> Vec<PublicationId> {
        self.refreshed.lock().clone()
    }
}

impl PublicationNavigator for RecordingNavigator {
    fn open(&self, publication_id: &PublicationId) {
        self.opened.lock().push(publication_id.clone());
    }

    fn refresh(&self, publication_id: &PublicationId) {
        self.refreshed.lock().push(publication_id.clone());
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    now: AtomicU64,
}

impl ManualTimeSource {
    /// Clock at `start` ms.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Move forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Jump to `now`.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
