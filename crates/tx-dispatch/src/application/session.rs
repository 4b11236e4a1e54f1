//! Session-scoped dispatch state.

use crate::domain::{Account, OptimisticActionQueue, SigningNonceCounter};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// State shared by every dispatcher of one signed-in account.
///
/// Created when the account session starts and ended when it ends; the
/// nonce counter and queue never outlive it.
#[derive(Debug)]
pub struct DispatchSession {
    account: RwLock<Option<Account>>,
    nonce: Arc<SigningNonceCounter>,
    queue: Arc<OptimisticActionQueue>,
}

impl DispatchSession {
    /// Start a session for `account` at its on-chain signature nonce.
    pub fn start(account: Account, initial_nonce: u64) -> Self {
        info!(account = %account.id, initial_nonce, "Dispatch session started");
        Self {
            account: RwLock::new(Some(account)),
            nonce: Arc::new(SigningNonceCounter::new(initial_nonce)),
            queue: Arc::new(OptimisticActionQueue::new()),
        }
    }

    /// Session with no signed-in account.
    pub fn anonymous() -> Self {
        Self {
            account: RwLock::new(None),
            nonce: Arc::new(SigningNonceCounter::default()),
            queue: Arc::new(OptimisticActionQueue::new()),
        }
    }

    /// Snapshot of the active account.
    pub fn account(&self) -> Option<Account> {
        self.account.read().clone()
    }

    /// Replace the account snapshot, e.g. after permissions change.
    pub fn replace_account(&self, account: Account) {
        *self.account.write() = Some(account);
    }

    /// Signing nonce counter.
    pub fn nonce(&self) -> &SigningNonceCounter {
        &self.nonce
    }

    /// Optimistic queue.
    pub fn queue(&self) -> &OptimisticActionQueue {
        &self.queue
    }

    /// Sign out: drop the account, pending entries and nonce estimate.
    pub fn end(&self) {
        if let Some(account) = self.account.write().take() {
            info!(account = %account.id, pending = self.queue.len(), "Dispatch session ended");
        }
        self.queue.clear();
        self.nonce.reset(0);
    }
}
