//! # Signing Nonce
//!
//! Client-estimated next nonce for meta-transaction signature requests.
//!
//! When several signature-requiring actions are fired before the first one
//! is confirmed on chain, each typed-data request must carry the *next*
//! nonce as an explicit override instead of the stale on-chain value. The
//! counter is advisory: the chain stays the source of truth.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Process-scoped signing nonce for the active account.
#[derive(Debug, Default)]
pub struct SigningNonceCounter {
    value: AtomicU64,
}

impl SigningNonceCounter {
    /// Start at the account's on-chain nonce.
    pub fn new(initial: u64) -> Self {
        Self {
            value: AtomicU64::new(initial),
        }
    }

    /// Current estimate.
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Advance by one, returning the new value.
    pub fn increment(&self) -> u64 {
        let next = self.value.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(nonce = next, "Signing nonce incremented");
        next
    }

    /// Step back by one, clamped at zero. Returns the new value.
    pub fn decrement(&self) -> u64 {
        match self
            .value
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1))
        {
            Ok(previous) => {
                debug!(nonce = previous - 1, "Signing nonce decremented");
                previous - 1
            }
            Err(_) => {
                warn!("Signing nonce decrement below zero clamped");
                0
            }
        }
    }

    /// Overwrite, e.g. after re-reading the on-chain nonce at session start.
    pub fn reset(&self, value: u64) {
        self.value.store(value, Ordering::SeqCst);
    }
}

/// Per-attempt record of whether this dispatch advanced the nonce.
///
/// `release` only undoes a prior `claim`, and only once.
#[derive(Debug, Default)]
pub struct NonceClaim {
    claimed: bool,
}

impl NonceClaim {
    /// Increment the counter on behalf of this attempt.
    pub fn claim(&mut self, counter: &SigningNonceCounter) {
        if !self.claimed {
            counter.increment();
            self.claimed = true;
        }
    }

    /// Compensate a prior claim after a later write failed.
    pub fn release(&mut self, counter: &SigningNonceCounter) {
        if self.claimed {
            counter.decrement();
            self.claimed = false;
        }
    }

    /// Whether the counter is currently advanced for this attempt.
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }
}
