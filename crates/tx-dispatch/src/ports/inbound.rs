//! # Inbound Ports
//!
//! What the UI layer calls: one dispatch entry point per action kind plus
//! read access to pending state.

use crate::domain::{
    Action, ActionKind, ActionRequest, DispatchError, OptimisticTransaction, Settlement, TargetRef,
};
use async_trait::async_trait;

/// Dispatch API for one action kind.
#[async_trait]
pub trait DispatchApi<R: ActionRequest>: Send + Sync {
    /// Drive `action` through the submission tiers to a terminal outcome.
    ///
    /// `Ok` with [`SettledVia::Relay`](crate::domain::SettledVia) or
    /// [`SettledVia::Chain`](crate::domain::SettledVia) on success; `Err`
    /// carries the classified failure of the last tier attempted.
    async fn dispatch(&self, action: Action<R>) -> Result<Settlement, DispatchError>;

    /// Pending optimistic entries, newest first.
    fn pending(&self) -> Vec<OptimisticTransaction>;

    /// Whether an action of `kind` against `target` is still outstanding.
    fn is_pending(&self, target: &TargetRef, kind: ActionKind) -> bool;
}
