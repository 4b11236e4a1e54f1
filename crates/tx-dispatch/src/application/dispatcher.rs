//! Tiered Transaction Dispatcher
//!
//! Drives one action through the managed relay, the signed meta-transaction
//! broadcast and the direct contract write, cheapest first.
//!
//! Each tier runs at most once per call and nothing is retried. Queue
//! insertion and nonce mutation only happen after a backend accepts the
//! submission.

use super::network_guard::WrongNetworkGuard;
use super::protocols::ActionProtocol;
use super::session::DispatchSession;
use crate::config::DispatchConfig;
use crate::domain::{
    check_capabilities, Action, ActionKind, BroadcastChannel, BroadcastOutcome, Capabilities,
    ContractCall, DispatchError, DispatchState, NonceClaim, OptimisticTransaction, PublicationId,
    RelayOutcome, RelayRejectionReason, SettledVia, Settlement, TargetRef, TxKey,
};
use crate::ports::{
    BroadcastApi, DispatchApi, NetworkSwitcher, NoopNavigator, PublicationNavigator,
    SystemTimeSource, TimeSource, WalletSigner,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// State history of one dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchAttempt {
    correlation_id: Uuid,
    state: DispatchState,
    history: Vec<DispatchState>,
}

impl DispatchAttempt {
    /// Fresh attempt in `Idle`.
    pub fn new(correlation_id: Uuid) -> Self {
        Self {
            correlation_id,
            state: DispatchState::Idle,
            history: vec![DispatchState::Idle],
        }
    }

    /// Correlation key of the action.
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Current state.
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Every state visited, in order.
    pub fn history(&self) -> &[DispatchState] {
        &self.history
    }

    /// Move to `next` if the state machine allows it.
    pub fn advance(&mut self, next: DispatchState) -> Result<(), DispatchError> {
        if !self.state.can_transition_to(next) {
            return Err(DispatchError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    fn into_history(self) -> Vec<DispatchState> {
        self.history
    }
}

/// Outcome of a dispatch together with the states it passed through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchReport {
    /// Settlement or the classified failure.
    pub outcome: Result<Settlement, DispatchError>,
    /// Visited states, `Idle` first.
    pub states: Vec<DispatchState>,
}

/// Outbound collaborators shared by every dispatcher of a session.
#[derive(Clone)]
pub struct DispatchPorts {
    /// Broadcast relay for signed payloads.
    pub broadcaster: Arc<dyn BroadcastApi>,
    /// Wallet for signatures and contract writes.
    pub wallet: Arc<dyn WalletSigner>,
    /// Wallet network control.
    pub switcher: Arc<dyn NetworkSwitcher>,
    /// Publication navigation after a publication settles.
    pub navigator: Arc<dyn PublicationNavigator>,
    /// Clock for optimistic entry timestamps.
    pub clock: Arc<dyn TimeSource>,
}

impl DispatchPorts {
    /// Ports with no navigation and the system clock.
    pub fn new(
        broadcaster: Arc<dyn BroadcastApi>,
        wallet: Arc<dyn WalletSigner>,
        switcher: Arc<dyn NetworkSwitcher>,
    ) -> Self {
        Self {
            broadcaster,
            wallet,
            switcher,
            navigator: Arc::new(NoopNavigator),
            clock: Arc::new(SystemTimeSource),
        }
    }

    /// Use `navigator` for publication navigation.
    pub fn with_navigator(mut self, navigator: Arc<dyn PublicationNavigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Use `clock` for timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }
}

/// Dispatcher for one action kind.
pub struct TransactionDispatcher<P: ActionProtocol> {
    protocol: P,
    session: Arc<DispatchSession>,
    ports: DispatchPorts,
    guard: WrongNetworkGuard,
    config: DispatchConfig,
}

impl<P: ActionProtocol> TransactionDispatcher<P> {
    /// Create a dispatcher bound to `session`.
    pub fn new(
        protocol: P,
        session: Arc<DispatchSession>,
        ports: DispatchPorts,
        config: DispatchConfig,
    ) -> Self {
        let guard = WrongNetworkGuard::new(ports.switcher.clone(), config.required_chain_id);
        Self {
            protocol,
            session,
            ports,
            guard,
            config,
        }
    }

    /// Session this dispatcher writes to.
    pub fn session(&self) -> &Arc<DispatchSession> {
        &self.session
    }

    /// Dispatch `action` and return the outcome with its state history.
    pub async fn dispatch_with_report(&self, action: Action<P::Request>) -> DispatchReport {
        let span = info_span!(
            "dispatch",
            kind = %action.kind(),
            correlation_id = %action.correlation_id
        );

        async move {
            let mut attempt = DispatchAttempt::new(action.correlation_id);
            let outcome = self.run(&action, &mut attempt).await;

            if let Err(err) = &outcome {
                if !attempt.state().is_terminal() {
                    attempt.advance(DispatchState::Failed).ok();
                }
                if err.is_precondition() {
                    info!(error = %err, "Dispatch refused");
                } else {
                    warn!(error = %err, "Dispatch failed");
                }
            }

            DispatchReport {
                outcome,
                states: attempt.into_history(),
            }
        }
        .instrument(span)
        .await
    }

    /// Drop queue entries older than the optimistic window.
    pub fn expire_stale(&self) -> usize {
        self.session
            .queue()
            .evict_expired(self.ports.clock.now(), self.config.optimistic_window())
    }

    async fn run(
        &self,
        action: &Action<P::Request>,
        attempt: &mut DispatchAttempt,
    ) -> Result<Settlement, DispatchError> {
        let account = self
            .session
            .account()
            .ok_or(DispatchError::Unauthenticated)?;
        if account.suspended {
            return Err(DispatchError::AccountSuspended);
        }
        let capabilities = check_capabilities(Some(&account));
        attempt.advance(DispatchState::Preparing)?;

        if let Some(call) = self.protocol.wallet_only_call(&action.request) {
            debug!(tier = "chain", "Wallet-only action");
            self.guard.ensure().await?;
            attempt.advance(DispatchState::Submitting)?;
            return self
                .write_on_chain(action, attempt, &call, &mut NonceClaim::default())
                .await;
        }

        if capabilities.can_use_managed_relay {
            if let Some(settlement) = self.managed_relay(action, attempt).await? {
                return Ok(settlement);
            }
        }

        self.meta_transaction(action, attempt, capabilities).await
    }

    /// Tier 1. `Ok(None)` means the relay declined with a reason that falls
    /// through.
    async fn managed_relay(
        &self,
        action: &Action<P::Request>,
        attempt: &mut DispatchAttempt,
    ) -> Result<Option<Settlement>, DispatchError> {
        attempt.advance(DispatchState::Submitting)?;
        debug!(tier = "managed_relay", "Submitting through managed relay");

        match self.protocol.relay_submit(&action.request).await? {
            RelayOutcome::Success {
                tx_id,
                publication_id,
            } => {
                let key = TxKey::TxId(tx_id);
                self.enqueue(action, key.clone());
                if let Some(id) = &publication_id {
                    self.navigate(action.kind(), id);
                }
                self.settle(action, attempt, SettledVia::Relay, Some(key), publication_id)
                    .map(Some)
            }
            RelayOutcome::Published { publication_id } => {
                self.navigate(action.kind(), &publication_id);
                self.settle(action, attempt, SettledVia::Relay, None, Some(publication_id))
                    .map(Some)
            }
            RelayOutcome::Rejected { reason } => {
                if self.config.relay_policy.is_terminal(reason) {
                    return Err(DispatchError::RelayRejected { reason });
                }
                info!(
                    tier = "managed_relay",
                    %reason,
                    "Managed relay declined, falling back to signed dispatch"
                );
                attempt.advance(DispatchState::Preparing)?;
                Ok(None)
            }
            RelayOutcome::TransientError { message } => {
                Err(DispatchError::TransientTransportError(message))
            }
        }
    }

    /// Tiers 2 and 3 from one signature.
    async fn meta_transaction(
        &self,
        action: &Action<P::Request>,
        attempt: &mut DispatchAttempt,
        capabilities: Capabilities,
    ) -> Result<Settlement, DispatchError> {
        let request = &action.request;
        let nonce = self.session.nonce().current();
        let envelope = self.protocol.request_typed_data(request, Some(nonce)).await?;
        debug!(tier = "meta_transaction", nonce, typed_data_id = %envelope.id, "Typed data ready");

        self.guard.ensure().await?;
        attempt.advance(DispatchState::AwaitingSignature)?;
        let signature = self
            .ports
            .wallet
            .sign_typed_data(&envelope.typed_data)
            .await
            .map_err(DispatchError::from_signature)?;
        attempt.advance(DispatchState::Submitting)?;

        let mut claim = NonceClaim::default();
        let channel = self.protocol.broadcast_channel(request);

        if capabilities.can_broadcast_meta_transaction || channel == BroadcastChannel::Momoka {
            debug!(tier = "broadcast", ?channel, "Broadcasting signed payload");
            match self
                .ports
                .broadcaster
                .broadcast(channel, &envelope.id, &signature)
                .await?
            {
                BroadcastOutcome::Success { tx_id } => {
                    let key = TxKey::TxId(tx_id);
                    self.enqueue(action, key.clone());
                    if channel == BroadcastChannel::OnChain {
                        claim.claim(self.session.nonce());
                    }
                    return self.settle(action, attempt, SettledVia::Relay, Some(key), None);
                }
                BroadcastOutcome::Published { publication_id } => {
                    self.navigate(action.kind(), &publication_id);
                    return self.settle(
                        action,
                        attempt,
                        SettledVia::Relay,
                        None,
                        Some(publication_id),
                    );
                }
                BroadcastOutcome::RelayError { reason } => {
                    if !self.protocol.supports_chain_write(request) {
                        return Err(DispatchError::RelayRejected {
                            reason: RelayRejectionReason::parse(&reason),
                        });
                    }
                    info!(
                        tier = "broadcast",
                        %reason,
                        "Broadcast relay failed, writing on chain"
                    );
                    attempt.advance(DispatchState::Submitting)?;
                }
            }
        }

        if !self.protocol.supports_chain_write(request) {
            return Err(DispatchError::ChainWriteRejected {
                reason: format!("{} has no contract write path", action.kind()),
            });
        }
        let call = self.protocol.chain_call(request, &envelope.typed_data)?;
        self.write_on_chain(action, attempt, &call, &mut claim).await
    }

    /// Tier 3.
    async fn write_on_chain(
        &self,
        action: &Action<P::Request>,
        attempt: &mut DispatchAttempt,
        call: &ContractCall,
        claim: &mut NonceClaim,
    ) -> Result<Settlement, DispatchError> {
        debug!(tier = "chain", function = %call.function, address = %call.address, "Writing contract");

        match self.ports.wallet.write_contract(call).await {
            Ok(tx_hash) => {
                let key = TxKey::TxHash(tx_hash);
                self.enqueue(action, key.clone());
                self.settle(action, attempt, SettledVia::Chain, Some(key), None)
            }
            Err(err) => {
                // No-op unless this attempt claimed the nonce.
                claim.release(self.session.nonce());
                Err(DispatchError::from_chain_write(err))
            }
        }
    }

    fn enqueue(&self, action: &Action<P::Request>, key: TxKey) {
        let entry = OptimisticTransaction::for_action(action, key, self.ports.clock.now());
        self.session.queue().append(entry);
    }

    fn navigate(&self, kind: ActionKind, publication_id: &PublicationId) {
        match kind {
            ActionKind::Post | ActionKind::Quote => self.ports.navigator.open(publication_id),
            ActionKind::Comment => self.ports.navigator.refresh(publication_id),
            ActionKind::Follow | ActionKind::Unfollow | ActionKind::LinkHandle => {}
        }
    }

    fn settle(
        &self,
        action: &Action<P::Request>,
        attempt: &mut DispatchAttempt,
        via: SettledVia,
        key: Option<TxKey>,
        publication_id: Option<PublicationId>,
    ) -> Result<Settlement, DispatchError> {
        attempt.advance(DispatchState::Settled(via))?;
        info!(
            ?via,
            tx_id = key.as_ref().and_then(TxKey::tx_id),
            tx_hash = key.as_ref().and_then(TxKey::tx_hash),
            nonce = self.session.nonce().current(),
            "Dispatch settled"
        );
        Ok(Settlement {
            correlation_id: action.correlation_id,
            via,
            key,
            publication_id,
        })
    }
}

#[async_trait]
impl<P: ActionProtocol> DispatchApi<P::Request> for TransactionDispatcher<P> {
    async fn dispatch(&self, action: Action<P::Request>) -> Result<Settlement, DispatchError> {
        self.dispatch_with_report(action).await.outcome
    }

    fn pending(&self) -> Vec<OptimisticTransaction> {
        self.expire_stale();
        self.session.queue().newest_first()
    }

    fn is_pending(&self, target: &TargetRef, kind: ActionKind) -> bool {
        self.expire_stale();
        self.session.queue().is_pending(target, kind)
    }
}
