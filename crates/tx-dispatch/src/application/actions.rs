//! Social action façade.

use super::dispatcher::{DispatchPorts, TransactionDispatcher};
use super::protocols::{FollowProtocol, LinkHandleProtocol, PublicationProtocol, UnfollowProtocol};
use super::session::DispatchSession;
use crate::config::DispatchConfig;
use crate::domain::{
    AccountId, Action, DispatchError, FollowRequest, LinkHandleRequest, OptimisticTransaction,
    PublicationId, PublicationKind, PublicationLayer, PublicationRequest, Settlement,
    UnfollowRequest,
};
use crate::ports::{DispatchApi, SocialApi, TimeSource};
use std::sync::Arc;
use std::time::Duration;

/// One dispatcher per action kind over a shared session.
pub struct SocialActions {
    session: Arc<DispatchSession>,
    clock: Arc<dyn TimeSource>,
    window: Duration,
    follows: TransactionDispatcher<FollowProtocol>,
    unfollows: TransactionDispatcher<UnfollowProtocol>,
    handles: TransactionDispatcher<LinkHandleProtocol>,
    publications: TransactionDispatcher<PublicationProtocol>,
}

impl SocialActions {
    /// Wire every dispatcher to `session`.
    pub fn new(
        session: Arc<DispatchSession>,
        api: Arc<dyn SocialApi>,
        ports: DispatchPorts,
        config: DispatchConfig,
    ) -> Self {
        let contracts = config.contracts.clone();
        let clock = ports.clock.clone();
        let window = config.optimistic_window();
        Self {
            follows: TransactionDispatcher::new(
                FollowProtocol::new(api.clone(), contracts.clone()),
                session.clone(),
                ports.clone(),
                config.clone(),
            ),
            unfollows: TransactionDispatcher::new(
                UnfollowProtocol::new(api.clone(), contracts.clone()),
                session.clone(),
                ports.clone(),
                config.clone(),
            ),
            handles: TransactionDispatcher::new(
                LinkHandleProtocol::new(api.clone(), contracts.clone()),
                session.clone(),
                ports.clone(),
                config.clone(),
            ),
            publications: TransactionDispatcher::new(
                PublicationProtocol::new(api, contracts),
                session.clone(),
                ports,
                config,
            ),
            session,
            clock,
            window,
        }
    }

    /// Shared session.
    pub fn session(&self) -> &Arc<DispatchSession> {
        &self.session
    }

    /// Follow `profile_id`.
    pub async fn follow(&self, profile_id: AccountId) -> Result<Settlement, DispatchError> {
        self.follows
            .dispatch(Action::new(FollowRequest { profile_id }))
            .await
    }

    /// Unfollow `profile_id`.
    pub async fn unfollow(&self, profile_id: AccountId) -> Result<Settlement, DispatchError> {
        self.unfollows
            .dispatch(Action::new(UnfollowRequest { profile_id }))
            .await
    }

    /// Link `handle` to the active profile.
    pub async fn link_handle(&self, handle: impl Into<String>) -> Result<Settlement, DispatchError> {
        self.handles
            .dispatch(Action::new(LinkHandleRequest {
                handle: handle.into(),
            }))
            .await
    }

    /// Root post.
    pub async fn post(
        &self,
        content_uri: impl Into<String>,
        layer: PublicationLayer,
    ) -> Result<Settlement, DispatchError> {
        self.publish(PublicationKind::Post, content_uri.into(), layer)
            .await
    }

    /// Comment on `parent`.
    pub async fn comment(
        &self,
        parent: PublicationId,
        content_uri: impl Into<String>,
        layer: PublicationLayer,
    ) -> Result<Settlement, DispatchError> {
        self.publish(PublicationKind::Comment { on: parent }, content_uri.into(), layer)
            .await
    }

    /// Quote `parent`.
    pub async fn quote(
        &self,
        parent: PublicationId,
        content_uri: impl Into<String>,
        layer: PublicationLayer,
    ) -> Result<Settlement, DispatchError> {
        self.publish(PublicationKind::Quote { on: parent }, content_uri.into(), layer)
            .await
    }

    async fn publish(
        &self,
        kind: PublicationKind,
        content_uri: String,
        layer: PublicationLayer,
    ) -> Result<Settlement, DispatchError> {
        self.publications
            .dispatch(Action::new(PublicationRequest {
                kind,
                content_uri,
                layer,
            }))
            .await
    }

    /// Pending optimistic entries, newest first.
    pub fn pending(&self) -> Vec<OptimisticTransaction> {
        self.expire_stale();
        self.session.queue().newest_first()
    }

    /// Whether a follow of `profile_id` is outstanding.
    pub fn is_follow_pending(&self, profile_id: &AccountId) -> bool {
        self.expire_stale();
        self.session.queue().is_follow_pending(profile_id)
    }

    /// Whether an unfollow of `profile_id` is outstanding.
    pub fn is_unfollow_pending(&self, profile_id: &AccountId) -> bool {
        self.expire_stale();
        self.session.queue().is_unfollow_pending(profile_id)
    }

    fn expire_stale(&self) {
        self.session
            .queue()
            .evict_expired(self.clock.now(), self.window);
    }
}
