//! Per-kind dispatch protocols.
//!
//! Each protocol binds one action kind to its relay mutation, typed-data
//! mutation and contract write. The dispatcher drives the tiers; protocols
//! only translate.

use crate::config::ContractAddresses;
use crate::domain::{
    ActionRequest, BroadcastChannel, ContractCall, DispatchError, FollowRequest,
    LinkHandleRequest, PublicationKind, PublicationLayer, PublicationRequest, RelayOutcome,
    TypedData, TypedDataEnvelope, UnfollowRequest,
};
use crate::ports::SocialApi;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Kind-specific half of a dispatch.
#[async_trait]
pub trait ActionProtocol: Send + Sync {
    /// Request type this protocol dispatches.
    type Request: ActionRequest;

    /// Tier 1: submit through the managed relay.
    async fn relay_submit(&self, request: &Self::Request) -> Result<RelayOutcome, DispatchError>;

    /// Tier 2: request typed data to sign.
    async fn request_typed_data(
        &self,
        request: &Self::Request,
        nonce_override: Option<u64>,
    ) -> Result<TypedDataEnvelope, DispatchError>;

    /// Tier 3: build the contract write from signed typed data.
    fn chain_call(
        &self,
        request: &Self::Request,
        typed_data: &TypedData,
    ) -> Result<ContractCall, DispatchError>;

    /// Broadcast endpoint for the signed payload.
    fn broadcast_channel(&self, _request: &Self::Request) -> BroadcastChannel {
        BroadcastChannel::OnChain
    }

    /// Whether a failed broadcast may fall through to a contract write.
    fn supports_chain_write(&self, _request: &Self::Request) -> bool {
        true
    }

    /// A contract call assembled straight from the request, bypassing the
    /// relay tiers.
    fn wallet_only_call(&self, _request: &Self::Request) -> Option<ContractCall> {
        None
    }
}

fn field<'a>(typed_data: &'a TypedData, name: &str) -> Result<&'a Value, DispatchError> {
    typed_data
        .value
        .get(name)
        .ok_or_else(|| DispatchError::ChainWriteRejected {
            reason: format!("typed data is missing `{name}`"),
        })
}

fn require_object(typed_data: &TypedData) -> Result<(), DispatchError> {
    if typed_data.value.is_object() {
        Ok(())
    } else {
        Err(DispatchError::ChainWriteRejected {
            reason: "typed data value is not an object".to_string(),
        })
    }
}

/// Follow a profile.
pub struct FollowProtocol {
    api: Arc<dyn SocialApi>,
    contracts: ContractAddresses,
}

impl FollowProtocol {
    /// Create protocol
    pub fn new(api: Arc<dyn SocialApi>, contracts: ContractAddresses) -> Self {
        Self { api, contracts }
    }
}

#[async_trait]
impl ActionProtocol for FollowProtocol {
    type Request = FollowRequest;

    async fn relay_submit(&self, request: &FollowRequest) -> Result<RelayOutcome, DispatchError> {
        Ok(self.api.follow(request).await?)
    }

    async fn request_typed_data(
        &self,
        request: &FollowRequest,
        nonce_override: Option<u64>,
    ) -> Result<TypedDataEnvelope, DispatchError> {
        Ok(self
            .api
            .create_follow_typed_data(request, nonce_override)
            .await?)
    }

    fn chain_call(
        &self,
        _request: &FollowRequest,
        typed_data: &TypedData,
    ) -> Result<ContractCall, DispatchError> {
        let args = vec![
            field(typed_data, "followerProfileId")?.clone(),
            field(typed_data, "idsOfProfilesToFollow")?.clone(),
            field(typed_data, "followTokenIds")?.clone(),
            field(typed_data, "datas")?.clone(),
        ];
        Ok(ContractCall {
            address: self.contracts.hub.clone(),
            function: "follow".to_string(),
            args,
        })
    }
}

/// Unfollow a profile.
pub struct UnfollowProtocol {
    api: Arc<dyn SocialApi>,
    contracts: ContractAddresses,
}

impl UnfollowProtocol {
    /// Create protocol
    pub fn new(api: Arc<dyn SocialApi>, contracts: ContractAddresses) -> Self {
        Self { api, contracts }
    }
}

#[async_trait]
impl ActionProtocol for UnfollowProtocol {
    type Request = UnfollowRequest;

    async fn relay_submit(&self, request: &UnfollowRequest) -> Result<RelayOutcome, DispatchError> {
        Ok(self.api.unfollow(request).await?)
    }

    async fn request_typed_data(
        &self,
        request: &UnfollowRequest,
        nonce_override: Option<u64>,
    ) -> Result<TypedDataEnvelope, DispatchError> {
        Ok(self
            .api
            .create_unfollow_typed_data(request, nonce_override)
            .await?)
    }

    fn chain_call(
        &self,
        _request: &UnfollowRequest,
        typed_data: &TypedData,
    ) -> Result<ContractCall, DispatchError> {
        let args = vec![
            field(typed_data, "unfollowerProfileId")?.clone(),
            field(typed_data, "idsOfProfilesToUnfollow")?.clone(),
        ];
        Ok(ContractCall {
            address: self.contracts.hub.clone(),
            function: "unfollow".to_string(),
            args,
        })
    }
}

/// Link a handle to the active profile.
pub struct LinkHandleProtocol {
    api: Arc<dyn SocialApi>,
    contracts: ContractAddresses,
}

impl LinkHandleProtocol {
    /// Create protocol
    pub fn new(api: Arc<dyn SocialApi>, contracts: ContractAddresses) -> Self {
        Self { api, contracts }
    }
}

#[async_trait]
impl ActionProtocol for LinkHandleProtocol {
    type Request = LinkHandleRequest;

    async fn relay_submit(
        &self,
        request: &LinkHandleRequest,
    ) -> Result<RelayOutcome, DispatchError> {
        Ok(self.api.link_handle(request).await?)
    }

    async fn request_typed_data(
        &self,
        request: &LinkHandleRequest,
        nonce_override: Option<u64>,
    ) -> Result<TypedDataEnvelope, DispatchError> {
        Ok(self
            .api
            .create_link_handle_typed_data(request, nonce_override)
            .await?)
    }

    fn chain_call(
        &self,
        _request: &LinkHandleRequest,
        typed_data: &TypedData,
    ) -> Result<ContractCall, DispatchError> {
        require_object(typed_data)?;
        Ok(ContractCall {
            address: self.contracts.handle_registry.clone(),
            function: "link".to_string(),
            args: vec![typed_data.value.clone()],
        })
    }
}

/// Post, comment or quote, on-chain or on Momoka.
pub struct PublicationProtocol {
    api: Arc<dyn SocialApi>,
    contracts: ContractAddresses,
}

impl PublicationProtocol {
    /// Create protocol
    pub fn new(api: Arc<dyn SocialApi>, contracts: ContractAddresses) -> Self {
        Self { api, contracts }
    }
}

#[async_trait]
impl ActionProtocol for PublicationProtocol {
    type Request = PublicationRequest;

    async fn relay_submit(
        &self,
        request: &PublicationRequest,
    ) -> Result<RelayOutcome, DispatchError> {
        Ok(self.api.publish(request).await?)
    }

    async fn request_typed_data(
        &self,
        request: &PublicationRequest,
        nonce_override: Option<u64>,
    ) -> Result<TypedDataEnvelope, DispatchError> {
        Ok(self
            .api
            .create_publication_typed_data(request, nonce_override)
            .await?)
    }

    fn chain_call(
        &self,
        request: &PublicationRequest,
        typed_data: &TypedData,
    ) -> Result<ContractCall, DispatchError> {
        require_object(typed_data)?;
        let function = match request.kind {
            PublicationKind::Post => "post",
            PublicationKind::Comment { .. } => "comment",
            PublicationKind::Quote { .. } => "quote",
        };
        Ok(ContractCall {
            address: self.contracts.hub.clone(),
            function: function.to_string(),
            args: vec![typed_data.value.clone()],
        })
    }

    fn broadcast_channel(&self, request: &PublicationRequest) -> BroadcastChannel {
        request.layer.into()
    }

    // Momoka publications never touch the hub contract.
    fn supports_chain_write(&self, request: &PublicationRequest) -> bool {
        request.layer == PublicationLayer::OnChain
    }
}
