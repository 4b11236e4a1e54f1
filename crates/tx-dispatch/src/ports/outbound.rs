//! # Outbound Ports
//!
//! External collaborators the dispatcher drives: the social GraphQL API, the
//! broadcast relay, the wallet and the router. Every call is async and
//! independently failable.

use crate::domain::{
    ApiError, BroadcastChannel, BroadcastOutcome, ChainId, ContractCall, FollowRequest,
    LinkHandleRequest, PublicationId, PublicationRequest, RelayOutcome, Signature, Timestamp,
    TypedData, TypedDataEnvelope, UnfollowRequest, WalletError,
};
use async_trait::async_trait;

/// Social API mutations: one managed-relay mutation and one typed-data
/// mutation per action kind.
#[async_trait]
pub trait SocialApi: Send + Sync {
    /// Follow through the profile manager.
    async fn follow(&self, request: &FollowRequest) -> Result<RelayOutcome, ApiError>;

    /// Typed data for a follow.
    async fn create_follow_typed_data(
        &self,
        request: &FollowRequest,
        nonce_override: Option<u64>,
    ) -> Result<TypedDataEnvelope, ApiError>;

    /// Unfollow through the profile manager.
    async fn unfollow(&self, request: &UnfollowRequest) -> Result<RelayOutcome, ApiError>;

    /// Typed data for an unfollow.
    async fn create_unfollow_typed_data(
        &self,
        request: &UnfollowRequest,
        nonce_override: Option<u64>,
    ) -> Result<TypedDataEnvelope, ApiError>;

    /// Link a handle through the profile manager.
    async fn link_handle(&self, request: &LinkHandleRequest) -> Result<RelayOutcome, ApiError>;

    /// Typed data for a handle link.
    async fn create_link_handle_typed_data(
        &self,
        request: &LinkHandleRequest,
        nonce_override: Option<u64>,
    ) -> Result<TypedDataEnvelope, ApiError>;

    /// Post, comment or quote through the profile manager.
    async fn publish(&self, request: &PublicationRequest) -> Result<RelayOutcome, ApiError>;

    /// Typed data for a post, comment or quote.
    async fn create_publication_typed_data(
        &self,
        request: &PublicationRequest,
        nonce_override: Option<u64>,
    ) -> Result<TypedDataEnvelope, ApiError>;
}

/// Broadcast relay for signed typed-data payloads.
#[async_trait]
pub trait BroadcastApi: Send + Sync {
    /// Submit `{ id, signature }` to the relay for `channel`.
    async fn broadcast(
        &self,
        channel: BroadcastChannel,
        id: &str,
        signature: &Signature,
    ) -> Result<BroadcastOutcome, ApiError>;
}

/// Wallet signing and contract-write capability.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Prompt the user to sign typed data.
    async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Signature, WalletError>;

    /// Prompt the user to send a contract write. Resolves with the tx hash
    /// as soon as the transaction is broadcast, before confirmation.
    async fn write_contract(&self, call: &ContractCall) -> Result<String, WalletError>;
}

/// Connected wallet network.
#[async_trait]
pub trait NetworkSwitcher: Send + Sync {
    /// Chain the wallet is currently on.
    async fn chain_id(&self) -> Result<ChainId, WalletError>;

    /// Ask the user to switch networks.
    async fn switch_network(&self, chain_id: ChainId) -> Result<(), WalletError>;
}

/// Client-side navigation after a publication is created.
pub trait PublicationNavigator: Send + Sync {
    /// Open the publication page.
    fn open(&self, publication_id: &PublicationId);

    /// Refetch the publication in place (new comment under the current page).
    fn refresh(&self, publication_id: &PublicationId);
}

/// Time source for queue timestamps.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Navigator that ignores navigation, for headless callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl PublicationNavigator for NoopNavigator {
    fn open(&self, _publication_id: &PublicationId) {}

    fn refresh(&self, _publication_id: &PublicationId) {}
}
