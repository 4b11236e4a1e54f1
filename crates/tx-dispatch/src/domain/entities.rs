//! # Domain Entities
//!
//! Accounts, actions, optimistic queue entries and the tagged results the
//! remote system returns for each submission path.

use super::value_objects::{
    AccountId, ActionKind, PublicationId, PublicationLayer, RelayRejectionReason, SettledVia,
    TargetRef, Timestamp, TxKey,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission flags as reported by the protocol for an account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPermissions {
    /// A profile manager is enabled, so actions can be submitted without signing.
    pub signless: bool,
    /// The protocol sponsors gas for this account.
    pub sponsor: bool,
}

/// The active account. Referenced, never owned: the session holds a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Profile id.
    pub id: AccountId,
    /// Owner wallet address.
    pub owned_by: String,
    /// Permission flags.
    pub permissions: AccountPermissions,
    /// Suspended accounts may not act.
    pub suspended: bool,
}

impl Account {
    /// Create an unsuspended account with no permissions.
    pub fn new(id: AccountId, owned_by: impl Into<String>) -> Self {
        Self {
            id,
            owned_by: owned_by.into(),
            permissions: AccountPermissions::default(),
            suspended: false,
        }
    }

    /// Set permission flags.
    pub fn with_permissions(mut self, signless: bool, sponsor: bool) -> Self {
        self.permissions = AccountPermissions { signless, sponsor };
        self
    }

    /// Mark as suspended.
    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }
}

/// Request payload for one action kind.
pub trait ActionRequest: Clone + Send + Sync + 'static {
    /// Kind this request dispatches as.
    fn kind(&self) -> ActionKind;

    /// What the action is aimed at.
    fn target(&self) -> TargetRef;

    /// Content shown for the pending entry, if any.
    fn content(&self) -> Option<String> {
        None
    }
}

/// A locally originated action with its correlation key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action<R> {
    /// Locally generated correlation key.
    pub correlation_id: Uuid,
    /// Kind-specific payload.
    pub request: R,
}

impl<R: ActionRequest> Action<R> {
    /// Wrap a request with a fresh correlation key.
    pub fn new(request: R) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            request,
        }
    }

    /// Kind of the wrapped request.
    pub fn kind(&self) -> ActionKind {
        self.request.kind()
    }
}

/// Follow one account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowRequest {
    /// Account to follow.
    pub profile_id: AccountId,
}

impl ActionRequest for FollowRequest {
    fn kind(&self) -> ActionKind {
        ActionKind::Follow
    }

    fn target(&self) -> TargetRef {
        TargetRef::Account(self.profile_id.clone())
    }
}

/// Unfollow one account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnfollowRequest {
    /// Account to unfollow.
    pub profile_id: AccountId,
}

impl ActionRequest for UnfollowRequest {
    fn kind(&self) -> ActionKind {
        ActionKind::Unfollow
    }

    fn target(&self) -> TargetRef {
        TargetRef::Account(self.profile_id.clone())
    }
}

/// Link an owned handle to the active account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkHandleRequest {
    /// Full handle, e.g. `lens/alice`.
    pub handle: String,
}

impl ActionRequest for LinkHandleRequest {
    fn kind(&self) -> ActionKind {
        ActionKind::LinkHandle
    }

    fn target(&self) -> TargetRef {
        TargetRef::Handle(self.handle.clone())
    }
}

/// Publication shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicationKind {
    /// Root post.
    Post,
    /// Reply to a publication.
    Comment {
        /// Parent publication.
        on: PublicationId,
    },
    /// Quote of a publication.
    Quote {
        /// Quoted publication.
        on: PublicationId,
    },
}

/// Create a post, comment or quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRequest {
    /// Post, comment or quote.
    pub kind: PublicationKind,
    /// Metadata URI of the content.
    pub content_uri: String,
    /// Where the publication is stored.
    pub layer: PublicationLayer,
}

impl ActionRequest for PublicationRequest {
    fn kind(&self) -> ActionKind {
        match self.kind {
            PublicationKind::Post => ActionKind::Post,
            PublicationKind::Comment { .. } => ActionKind::Comment,
            PublicationKind::Quote { .. } => ActionKind::Quote,
        }
    }

    fn target(&self) -> TargetRef {
        match &self.kind {
            PublicationKind::Post => TargetRef::Timeline,
            PublicationKind::Comment { on } | PublicationKind::Quote { on } => {
                TargetRef::Publication(on.clone())
            }
        }
    }

    fn content(&self) -> Option<String> {
        Some(self.content_uri.clone())
    }
}

/// Queued representation of an in-flight action.
///
/// Only built once a backend has accepted the submission, so the key is
/// always present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimisticTransaction {
    /// Correlation key of the originating action.
    pub correlation_id: Uuid,
    /// Action kind.
    pub kind: ActionKind,
    /// Action target.
    pub target: TargetRef,
    /// Content of a pending publication.
    pub content: Option<String>,
    /// Relay id or chain hash.
    pub key: TxKey,
    /// When the entry was queued.
    pub created_at: Timestamp,
}

impl OptimisticTransaction {
    /// Build an entry for an accepted action.
    pub fn for_action<R: ActionRequest>(action: &Action<R>, key: TxKey, created_at: Timestamp) -> Self {
        Self {
            correlation_id: action.correlation_id,
            kind: action.request.kind(),
            target: action.request.target(),
            content: action.request.content(),
            key,
            created_at,
        }
    }

    /// Relay transaction id, if relay-accepted.
    pub fn tx_id(&self) -> Option<&str> {
        self.key.tx_id()
    }

    /// Chain transaction hash, if chain-accepted.
    pub fn tx_hash(&self) -> Option<&str> {
        self.key.tx_hash()
    }
}

/// EIP-712 style typed data returned by the API. Opaque to the dispatcher
/// except for `value`, which carries the contract call arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypedData {
    /// Signing domain.
    pub domain: serde_json::Value,
    /// Type definitions.
    pub types: serde_json::Value,
    /// Message value.
    pub value: serde_json::Value,
}

/// Typed-data mutation result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypedDataEnvelope {
    /// Id the broadcast relay uses to look the payload up.
    pub id: String,
    /// Payload to sign.
    pub typed_data: TypedData,
}

/// A contract write for the wallet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractCall {
    /// Contract address.
    pub address: String,
    /// Function name.
    pub function: String,
    /// Positional arguments.
    pub args: Vec<serde_json::Value>,
}

/// Managed relay mutation result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayOutcome {
    /// Relay accepted; the action will land on chain.
    Success {
        /// Relay transaction id.
        tx_id: String,
        /// Resulting publication, when the relay already knows it.
        publication_id: Option<PublicationId>,
    },
    /// Momoka publication accepted and indexed.
    Published {
        /// New publication.
        publication_id: PublicationId,
    },
    /// The profile manager refused to sponsor the action.
    Rejected {
        /// Parsed reason.
        reason: RelayRejectionReason,
    },
    /// Relay-side failure.
    TransientError {
        /// Relay message.
        message: String,
    },
}

/// Broadcast mutation result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BroadcastOutcome {
    /// Relay accepted the signed payload.
    Success {
        /// Relay transaction id.
        tx_id: String,
    },
    /// Momoka relay accepted and indexed the publication.
    Published {
        /// New publication.
        publication_id: PublicationId,
    },
    /// Relay could not execute the payload.
    RelayError {
        /// Relay message.
        reason: String,
    },
}

/// Successful terminal outcome of a dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// Correlation key of the action.
    pub correlation_id: Uuid,
    /// Relay or chain.
    pub via: SettledVia,
    /// Queue key, absent for Momoka publications (nothing to confirm).
    pub key: Option<TxKey>,
    /// Publication id when the backend returned one.
    pub publication_id: Option<PublicationId>,
}

impl Settlement {
    /// Settled through a relay.
    pub fn is_relay(&self) -> bool {
        self.via == SettledVia::Relay
    }

    /// Settled by a direct chain write.
    pub fn is_chain(&self) -> bool {
        self.via == SettledVia::Chain
    }
}
