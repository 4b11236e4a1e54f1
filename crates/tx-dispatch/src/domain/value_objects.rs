//! # Domain Value Objects
//!
//! Immutable value types shared by the dispatcher, the queue and the ports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// EVM chain identifier.
pub type ChainId = u64;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Protocol account (profile) identifier, e.g. `0x01a4`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    /// Create an account id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Publication identifier, e.g. `0x01a4-0x2f`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicationId(pub String);

impl PublicationId {
    /// Create a publication id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wallet signature over typed data (hex, `0x`-prefixed).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(pub String);

impl Signature {
    /// Borrow the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The state-changing social actions that go through dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Follow another account.
    Follow,
    /// Unfollow another account.
    Unfollow,
    /// Link an owned handle to the active account.
    LinkHandle,
    /// Root publication.
    Post,
    /// Reply to a publication.
    Comment,
    /// Quote a publication.
    Quote,
}

impl ActionKind {
    /// Post, comment and quote share the publication pipeline.
    pub fn is_publication(&self) -> bool {
        matches!(self, Self::Post | Self::Comment | Self::Quote)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Follow => "follow",
            Self::Unfollow => "unfollow",
            Self::LinkHandle => "link_handle",
            Self::Post => "post",
            Self::Comment => "comment",
            Self::Quote => "quote",
        };
        f.write_str(name)
    }
}

/// What an action is aimed at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRef {
    /// Another account (follow, unfollow).
    Account(AccountId),
    /// A handle such as `alice.lens`.
    Handle(String),
    /// A parent publication (comment, quote).
    Publication(PublicationId),
    /// The author's own timeline (root post).
    Timeline,
}

/// Key of an optimistic entry: relay transaction id or chain transaction hash.
///
/// Exactly one is ever present, so a keyless or doubly-keyed entry cannot exist.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxKey {
    /// Accepted by the managed or broadcast relay.
    TxId(String),
    /// Broadcast directly on chain by the wallet.
    TxHash(String),
}

impl TxKey {
    /// The raw id or hash.
    pub fn as_str(&self) -> &str {
        match self {
            Self::TxId(id) => id,
            Self::TxHash(hash) => hash,
        }
    }

    /// Relay transaction id, if this is one.
    pub fn tx_id(&self) -> Option<&str> {
        match self {
            Self::TxId(id) => Some(id),
            Self::TxHash(_) => None,
        }
    }

    /// Chain transaction hash, if this is one.
    pub fn tx_hash(&self) -> Option<&str> {
        match self {
            Self::TxHash(hash) => Some(hash),
            Self::TxId(_) => None,
        }
    }
}

/// Where a publication is stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublicationLayer {
    /// Committed on chain through the hub contract.
    #[default]
    OnChain,
    /// Off-chain data-availability layer; indexed immediately, no chain write path.
    Momoka,
}

/// Which broadcast relay receives a signed typed-data payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BroadcastChannel {
    /// Gas-sponsoring on-chain relay.
    OnChain,
    /// Momoka relay.
    Momoka,
}

impl From<PublicationLayer> for BroadcastChannel {
    fn from(layer: PublicationLayer) -> Self {
        match layer {
            PublicationLayer::OnChain => Self::OnChain,
            PublicationLayer::Momoka => Self::Momoka,
        }
    }
}

/// Why the managed relay refused to sponsor an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelayRejectionReason {
    /// The app is not allowed to use the relay.
    AppNotAllowed,
    /// Generic relay failure.
    Failed,
    /// No profile manager is enabled for the account.
    NoLensManagerEnabled,
    /// The protocol will not sponsor this account or action.
    NotSponsored,
    /// Per-account rate limit reached.
    RateLimited,
    /// The action needs an explicit signature.
    RequiresSignature,
    /// The sponsor allowance is exhausted.
    InsufficientAllowance,
    /// Reason string the client does not recognise.
    Unknown,
}

impl RelayRejectionReason {
    /// Parse an API reason string; unrecognised strings map to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "APP_NOT_ALLOWED" => Self::AppNotAllowed,
            "FAILED" => Self::Failed,
            "NO_LENS_MANAGER_ENABLED" => Self::NoLensManagerEnabled,
            "NOT_SPONSORED" => Self::NotSponsored,
            "RATE_LIMITED" => Self::RateLimited,
            "REQUIRES_SIGNATURE" => Self::RequiresSignature,
            "INSUFFICIENT_ALLOWANCE" => Self::InsufficientAllowance,
            _ => Self::Unknown,
        }
    }
}

impl FromStr for RelayRejectionReason {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for RelayRejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AppNotAllowed => "APP_NOT_ALLOWED",
            Self::Failed => "FAILED",
            Self::NoLensManagerEnabled => "NO_LENS_MANAGER_ENABLED",
            Self::NotSponsored => "NOT_SPONSORED",
            Self::RateLimited => "RATE_LIMITED",
            Self::RequiresSignature => "REQUIRES_SIGNATURE",
            Self::InsufficientAllowance => "INSUFFICIENT_ALLOWANCE",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Which backend accepted a settled dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettledVia {
    /// Managed relay or broadcast relay.
    Relay,
    /// Direct wallet write.
    Chain,
}

/// Dispatch state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchState {
    /// Not started.
    #[default]
    Idle,
    /// Preconditions passed, choosing or preparing a tier.
    Preparing,
    /// Waiting on the wallet for a typed-data signature.
    AwaitingSignature,
    /// A submission is in flight (relay, broadcast or chain write).
    Submitting,
    /// Terminal success.
    Settled(SettledVia),
    /// Terminal failure.
    Failed,
}

impl DispatchState {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: DispatchState) -> bool {
        match (self, next) {
            (Self::Idle, Self::Preparing) => true,
            (Self::Idle, Self::Failed) => true, // precondition failure
            (Self::Preparing, Self::Submitting) => true,
            (Self::Preparing, Self::AwaitingSignature) => true,
            (Self::Submitting, Self::Preparing) => true, // managed relay fell through
            (Self::AwaitingSignature, Self::Submitting) => true,
            (Self::Submitting, Self::Submitting) => true, // broadcast fell through to chain
            (Self::Submitting, Self::Settled(_)) => true,
            (from, Self::Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled(_) | Self::Failed)
    }
}

/// What the active account may use, re-derived per attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Submit without any wallet signature through the profile manager.
    pub can_use_managed_relay: bool,
    /// Broadcast a signed meta-transaction to a gas-paying relay.
    pub can_broadcast_meta_transaction: bool,
}
