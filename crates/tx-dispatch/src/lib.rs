//! # Tx Dispatch
//!
//! Tiered submission of state-changing social actions (follow, unfollow,
//! link handle, post, comment, quote).
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Every action is committed through the cheapest path that works:
//! - Managed relay: no wallet interaction at all
//! - Signed meta-transaction broadcast: one typed-data signature, gas sponsored
//! - Direct contract write: the wallet pays gas
//!
//! Accepted submissions are tracked in an optimistic queue until the remote
//! index confirms them, and a client-side signing nonce keeps back-to-back
//! signatures from colliding.
//!
//! ## Tiers
//!
//! | Tier | Requires | Settles as |
//! |------|----------|------------|
//! | Managed relay | signless + sponsor | `Settled(Relay)` |
//! | Broadcast | sponsor, or Momoka | `Settled(Relay)` |
//! | Contract write | wallet on required chain | `Settled(Chain)` |
//!
//! ## Module Structure
//!
//! ```text
//! tx-dispatch/
//! ├── domain/          # Actions, state machine, nonce, optimistic queue, errors
//! ├── ports/           # DispatchApi, SocialApi, BroadcastApi, WalletSigner
//! ├── application/     # TransactionDispatcher, protocols, session, network guard
//! ├── adapters/        # In-memory API, wallet, navigator, clock
//! └── config.rs        # DispatchConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{InMemorySocialApi, InMemoryWallet, ManualTimeSource, RecordingNavigator};
pub use application::{
    ActionProtocol, DispatchAttempt, DispatchPorts, DispatchReport, DispatchSession,
    FollowProtocol, LinkHandleProtocol, PublicationProtocol, SocialActions, TransactionDispatcher,
    UnfollowProtocol, WrongNetworkGuard,
};
pub use config::{ContractAddresses, DispatchConfig, RelayRejectionPolicy, DEFAULT_CHAIN_ID};
pub use domain::{
    check_capabilities, Account, AccountId, AccountPermissions, Action, ActionKind,
    ActionRequest, ApiError, BroadcastChannel, BroadcastOutcome, Capabilities, ContractCall,
    DispatchError, DispatchState, FollowRequest, LinkHandleRequest, NonceClaim,
    OptimisticActionQueue, OptimisticTransaction, PublicationId, PublicationKind,
    PublicationLayer, PublicationRequest, RelayOutcome, RelayRejectionReason, SettledVia,
    Settlement, Signature, SigningNonceCounter, TargetRef, TxKey, TypedData, TypedDataEnvelope,
    UnfollowRequest, WalletError,
};
pub use ports::{
    BroadcastApi, DispatchApi, NetworkSwitcher, PublicationNavigator, SocialApi,
    SystemTimeSource, TimeSource, WalletSigner,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
