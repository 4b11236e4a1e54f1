//! # Domain Errors
//!
//! Failure taxonomy surfaced to callers, plus the port-level errors the
//! dispatcher classifies into it.

use super::value_objects::{DispatchState, RelayRejectionReason};
use thiserror::Error;

/// Terminal failure of a dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No active account.
    #[error("Not signed in")]
    Unauthenticated,

    /// The active account is suspended.
    #[error("Account is suspended")]
    AccountSuspended,

    /// The relay refused the action with a reason that is surfaced to the user.
    #[error("Relay rejected action: {reason}")]
    RelayRejected {
        /// Reason reported by the relay.
        reason: RelayRejectionReason,
    },

    /// The wallet declined or cancelled the signature request.
    #[error("Signature request rejected")]
    SignatureRejected,

    /// The user declined to switch to the required network.
    #[error("Network switch rejected")]
    NetworkSwitchRejected,

    /// The wallet or chain refused the contract write.
    #[error("Chain write rejected: {reason}")]
    ChainWriteRejected {
        /// Wallet or simulation message.
        reason: String,
    },

    /// Transport or validation failure talking to the API or wallet.
    #[error("Transport error: {0}")]
    TransientTransportError(String),

    /// Internal state machine violation.
    #[error("Invalid dispatch transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Current state
        from: DispatchState,
        /// Attempted state
        to: DispatchState,
    },
}

/// Error returned by the social API port.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Network or server failure.
    #[error("API transport failure: {0}")]
    Transport(String),

    /// The API refused the request as malformed.
    #[error("API validation failure: {0}")]
    Validation(String),
}

/// Error returned by the wallet ports.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WalletError {
    /// The user declined the prompt.
    #[error("User rejected the request")]
    Rejected,

    /// Not enough native balance to pay gas.
    #[error("Insufficient funds for gas")]
    InsufficientFunds,

    /// The contract call reverts in simulation.
    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    /// Wallet connector failure.
    #[error("Wallet transport failure: {0}")]
    Transport(String),
}

impl From<ApiError> for DispatchError {
    fn from(err: ApiError) -> Self {
        Self::TransientTransportError(err.to_string())
    }
}

impl DispatchError {
    /// Classify a failed signature request.
    pub fn from_signature(err: WalletError) -> Self {
        match err {
            WalletError::Transport(msg) => Self::TransientTransportError(msg),
            WalletError::Rejected
            | WalletError::InsufficientFunds
            | WalletError::SimulationFailed(_) => Self::SignatureRejected,
        }
    }

    /// Classify a failed contract write.
    pub fn from_chain_write(err: WalletError) -> Self {
        Self::ChainWriteRejected {
            reason: err.to_string(),
        }
    }

    /// Raised before any tier was attempted.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::AccountSuspended)
    }
}

/// Configuration load failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document did not parse.
    #[error("Invalid dispatch configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value parsed but is unusable.
    #[error("Invalid dispatch configuration value: {0}")]
    Invalid(String),
}
