//! Configuration for tiered dispatch

use crate::domain::{ChainId, ConfigError, RelayRejectionReason};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Polygon mainnet.
pub const DEFAULT_CHAIN_ID: ChainId = 137;

/// Contract addresses the direct on-chain tier writes to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// Protocol hub (follow, unfollow, post, comment, quote).
    pub hub: String,
    /// Handle registry (link).
    pub handle_registry: String,
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self {
            hub: "0xDb46d1Dc155634FbC732f92E853b10B288AD5a1d".to_string(),
            handle_registry: "0xD4F2F33680FCCb36748FA9831851643781608844".to_string(),
        }
    }
}

/// Which managed-relay rejection reasons stop the dispatch instead of
/// falling through to the meta-transaction tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRejectionPolicy {
    /// Reasons surfaced to the user as terminal.
    pub terminal: Vec<RelayRejectionReason>,
}

impl RelayRejectionPolicy {
    /// Every rejection falls through.
    pub fn always_fall_through() -> Self {
        Self { terminal: vec![] }
    }

    /// Should `reason` end the dispatch?
    pub fn is_terminal(&self, reason: RelayRejectionReason) -> bool {
        self.terminal.contains(&reason)
    }
}

impl Default for RelayRejectionPolicy {
    fn default() -> Self {
        Self {
            terminal: vec![
                RelayRejectionReason::InsufficientAllowance,
                RelayRejectionReason::RateLimited,
            ],
        }
    }
}

/// Dispatch configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Chain the wallet must be on before signing or writing.
    pub required_chain_id: ChainId,
    /// Contract write targets.
    pub contracts: ContractAddresses,
    /// Terminal vs fall-through relay rejections.
    pub relay_policy: RelayRejectionPolicy,
    /// How long an unconfirmed optimistic entry stays visible.
    pub optimistic_window_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            required_chain_id: DEFAULT_CHAIN_ID,
            contracts: ContractAddresses::default(),
            relay_policy: RelayRejectionPolicy::default(),
            optimistic_window_secs: 5 * 60,
        }
    }
}

impl DispatchConfig {
    /// Parse from a JSON document; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the dispatcher cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.required_chain_id == 0 {
            return Err(ConfigError::Invalid("required_chain_id must be non-zero".into()));
        }
        if self.contracts.hub.is_empty() || self.contracts.handle_registry.is_empty() {
            return Err(ConfigError::Invalid("contract addresses must be set".into()));
        }
        Ok(())
    }

    /// Optimistic window as a duration.
    pub fn optimistic_window(&self) -> Duration {
        Duration::from_secs(self.optimistic_window_secs)
    }
}
