//! Wrong-network guard, run before every wallet prompt.

use crate::domain::{ChainId, DispatchError, WalletError};
use crate::ports::NetworkSwitcher;
use std::sync::Arc;
use tracing::{info, warn};

/// Ensures the connected wallet is on the required chain.
#[derive(Clone)]
pub struct WrongNetworkGuard {
    switcher: Arc<dyn NetworkSwitcher>,
    required: ChainId,
}

impl WrongNetworkGuard {
    /// Guard for `required`.
    pub fn new(switcher: Arc<dyn NetworkSwitcher>, required: ChainId) -> Self {
        Self { switcher, required }
    }

    /// Chain the guard enforces.
    pub fn required_chain_id(&self) -> ChainId {
        self.required
    }

    /// Return once the wallet is on the required chain, prompting a switch
    /// if needed.
    pub async fn ensure(&self) -> Result<(), DispatchError> {
        let current = self.switcher.chain_id().await.map_err(classify)?;
        if current == self.required {
            return Ok(());
        }

        info!(
            current_chain = current,
            required_chain = self.required,
            "Wallet on wrong network, requesting switch"
        );
        self.switcher
            .switch_network(self.required)
            .await
            .map_err(classify)?;

        let switched = self.switcher.chain_id().await.map_err(classify)?;
        if switched != self.required {
            warn!(
                current_chain = switched,
                required_chain = self.required,
                "Wallet still on wrong network after switch"
            );
            return Err(DispatchError::NetworkSwitchRejected);
        }
        Ok(())
    }
}

fn classify(err: WalletError) -> DispatchError {
    match err {
        WalletError::Transport(msg) => DispatchError::TransientTransportError(msg),
        _ => DispatchError::NetworkSwitchRejected,
    }
}
