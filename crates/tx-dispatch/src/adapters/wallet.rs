//! Wallet Adapter
//!
//! In-memory wallet implementing `WalletSigner` and `NetworkSwitcher`.

use crate::domain::{ChainId, ContractCall, Signature, TypedData, WalletError};
use crate::ports::outbound::{NetworkSwitcher, WalletSigner};
use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info};

/// In-memory wallet for testing.
///
/// Signatures and transaction hashes are SHA-256 digests of the signed
/// payload or call, so identical inputs give identical outputs.
pub struct InMemoryWallet {
    chain_id: AtomicU64,
    accept_switch: AtomicBool,
    sign_failures: Mutex<VecDeque<WalletError>>,
    write_script: Mutex<VecDeque<Result<String, WalletError>>>,
    signed: Mutex<Vec<TypedData>>,
    writes: Mutex<Vec<ContractCall>>,
    switch_requests: Mutex<Vec<ChainId>>,
    nonce: AtomicU64,
}

impl InMemoryWallet {
    /// Wallet connected to `chain_id` that accepts network switches.
    pub fn on_chain(chain_id: ChainId) -> Self {
        Self {
            chain_id: AtomicU64::new(chain_id),
            accept_switch: AtomicBool::new(true),
            sign_failures: Mutex::new(VecDeque::new()),
            write_script: Mutex::new(VecDeque::new()),
            signed: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            switch_requests: Mutex::new(Vec::new()),
            nonce: AtomicU64::new(0),
        }
    }

    /// Decline every network switch prompt.
    pub fn declining_network_switch(self) -> Self {
        self.accept_switch.store(false, Ordering::SeqCst);
        self
    }

    /// Fail the next signature request with `err`.
    pub fn script_sign_failure(&self, err: WalletError) {
        self.sign_failures.lock().push_back(err);
    }

    /// Queue the next contract write result.
    pub fn script_write(&self, result: Result<String, WalletError>) {
        self.write_script.lock().push_back(result);
    }

    /// Successful signatures so far.
    pub fn sign_count(&self) -> usize {
        self.signed.lock().len()
    }

    /// Every payload signed, in order.
    pub fn signed_payloads(&self) -> Vec<TypedData> {
        self.signed.lock().clone()
    }

    /// Every contract write attempted, in order.
    pub fn writes(&self) -> Vec<ContractCall> {
        self.writes.lock().clone()
    }

    /// Chains the wallet was asked to switch to.
    pub fn switch_requests(&self) -> Vec<ChainId> {
        self.switch_requests.lock().clone()
    }
}

fn digest(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(Sha256::digest(bytes)))
}

#[async_trait]
impl WalletSigner for InMemoryWallet {
    async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<Signature, WalletError> {
        if let Some(err) = self.sign_failures.lock().pop_front() {
            return Err(err);
        }
        let payload =
            serde_json::to_vec(typed_data).map_err(|e| WalletError::Transport(e.to_string()))?;
        self.signed.lock().push(typed_data.clone());
        Ok(Signature(digest(&payload)))
    }

    async fn write_contract(&self, call: &ContractCall) -> Result<String, WalletError> {
        self.writes.lock().push(call.clone());
        if let Some(result) = self.write_script.lock().pop_front() {
            return result;
        }

        // Hash the call with a wallet-local nonce so repeated calls differ.
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let mut payload =
            serde_json::to_vec(call).map_err(|e| WalletError::Transport(e.to_string()))?;
        payload.extend_from_slice(&nonce.to_le_bytes());
        let tx_hash = digest(&payload);
        debug!(function = %call.function, %tx_hash, "Wallet wrote contract");
        Ok(tx_hash)
    }
}

#[async_trait]
impl NetworkSwitcher for InMemoryWallet {
    async fn chain_id(&self) -> Result<ChainId, WalletError> {
        Ok(self.chain_id.load(Ordering::SeqCst))
    }

    async fn switch_network(&self, chain_id: ChainId) -> Result<(), WalletError> {
        self.switch_requests.lock().push(chain_id);
        if !self.accept_switch.load(Ordering::SeqCst) {
            return Err(WalletError::Rejected);
        }
        info!(chain_id, "Wallet switched network");
        self.chain_id.store(chain_id, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn typed() -> TypedData {
        TypedData {
            domain: json!({}),
            types: json!({}),
            value: json!({ "nonce": 1 }),
        }
    }

    #[tokio::test]
    async fn test_signature_is_deterministic() {
        let wallet = InMemoryWallet::on_chain(137);
        let a = wallet.sign_typed_data(&typed()).await.unwrap();
        let b = wallet.sign_typed_data(&typed()).await.unwrap();
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("0x"));
        assert_eq!(a.as_str().len(), 66);
        assert_eq!(wallet.sign_count(), 2);
    }

    #[tokio::test]
    async fn test_rejected_signature_not_counted() {
        let wallet = InMemoryWallet::on_chain(137);
        wallet.script_sign_failure(WalletError::Rejected);
        assert_eq!(
            wallet.sign_typed_data(&typed()).await,
            Err(WalletError::Rejected)
        );
        assert_eq!(wallet.sign_count(), 0);
    }

    #[tokio::test]
    async fn test_writes_get_distinct_hashes() {
        let wallet = InMemoryWallet::on_chain(137);
        let call = ContractCall {
            address: "0xhub".into(),
            function: "follow".into(),
            args: vec![],
        };
        let first = wallet.write_contract(&call).await.unwrap();
        let second = wallet.write_contract(&call).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(wallet.writes().len(), 2);
    }

    #[tokio::test]
    async fn test_switch_network() {
        let wallet = InMemoryWallet::on_chain(1);
        wallet.switch_network(137).await.unwrap();
        assert_eq!(wallet.chain_id().await.unwrap(), 137);

        let stubborn = InMemoryWallet::on_chain(1).declining_network_switch();
        assert!(stubborn.switch_network(137).await.is_err());
        assert_eq!(stubborn.chain_id().await.unwrap(), 1);
    }
}
