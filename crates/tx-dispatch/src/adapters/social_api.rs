//! Social API Adapter
//!
//! Scripted in-memory implementation of `SocialApi` and `BroadcastApi`.

use crate::domain::{
    ApiError, BroadcastChannel, BroadcastOutcome, FollowRequest, LinkHandleRequest,
    PublicationKind, PublicationRequest, RelayOutcome, Signature, TypedData, TypedDataEnvelope,
    UnfollowRequest,
};
use crate::ports::outbound::{BroadcastApi, SocialApi};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;
use uuid::Uuid;

/// In-memory social API for tests and demos.
///
/// Unscripted relay and broadcast calls succeed with a fresh transaction id.
/// Scripted outcomes are consumed in order.
pub struct InMemorySocialApi {
    /// Profile the typed data is signed for.
    signer_profile: String,
    relay_script: Mutex<VecDeque<Result<RelayOutcome, ApiError>>>,
    broadcast_script: Mutex<VecDeque<Result<BroadcastOutcome, ApiError>>>,
    typed_data_failure: Mutex<Option<ApiError>>,
    typed_data_override: Mutex<Option<Value>>,
    nonce_overrides: Mutex<Vec<Option<u64>>>,
    broadcasts: Mutex<Vec<(BroadcastChannel, String, Signature)>>,
    relay_calls: AtomicUsize,
    typed_data_calls: AtomicUsize,
}

impl InMemorySocialApi {
    /// Create an API signing typed data for profile `0x01`.
    pub fn new() -> Self {
        Self::for_profile("0x01")
    }

    /// Create an API signing typed data for `profile`.
    pub fn for_profile(profile: impl Into<String>) -> Self {
        Self {
            signer_profile: profile.into(),
            relay_script: Mutex::new(VecDeque::new()),
            broadcast_script: Mutex::new(VecDeque::new()),
            typed_data_failure: Mutex::new(None),
            typed_data_override: Mutex::new(None),
            nonce_overrides: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
            relay_calls: AtomicUsize::new(0),
            typed_data_calls: AtomicUsize::new(0),
        }
    }

    /// Queue the next managed relay outcome.
    pub fn script_relay(&self, outcome: RelayOutcome) {
        self.relay_script.lock().push_back(Ok(outcome));
    }

    /// Queue a managed relay transport failure.
    pub fn script_relay_error(&self, err: ApiError) {
        self.relay_script.lock().push_back(Err(err));
    }

    /// Queue the next broadcast outcome.
    pub fn script_broadcast(&self, outcome: BroadcastOutcome) {
        self.broadcast_script.lock().push_back(Ok(outcome));
    }

    /// Queue a broadcast transport failure.
    pub fn script_broadcast_error(&self, err: ApiError) {
        self.broadcast_script.lock().push_back(Err(err));
    }

    /// Fail the next typed-data request.
    pub fn fail_typed_data(&self, err: ApiError) {
        *self.typed_data_failure.lock() = Some(err);
    }

    /// Return `value` from every subsequent typed-data request.
    pub fn override_typed_data(&self, value: Value) {
        *self.typed_data_override.lock() = Some(value);
    }

    /// Managed relay calls so far.
    pub fn relay_calls(&self) -> usize {
        self.relay_calls.load(Ordering::SeqCst)
    }

    /// Typed-data requests so far.
    pub fn typed_data_calls(&self) -> usize {
        self.typed_data_calls.load(Ordering::SeqCst)
    }

    /// Nonce override of every typed-data request, in call order.
    pub fn nonce_overrides(&self) -> Vec<Option<u64>> {
        self.nonce_overrides.lock().clone()
    }

    /// Every broadcast received.
    pub fn broadcasts(&self) -> Vec<(BroadcastChannel, String, Signature)> {
        self.broadcasts.lock().clone()
    }

    fn next_relay(&self) -> Result<RelayOutcome, ApiError> {
        self.relay_calls.fetch_add(1, Ordering::SeqCst);
        self.relay_script
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(RelayOutcome::Success {
                    tx_id: fresh_tx_id(),
                    publication_id: None,
                })
            })
    }

    fn envelope(&self, nonce_override: Option<u64>, value: Value) -> Result<TypedDataEnvelope, ApiError> {
        self.typed_data_calls.fetch_add(1, Ordering::SeqCst);
        self.nonce_overrides.lock().push(nonce_override);
        if let Some(err) = self.typed_data_failure.lock().take() {
            return Err(err);
        }

        let mut value = self.typed_data_override.lock().clone().unwrap_or(value);
        if let (Some(fields), Some(nonce)) = (value.as_object_mut(), nonce_override) {
            fields.insert("nonce".to_string(), json!(nonce));
        }

        let id = Uuid::new_v4().to_string();
        debug!(typed_data_id = %id, ?nonce_override, "Issued typed data");
        Ok(TypedDataEnvelope {
            id,
            typed_data: TypedData {
                domain: json!({ "name": "Lens", "version": "2", "chainId": 137 }),
                types: json!({}),
                value,
            },
        })
    }
}

impl Default for InMemorySocialApi {
    fn default() -> Self {
        Self::new()
    }
}

fn fresh_tx_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[async_trait]
impl SocialApi for InMemorySocialApi {
    async fn follow(&self, _request: &FollowRequest) -> Result<RelayOutcome, ApiError> {
        self.next_relay()
    }

    async fn create_follow_typed_data(
        &self,
        request: &FollowRequest,
        nonce_override: Option<u64>,
    ) -> Result<TypedDataEnvelope, ApiError> {
        self.envelope(
            nonce_override,
            json!({
                "followerProfileId": self.signer_profile,
                "idsOfProfilesToFollow": [request.profile_id.as_str()],
                "followTokenIds": [0],
                "datas": ["0x"],
            }),
        )
    }

    async fn unfollow(&self, _request: &UnfollowRequest) -> Result<RelayOutcome, ApiError> {
        self.next_relay()
    }

    async fn create_unfollow_typed_data(
        &self,
        request: &UnfollowRequest,
        nonce_override: Option<u64>,
    ) -> Result<TypedDataEnvelope, ApiError> {
        self.envelope(
            nonce_override,
            json!({
                "unfollowerProfileId": self.signer_profile,
                "idsOfProfilesToUnfollow": [request.profile_id.as_str()],
            }),
        )
    }

    async fn link_handle(&self, _request: &LinkHandleRequest) -> Result<RelayOutcome, ApiError> {
        self.next_relay()
    }

    async fn create_link_handle_typed_data(
        &self,
        request: &LinkHandleRequest,
        nonce_override: Option<u64>,
    ) -> Result<TypedDataEnvelope, ApiError> {
        self.envelope(
            nonce_override,
            json!({
                "handle": request.handle,
                "profileId": self.signer_profile,
            }),
        )
    }

    async fn publish(&self, _request: &PublicationRequest) -> Result<RelayOutcome, ApiError> {
        self.next_relay()
    }

    async fn create_publication_typed_data(
        &self,
        request: &PublicationRequest,
        nonce_override: Option<u64>,
    ) -> Result<TypedDataEnvelope, ApiError> {
        let mut value = json!({
            "profileId": self.signer_profile,
            "contentURI": request.content_uri,
        });
        if let PublicationKind::Comment { on } | PublicationKind::Quote { on } = &request.kind {
            value["pointedPubId"] = json!(on.as_str());
        }
        self.envelope(nonce_override, value)
    }
}

#[async_trait]
impl BroadcastApi for InMemorySocialApi {
    async fn broadcast(
        &self,
        channel: BroadcastChannel,
        id: &str,
        signature: &Signature,
    ) -> Result<BroadcastOutcome, ApiError> {
        self.broadcasts
            .lock()
            .push((channel, id.to_string(), signature.clone()));
        self.broadcast_script.lock().pop_front().unwrap_or_else(|| {
            Ok(BroadcastOutcome::Success {
                tx_id: fresh_tx_id(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountId;

    #[tokio::test]
    async fn test_script_consumed_in_order() {
        let api = InMemorySocialApi::new();
        api.script_relay(RelayOutcome::TransientError {
            message: "down".into(),
        });
        let request = FollowRequest {
            profile_id: AccountId::new("0x02"),
        };

        assert!(matches!(
            api.follow(&request).await,
            Ok(RelayOutcome::TransientError { .. })
        ));
        assert!(matches!(
            api.follow(&request).await,
            Ok(RelayOutcome::Success { .. })
        ));
        assert_eq!(api.relay_calls(), 2);
    }

    #[tokio::test]
    async fn test_typed_data_carries_nonce_override() {
        let api = InMemorySocialApi::new();
        let request = FollowRequest {
            profile_id: AccountId::new("0x02"),
        };
        let envelope = api.create_follow_typed_data(&request, Some(9)).await.unwrap();

        assert_eq!(envelope.typed_data.value["nonce"], json!(9));
        assert_eq!(envelope.typed_data.value["idsOfProfilesToFollow"], json!(["0x02"]));
        assert_eq!(api.nonce_overrides(), vec![Some(9)]);
    }

    #[tokio::test]
    async fn test_typed_data_failure_is_one_shot() {
        let api = InMemorySocialApi::new();
        api.fail_typed_data(ApiError::Transport("boom".into()));
        let request = LinkHandleRequest {
            handle: "lens/alice".into(),
        };

        assert!(api.create_link_handle_typed_data(&request, None).await.is_err());
        assert!(api.create_link_handle_typed_data(&request, None).await.is_ok());
    }
}
