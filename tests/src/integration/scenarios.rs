//! # End-to-End Dispatch Scenarios
//!
//! Drives `SocialActions` against the in-memory API and wallet and checks
//! the observable side effects: queue, nonce, wallet prompts, navigation.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{broadcast_account, profile, relay_account, wallet_account, World};
    use std::collections::HashSet;
    use tx_dispatch::{
        ActionKind, BroadcastOutcome, DispatchError, InMemoryWallet, PublicationId,
        PublicationLayer, RelayOutcome, RelayRejectionReason, SettledVia, TargetRef, WalletError,
    };

    // =============================================================================
    // TIER SELECTION
    // =============================================================================

    #[tokio::test]
    async fn test_relay_post_then_confirmation_clears_queue() {
        let world = World::new(relay_account(), 0);
        world.api.script_relay(RelayOutcome::Success {
            tx_id: "tx_1".into(),
            publication_id: None,
        });

        let settlement = world
            .actions
            .post("ar://hello", PublicationLayer::OnChain)
            .await
            .unwrap();
        assert_eq!(settlement.via, SettledVia::Relay);

        let pending = world.actions.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind, ActionKind::Post);
        assert_eq!(pending[0].tx_id(), Some("tx_1"));

        // Indexer confirms the relay transaction.
        let confirmed: HashSet<String> = ["tx_1".to_string()].into();
        assert_eq!(world.actions.session().queue().reconcile(&confirmed), 1);
        assert!(world.actions.pending().is_empty());
    }

    #[tokio::test]
    async fn test_follow_falls_back_to_chain_with_one_signature() {
        let world = World::new(broadcast_account(), 3);
        world.api.script_broadcast(BroadcastOutcome::RelayError {
            reason: "RATE_LIMITED".into(),
        });
        world.wallet.script_write(Ok("0xabc".into()));

        let settlement = world.actions.follow(profile(5)).await.unwrap();

        assert_eq!(settlement.via, SettledVia::Chain);
        assert_eq!(world.wallet.sign_count(), 1);
        assert_eq!(world.wallet.writes().len(), 1);
        let pending = world.actions.pending();
        assert_eq!(pending[0].kind, ActionKind::Follow);
        assert_eq!(pending[0].tx_hash(), Some("0xabc"));
        assert_eq!(world.nonce(), 3);
        assert!(world.actions.is_follow_pending(&profile(5)));
    }

    #[tokio::test]
    async fn test_unfollow_guard_blocks_duplicate_ui_action() {
        let world = World::new(relay_account(), 0);

        world.actions.unfollow(profile(9)).await.unwrap();

        assert!(world.actions.is_unfollow_pending(&profile(9)));
        assert!(!world.actions.is_follow_pending(&profile(9)));
    }

    #[tokio::test]
    async fn test_enabling_profile_manager_mid_session_switches_tier() {
        let world = World::new(broadcast_account(), 0);

        world.actions.follow(profile(2)).await.unwrap();
        assert_eq!(world.wallet.sign_count(), 1);

        world.actions.session().replace_account(relay_account());
        world.actions.follow(profile(3)).await.unwrap();

        assert_eq!(world.wallet.sign_count(), 1);
        assert_eq!(world.api.relay_calls(), 1);
    }

    // =============================================================================
    // NONCE BOOKKEEPING
    // =============================================================================

    #[tokio::test]
    async fn test_sequential_signed_actions_advance_nonce_override() {
        let world = World::new(broadcast_account(), 20);

        world.actions.follow(profile(2)).await.unwrap();
        world.actions.link_handle("lens/alice").await.unwrap();
        world
            .actions
            .comment(PublicationId::new("0x02-0x01"), "ar://c", PublicationLayer::OnChain)
            .await
            .unwrap();

        assert_eq!(
            world.api.nonce_overrides(),
            vec![Some(20), Some(21), Some(22)]
        );
        assert_eq!(world.nonce(), 23);
    }

    #[tokio::test]
    async fn test_relay_success_does_not_touch_nonce() {
        let world = World::new(relay_account(), 4);

        world.actions.follow(profile(2)).await.unwrap();
        world.actions.post("ar://p", PublicationLayer::OnChain).await.unwrap();

        assert_eq!(world.nonce(), 4);
        assert!(world.api.nonce_overrides().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_nonce_for_retry() {
        let world = World::new(wallet_account(), 8);
        world
            .wallet
            .script_write(Err(WalletError::SimulationFailed("SIG_INVALID".into())));

        let err = world.actions.follow(profile(2)).await.unwrap_err();
        assert!(matches!(err, DispatchError::ChainWriteRejected { .. }));
        assert_eq!(world.nonce(), 8);

        // User retries from the top; same nonce is offered again.
        world.actions.follow(profile(2)).await.unwrap();
        assert_eq!(world.api.nonce_overrides(), vec![Some(8), Some(8)]);
    }

    // =============================================================================
    // FAILURES
    // =============================================================================

    #[tokio::test]
    async fn test_suspended_account_refused_before_any_call() {
        let world = World::new(relay_account().suspended(), 0);

        let err = world.actions.post("ar://x", PublicationLayer::OnChain).await.unwrap_err();

        assert_eq!(err, DispatchError::AccountSuspended);
        assert_eq!(world.api.relay_calls(), 0);
        assert_eq!(world.api.typed_data_calls(), 0);
        assert_eq!(world.wallet.sign_count(), 0);
    }

    #[tokio::test]
    async fn test_insufficient_allowance_is_surfaced() {
        let world = World::new(relay_account(), 0);
        world.api.script_relay(RelayOutcome::Rejected {
            reason: RelayRejectionReason::InsufficientAllowance,
        });

        let err = world.actions.follow(profile(2)).await.unwrap_err();

        assert_eq!(
            err,
            DispatchError::RelayRejected {
                reason: RelayRejectionReason::InsufficientAllowance
            }
        );
        assert_eq!(world.api.typed_data_calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_network_declined() {
        let world = World::with_wallet(
            wallet_account(),
            0,
            InMemoryWallet::on_chain(1).declining_network_switch(),
        );

        let err = world.actions.link_handle("lens/bob").await.unwrap_err();

        assert_eq!(err, DispatchError::NetworkSwitchRejected);
        assert_eq!(world.wallet.sign_count(), 0);
        assert!(world.wallet.writes().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_network_switched_then_written() {
        let world = World::with_wallet(wallet_account(), 0, InMemoryWallet::on_chain(80002));

        let settlement = world.actions.link_handle("lens/bob").await.unwrap();

        assert_eq!(settlement.via, SettledVia::Chain);
        assert_eq!(world.wallet.switch_requests(), vec![137]);
    }

    // =============================================================================
    // PUBLICATIONS
    // =============================================================================

    #[tokio::test]
    async fn test_momoka_quote_via_relay_opens_new_publication() {
        let world = World::new(relay_account(), 0);
        let quoted = PublicationId::new("0x01-0x0a-DA-aa");
        world.api.script_relay(RelayOutcome::Published {
            publication_id: quoted.clone(),
        });

        let settlement = world
            .actions
            .quote(PublicationId::new("0x02-0x01"), "ar://q", PublicationLayer::Momoka)
            .await
            .unwrap();

        assert_eq!(settlement.publication_id, Some(quoted.clone()));
        assert_eq!(world.navigator.opened(), vec![quoted]);
        assert!(world.actions.pending().is_empty());
    }

    #[tokio::test]
    async fn test_comment_entry_targets_parent() {
        let world = World::new(broadcast_account(), 0);
        let parent = PublicationId::new("0x02-0x07");

        world
            .actions
            .comment(parent.clone(), "ar://reply", PublicationLayer::OnChain)
            .await
            .unwrap();

        assert!(world
            .actions
            .session()
            .queue()
            .is_pending(&TargetRef::Publication(parent), ActionKind::Comment));
    }

    #[tokio::test]
    async fn test_stale_entries_expire_from_view() {
        let world = World::new(relay_account(), 0);
        world.actions.follow(profile(2)).await.unwrap();
        world.clock.advance(4 * 60 * 1_000);
        world.actions.follow(profile(3)).await.unwrap();

        world.clock.advance(2 * 60 * 1_000);

        assert!(!world.actions.is_follow_pending(&profile(2)));
        assert!(world.actions.is_follow_pending(&profile(3)));
        assert_eq!(world.actions.pending().len(), 1);
    }

    #[tokio::test]
    async fn test_follow_guard_clears_without_further_dispatch() {
        let world = World::new(relay_account(), 0);
        world.actions.follow(profile(2)).await.unwrap();
        assert!(world.actions.is_follow_pending(&profile(2)));

        world.clock.advance(60 * 60 * 1_000);

        assert!(!world.actions.is_follow_pending(&profile(2)));
        assert!(world.actions.pending().is_empty());
    }
}
