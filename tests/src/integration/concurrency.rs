//! # Concurrent Dispatch Flows
//!
//! Many dispatches in flight at once on a multi-threaded runtime. Queue
//! appends and nonce increments must never be lost.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{broadcast_account, profile, relay_account, World};
    use futures::future::join_all;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tx_dispatch::{
        ActionKind, BroadcastOutcome, PublicationLayer, SigningNonceCounter, TxKey,
    };

    const FLOWS: u32 = 64;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_relay_follows_all_queued() {
        let world = World::new(relay_account(), 0);

        let handles: Vec<_> = (0..FLOWS)
            .map(|n| {
                let actions = world.actions.clone();
                tokio::spawn(async move { actions.follow(profile(n)).await })
            })
            .collect();

        for result in join_all(handles).await {
            assert!(result.unwrap().is_ok());
        }

        assert_eq!(world.actions.pending().len(), FLOWS as usize);
        for n in 0..FLOWS {
            assert!(world.actions.is_follow_pending(&profile(n)));
        }
        assert_eq!(world.nonce(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_broadcasts_lose_no_nonce_increment() {
        let world = World::new(broadcast_account(), 100);

        let handles: Vec<_> = (0..FLOWS)
            .map(|n| {
                let actions = world.actions.clone();
                tokio::spawn(async move {
                    if n % 2 == 0 {
                        actions.follow(profile(n)).await
                    } else {
                        actions.post(format!("ar://{n}"), PublicationLayer::OnChain).await
                    }
                })
            })
            .collect();

        for result in join_all(handles).await {
            assert!(result.unwrap().is_ok());
        }

        assert_eq!(world.nonce(), 100 + FLOWS as u64);
        assert_eq!(world.wallet.sign_count(), FLOWS as usize);
        let pending = world.actions.pending();
        assert_eq!(pending.len(), FLOWS as usize);
        assert_eq!(
            pending.iter().filter(|e| e.kind == ActionKind::Post).count(),
            (FLOWS / 2) as usize
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_mixed_tiers_keys_are_unique() {
        let world = World::new(broadcast_account(), 0);
        for n in 0..FLOWS {
            if n % 3 == 0 {
                world.api.script_broadcast(BroadcastOutcome::RelayError {
                    reason: "FAILED".into(),
                });
            } else {
                world.api.script_broadcast(BroadcastOutcome::Success {
                    tx_id: format!("tx_{n}"),
                });
            }
        }

        let handles: Vec<_> = (0..FLOWS)
            .map(|n| {
                let actions = world.actions.clone();
                tokio::spawn(async move { actions.follow(profile(n)).await })
            })
            .collect();
        join_all(handles).await;

        let pending = world.actions.pending();
        assert_eq!(pending.len(), FLOWS as usize);

        let keys: HashSet<String> = pending.iter().map(|e| e.key.as_str().to_string()).collect();
        assert_eq!(keys.len(), FLOWS as usize);

        let on_chain = pending
            .iter()
            .filter(|e| matches!(e.key, TxKey::TxHash(_)))
            .count();
        let relayed = FLOWS as usize - on_chain;
        assert_eq!(on_chain, world.wallet.writes().len());
        assert_eq!(world.nonce(), relayed as u64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reconcile_and_append() {
        let world = World::new(broadcast_account(), 0);
        for n in 0..FLOWS {
            world.api.script_broadcast(BroadcastOutcome::Success {
                tx_id: format!("tx_{n}"),
            });
        }
        let confirmed: Arc<HashSet<String>> =
            Arc::new((0..FLOWS).step_by(2).map(|n| format!("tx_{n}")).collect());
        let done = Arc::new(AtomicBool::new(false));

        let reconcilers: Vec<_> = (0..4)
            .map(|_| {
                let session = world.actions.session().clone();
                let confirmed = confirmed.clone();
                let done = done.clone();
                tokio::spawn(async move {
                    let mut removed = 0;
                    while !done.load(Ordering::SeqCst) {
                        removed += session.queue().reconcile(&confirmed);
                        tokio::task::yield_now().await;
                    }
                    removed
                })
            })
            .collect();

        let writers: Vec<_> = (0..FLOWS)
            .map(|n| {
                let actions = world.actions.clone();
                tokio::spawn(async move { actions.follow(profile(n)).await })
            })
            .collect();
        for result in join_all(writers).await {
            assert!(result.unwrap().is_ok());
        }
        done.store(true, Ordering::SeqCst);

        let mut removed: usize = join_all(reconcilers)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .sum();
        removed += world.actions.session().queue().reconcile(&confirmed);

        assert_eq!(removed, (FLOWS / 2) as usize);
        let remaining: HashSet<String> = world
            .actions
            .pending()
            .iter()
            .map(|e| e.key.as_str().to_string())
            .collect();
        let expected: HashSet<String> = (1..FLOWS).step_by(2).map(|n| format!("tx_{n}")).collect();
        assert_eq!(remaining, expected);
    }

    #[test]
    fn test_nonce_increment_decrement_across_threads() {
        let counter = Arc::new(SigningNonceCounter::new(0));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        counter.increment();
                    }
                    for _ in 0..500 {
                        counter.decrement();
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(counter.current(), 8 * 500);
    }
}
