//! # Pipeline Properties
//!
//! - transaction ids issued concurrently for one identity never collide
//! - every commit watch resolves once and releases its registration once
//! - a non-200 gating status never reaches the ordering service
//! - a timed-out watch ignores later notifications
//! - every submission past the proposal phase carries both outcomes

#[cfg(test)]
mod tests {
    use super::super::fixtures::{change_holder, org1_events, org1_identity, Harness};
    use lg_submission::{
        CommitOutcome, CommitWatcher, EndorsementPolicy, LedgerError, OrderOutcome, PeerScript,
        ProposalResponse, SubmissionApi, SubmissionConfig, TransactionIdIssuer,
    };
    use proptest::prelude::*;
    use shared_bus::{CommitNotification, CommitPublisher, InMemoryEventHub};
    use shared_types::{TransactionId, ValidationCode};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    // =============================================================================
    // UNIQUENESS
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ids_are_distinct() {
        let issuer = Arc::new(TransactionIdIssuer::new());
        let identity = org1_identity();

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let issuer = Arc::clone(&issuer);
                let identity = identity.clone();
                tokio::spawn(async move {
                    (0..200)
                        .map(|_| issuer.issue(&identity).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for task in futures::future::join_all(tasks).await {
            ids.extend(task.unwrap());
        }
        assert_eq!(ids.len(), 16 * 200);
        assert_eq!(issuer.issued(), 16 * 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_submissions_get_distinct_ids() {
        let harness = Harness::new(SubmissionConfig::interactive());
        harness.commit_with(ValidationCode::Valid, Duration::from_millis(10));

        let requests = (0..40)
            .map(|key| change_holder(&["peer0"], &key.to_string(), "Barry"))
            .collect();
        let results = harness.service.submit_batch(requests).await;

        let ids: HashSet<_> = results
            .iter()
            .map(|result| result.as_ref().unwrap().tx_id.clone())
            .collect();
        assert_eq!(ids.len(), 40);
        assert!(results.iter().all(|r| r.as_ref().unwrap().is_committed()));
    }

    // =============================================================================
    // SINGLE RESOLUTION
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_every_exit_path_releases_once() {
        let hub = InMemoryEventHub::new();
        let watcher = CommitWatcher::new(Arc::new(hub.clone()));
        let endpoint = org1_events();

        // valid
        let valid = TransactionId::from_hex("01");
        let watch = watcher.subscribe(valid.clone(), &endpoint).await;
        hub.publish(
            &endpoint,
            CommitNotification {
                tx_id: valid,
                code: ValidationCode::Valid,
                block_number: 1,
            },
        )
        .await;
        assert_eq!(watch.wait(Duration::from_secs(30)).await, CommitOutcome::Valid);

        // timeout
        let outcome = watcher
            .watch(TransactionId::from_hex("02"), &endpoint, Duration::from_secs(3))
            .await;
        assert_eq!(outcome, CommitOutcome::Timeout);

        // connection error
        let watch = watcher.subscribe(TransactionId::from_hex("03"), &endpoint).await;
        hub.sever(&endpoint, "peer restarted");
        assert!(watch.wait(Duration::from_secs(30)).await.is_timeout_class());

        // cancelled
        let watch = watcher.subscribe(TransactionId::from_hex("04"), &endpoint).await;
        let task = tokio::spawn(watch.wait(Duration::from_secs(30)));
        tokio::task::yield_now().await;
        task.abort();
        let _ = task.await;

        let stats = hub.stats();
        assert_eq!(stats.registrations, 4);
        assert_eq!(stats.unregistrations, 4);
        assert_eq!(stats.disconnects, 4);
        assert_eq!(hub.active_registrations(), 0);
    }

    // =============================================================================
    // NO ORDERING ON BAD PROPOSAL
    // =============================================================================

    fn paused_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .start_paused(true)
            .build()
            .unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_non_200_gating_status_is_never_ordered(
            status in (100i32..600).prop_filter("gating failure", |s| *s != 200),
            first_responder in any::<bool>(),
        ) {
            let policy = if first_responder {
                EndorsementPolicy::FirstResponder
            } else {
                EndorsementPolicy::Unanimous
            };

            let (order_calls, connects) = paused_runtime().block_on(async {
                let harness = Harness::new(SubmissionConfig::interactive().with_policy(policy));
                harness.ledger.script_peer(
                    "peer0",
                    PeerScript::Respond(ProposalResponse::failure(status, "simulation failed")),
                );
                let result = harness
                    .service
                    .submit_transaction(change_holder(&["peer0", "peer1"], "1", "Barry"))
                    .await;
                assert!(result.is_err());
                (harness.ledger.order_calls(), harness.hub.stats().connects)
            });

            prop_assert_eq!(order_calls, 0);
            prop_assert_eq!(connects, 0);
        }
    }

    // =============================================================================
    // TIMEOUT IS TERMINAL
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_late_verdict_after_timeout_is_ignored() {
        let harness = Harness::new(SubmissionConfig::interactive());
        harness.commit_with(ValidationCode::Valid, Duration::from_millis(31_000));

        let result = harness
            .service
            .submit_transaction(change_holder(&["peer0"], "1", "Barry"))
            .await
            .unwrap();
        assert_eq!(result.commit_outcome, CommitOutcome::Timeout);

        tokio::time::sleep(Duration::from_secs(2)).await;
        let stats = harness.hub.stats();
        assert_eq!(stats.published, 1);
        assert_eq!(stats.delivered, 0);
        assert_eq!(stats.unregistrations, 1);
    }

    // =============================================================================
    // RESULT COMPLETENESS
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_transport_failures_still_yield_both_outcomes() {
        let harness = Harness::new(SubmissionConfig::interactive());
        harness.ledger.script_order_error(LedgerError::Timeout {
            endpoint: "grpc://orderer.example.com:7050".to_string(),
        });
        harness
            .hub
            .refuse_connections(&org1_events(), "connection refused");

        let result = harness
            .service
            .submit_transaction(change_holder(&["peer0"], "1", "Barry"))
            .await
            .unwrap();

        assert!(matches!(result.order_outcome, OrderOutcome::Failure { .. }));
        assert!(matches!(result.commit_outcome, CommitOutcome::Unreachable(_)));
        assert!(result.commit_outcome.is_timeout_class());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mixed_batch_is_complete_and_ordered() {
        let harness = Harness::new(SubmissionConfig::interactive());
        harness.commit_with(ValidationCode::Valid, Duration::from_millis(100));
        harness.ledger.script_peer(
            "peer1",
            PeerScript::Respond(ProposalResponse::failure(500, "no such tuna")),
        );

        let requests = vec![
            change_holder(&["peer0"], "1", "Barry"),
            change_holder(&["peer1"], "2", "Barry"),
            change_holder(&["peer7"], "3", "Barry"),
            change_holder(&["peer0"], "4", "Barry"),
        ];
        let results = harness.service.submit_batch(requests).await;

        assert_eq!(results.len(), 4);
        assert!(results[0].as_ref().unwrap().is_committed());
        assert_eq!(results[1].as_ref().unwrap_err().label(), "proposal_rejected");
        assert_eq!(results[2].as_ref().unwrap_err().label(), "unknown_target");
        assert!(results[3].as_ref().unwrap().is_committed());
        assert_eq!(harness.ledger.order_calls(), 2);
    }
}
