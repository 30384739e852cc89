//! # Submission Scenarios
//!
//! End-to-end flows through `SubmissionService`:
//!
//! 1. **Committed**: three endorsers answer 200, ordering succeeds, VALID
//!    arrives well inside the interactive timeout
//! 2. **Rejected**: the gating endorser answers 500, nothing is ordered
//! 3. **Unconfirmed**: ordering succeeds but no verdict arrives within the
//!    batch timeout
//! 4. **Invalidated**: the verdict is an MVCC read conflict

#[cfg(test)]
mod tests {
    use super::super::fixtures::{change_holder, org1_events, Harness};
    use lg_submission::{
        CommitOutcome, EndorsementPolicy, OrderOutcome, PeerScript, ProposalResponse,
        SubmissionApi, SubmissionConfig, SubmissionError,
    };
    use shared_bus::{CommitNotification, CommitPublisher};
    use shared_types::ValidationCode;
    use std::time::Duration;
    use tokio::time::Instant;

    // =============================================================================
    // COMMITTED
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_three_endorsers_commit_valid() {
        let harness = Harness::new(SubmissionConfig::interactive());
        harness.commit_with(ValidationCode::Valid, Duration::from_millis(400));

        let started = Instant::now();
        let result = harness
            .service
            .submit_transaction(change_holder(&["peer0", "peer1", "peer2"], "1", "Barry"))
            .await
            .expect("submission resolves");

        assert_eq!(result.order_outcome, OrderOutcome::Success);
        assert_eq!(result.commit_outcome, CommitOutcome::Valid);
        assert!(started.elapsed() < Duration::from_secs(1));

        assert_eq!(harness.ledger.proposal_calls(), 3);
        let envelopes = harness.ledger.ordered_envelopes();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].endorsements.len(), 3);
        assert_eq!(envelopes[0].tx_id(), &result.tx_id);

        let stats = harness.hub.stats();
        assert_eq!(stats.connects, 1);
        assert_eq!(stats.unregistrations, 1);
        assert_eq!(stats.disconnects, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cross_org_endorser_does_not_move_event_target() {
        let harness = Harness::new(SubmissionConfig::interactive());

        // peer2 (org2) is listed first but has no events; org1's peer1 is watched.
        harness.ledger.commit_through(
            harness.hub.clone(),
            shared_types::Endpoint::plain("grpc://peer1.org1:7058"),
            ValidationCode::Valid,
            Duration::from_millis(100),
        );

        let result = harness
            .service
            .submit_transaction(change_holder(&["peer2", "peer1"], "1", "Barry"))
            .await
            .unwrap();
        assert!(result.is_committed());
    }

    // =============================================================================
    // REJECTED
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_gating_endorser_500_is_rejected_without_ordering() {
        for policy in [EndorsementPolicy::FirstResponder, EndorsementPolicy::Unanimous] {
            let harness = Harness::new(SubmissionConfig::interactive().with_policy(policy));
            harness.ledger.script_peer(
                "peer0",
                PeerScript::Respond(ProposalResponse::failure(500, "chaincode error")),
            );

            let result = harness
                .service
                .submit_transaction(change_holder(&["peer0", "peer1"], "1", "Barry"))
                .await;

            match result {
                Err(SubmissionError::ProposalRejected { responses, .. }) => {
                    assert_eq!(responses.len(), 2);
                    assert_eq!(responses[0].status(), Some(500));
                }
                other => panic!("{policy}: expected rejection, got {:?}", other),
            }
            assert_eq!(harness.ledger.order_calls(), 0, "{policy}");
            assert_eq!(harness.hub.stats().connects, 0, "{policy}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_policies_disagree_on_non_gating_failure() {
        let first = Harness::new(
            SubmissionConfig::interactive().with_policy(EndorsementPolicy::FirstResponder),
        );
        first.commit_with(ValidationCode::Valid, Duration::from_millis(50));
        first.ledger.script_peer("peer1", PeerScript::Fail("connection refused".into()));

        let result = first
            .service
            .submit_transaction(change_holder(&["peer0", "peer1"], "1", "Barry"))
            .await
            .unwrap();
        assert!(result.is_committed());
        assert_eq!(first.ledger.ordered_envelopes()[0].endorsements.len(), 1);

        let unanimous = Harness::new(SubmissionConfig::interactive());
        unanimous
            .ledger
            .script_peer("peer1", PeerScript::Fail("connection refused".into()));
        let result = unanimous
            .service
            .submit_transaction(change_holder(&["peer0", "peer1"], "1", "Barry"))
            .await;
        assert!(matches!(result, Err(SubmissionError::ProposalRejected { .. })));
        assert_eq!(unanimous.ledger.order_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_endorser_is_captured_as_failure() {
        let mut config = SubmissionConfig::interactive();
        config.proposal_timeout = Duration::from_secs(2);
        let harness = Harness::new(config);
        harness.ledger.script_peer(
            "peer1",
            PeerScript::Delayed(Duration::from_secs(10), ProposalResponse::success(Vec::new())),
        );

        let result = harness
            .service
            .submit_transaction(change_holder(&["peer0", "peer1"], "1", "Barry"))
            .await;
        match result {
            Err(SubmissionError::ProposalRejected { responses, .. }) => {
                assert!(responses[0].is_success());
                assert!(responses[1].response().is_none());
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    // =============================================================================
    // UNCONFIRMED
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_no_verdict_within_batch_timeout() {
        let harness = Harness::new(SubmissionConfig::batch_ingest());

        let started = Instant::now();
        let result = harness
            .service
            .submit_transaction(change_holder(&["peer0"], "1", "Barry"))
            .await
            .unwrap();

        assert_eq!(result.order_outcome, OrderOutcome::Success);
        assert_eq!(result.commit_outcome, CommitOutcome::Timeout);
        assert!(started.elapsed() >= Duration::from_millis(3_000));

        let stats = harness.hub.stats();
        assert_eq!(stats.registrations, 1);
        assert_eq!(stats.unregistrations, 1);
        assert_eq!(stats.disconnects, 1);
        assert_eq!(harness.hub.active_registrations(), 0);
    }

    // =============================================================================
    // INVALIDATED
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_mvcc_conflict_is_invalid() {
        let harness = Harness::new(SubmissionConfig::interactive());
        harness.commit_with(
            ValidationCode::from_code("MVCC_READ_CONFLICT"),
            Duration::from_millis(300),
        );

        let result = harness
            .service
            .submit_transaction(change_holder(&["peer0", "peer1"], "1", "Barry"))
            .await
            .unwrap();

        assert_eq!(result.order_outcome, OrderOutcome::Success);
        assert_eq!(
            result.commit_outcome,
            CommitOutcome::Invalid("MVCC_READ_CONFLICT".to_string())
        );
        assert!(!result.is_committed());
        assert_eq!(result.label(), "invalid");
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_failure_recorded_beside_commit_outcome() {
        let harness = Harness::new(SubmissionConfig::batch_ingest());
        harness.ledger.script_order(OrderOutcome::Failure {
            reason: "SERVICE_UNAVAILABLE".to_string(),
        });

        let submission = harness
            .service
            .submit_transaction(change_holder(&["peer0"], "1", "Barry"));
        let hub = harness.hub.clone();
        let publish_invalid = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            let tx_id = harness.ledger.ordered_envelopes()[0].tx_id().clone();
            hub.publish(
                &org1_events(),
                CommitNotification {
                    tx_id,
                    code: ValidationCode::from_code("ENDORSEMENT_POLICY_FAILURE"),
                    block_number: 9,
                },
            )
            .await
        };

        let (result, delivered) = tokio::join!(submission, publish_invalid);
        let result = result.unwrap();
        assert_eq!(delivered, 1);
        assert_eq!(
            result.order_outcome,
            OrderOutcome::Failure {
                reason: "SERVICE_UNAVAILABLE".to_string()
            }
        );
        assert_eq!(
            result.commit_outcome,
            CommitOutcome::Invalid("ENDORSEMENT_POLICY_FAILURE".to_string())
        );
        assert_eq!(result.label(), "order_failed");
    }
}
