//! # Devnet Flow
//!
//! The submission pipeline against the devnet ledger: real chaincode
//! simulation, read-version validation at block cut and commit events
//! published by the ledger itself.

#[cfg(test)]
mod tests {
    use super::super::fixtures::org1_identity;
    use async_trait::async_trait;
    use gateway_runtime::devnet::{self, DevnetLedger, Tuna, DEVNET_DIRECTORY};
    use gateway_runtime::{runtime::load_batch, GatewayRuntime, RuntimeConfig};
    use lg_submission::{
        CommitOutcome, LedgerChannel, LedgerError, NetworkDirectory, OrderOutcome, Proposal,
        ProposalEnvelope, ProposalResponse, ResolvedTarget, SubmissionApi, SubmissionConfig,
        SubmissionService, TransactionRequest,
    };
    use shared_bus::InMemoryEventHub;
    use shared_types::{ChaincodeId, ChannelId, Endpoint};
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;

    /// Holds every envelope back before ordering, so concurrent submissions
    /// all endorse against the same state.
    struct DelayedOrdering {
        inner: DevnetLedger,
        delay: Duration,
    }

    #[async_trait]
    impl LedgerChannel for DelayedOrdering {
        async fn send_proposal(
            &self,
            target: &ResolvedTarget,
            proposal: &Proposal,
        ) -> Result<ProposalResponse, LedgerError> {
            self.inner.send_proposal(target, proposal).await
        }

        async fn submit_to_order(
            &self,
            orderer: &Endpoint,
            envelope: &ProposalEnvelope,
        ) -> Result<OrderOutcome, LedgerError> {
            tokio::time::sleep(self.delay).await;
            self.inner.submit_to_order(orderer, envelope).await
        }
    }

    fn request(operation: &str, args: &[&str]) -> TransactionRequest {
        TransactionRequest::builder("mychannel", "tuna-app", operation)
            .args(args.iter().copied())
            .identity(org1_identity())
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_holder_changes_conflict() {
        let directory = Arc::new(NetworkDirectory::from_json_str(DEVNET_DIRECTORY).unwrap());
        let hub = InMemoryEventHub::new();
        let ledger = Arc::new(DelayedOrdering {
            inner: DevnetLedger::new(
                ChannelId::new("mychannel"),
                ChaincodeId::new("tuna-app"),
                hub.clone(),
                devnet::event_endpoints(directory.as_ref()),
                Duration::from_millis(50),
            ),
            delay: Duration::from_millis(200),
        });
        let service = SubmissionService::new(
            SubmissionConfig::interactive(),
            Arc::clone(&ledger),
            Arc::new(hub.clone()),
            directory,
        );

        let seeded = service
            .submit_transaction(request("initLedger", &[]))
            .await
            .unwrap();
        assert!(seeded.is_committed());

        let results = service
            .submit_batch(vec![
                request("changeTunaHolder", &["3", "Barry"]),
                request("changeTunaHolder", &["3", "Frank"]),
            ])
            .await;

        let outcomes: Vec<_> = results
            .into_iter()
            .map(|result| result.unwrap())
            .collect();
        assert!(outcomes
            .iter()
            .all(|outcome| outcome.order_outcome == OrderOutcome::Success));
        let valid: Vec<_> = outcomes
            .iter()
            .enumerate()
            .filter(|(_, outcome)| outcome.commit_outcome == CommitOutcome::Valid)
            .map(|(index, _)| index)
            .collect();
        assert_eq!(valid.len(), 1);
        let conflicted = &outcomes[1 - valid[0]];
        assert_eq!(
            conflicted.commit_outcome,
            CommitOutcome::Invalid("MVCC_READ_CONFLICT".to_string())
        );

        let stored: Tuna = serde_json::from_slice(&ledger.inner.get_state("3").unwrap()).unwrap();
        assert_eq!(stored.holder, ["Barry", "Frank"][valid[0]]);
        assert_eq!(hub.active_registrations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evaluated_writes_are_not_retained() {
        let runtime = GatewayRuntime::new(RuntimeConfig {
            block_interval: Duration::from_millis(40),
            ..RuntimeConfig::default()
        })
        .unwrap();

        // Evaluating a writing function endorses it on both org1 peers.
        let evaluate = runtime.request::<String>("initLedger", []).await.unwrap();
        runtime.service().query(evaluate).await.unwrap();
        assert_eq!(runtime.ledger().pending_endorsements(), 1);
        assert_eq!(runtime.ledger().height(), 0);

        tokio::time::advance(devnet::PENDING_WRITE_TTL).await;
        let committed = runtime.change_tuna_holder("404", "Barry").await;
        assert!(committed.is_err());
        assert_eq!(runtime.ledger().pending_endorsements(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runtime_batch_ingest_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"key":"21","vessel":"923F","location":"67.0006, -70.5476","timestamp":"1504054225","holder":"Miriam","weight":"110"}},
                {{"key":"22","vessel":"M83T","location":"91.2395, -49.4594","timestamp":"1504057825","holder":"Dave"}},
                {{"key":"23","vessel":"T012","location":"58.0148, 59.01391","timestamp":"1493517025","holder":"Igor"}}
            ]"#
        )
        .unwrap();

        let runtime = GatewayRuntime::new(RuntimeConfig {
            batch_file: Some(file.path().to_path_buf()),
            block_interval: Duration::from_millis(40),
            ..RuntimeConfig::default()
        })
        .unwrap();

        let records = load_batch(file.path()).unwrap();
        let summary = runtime.ingest(&records).await.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.committed, 3);

        let tuna = runtime.query_tuna("21").await.unwrap();
        assert_eq!(tuna.weight.as_deref(), Some("110"));
        assert_eq!(runtime.query_all_tuna().await.unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runtime_for_second_org() {
        let runtime = GatewayRuntime::new(RuntimeConfig {
            org: shared_types::OrgId::new("org2"),
            block_interval: Duration::from_millis(40),
            ..RuntimeConfig::default()
        })
        .unwrap();

        let seeded = runtime.init_ledger().await.unwrap();
        assert!(seeded.is_committed());
        assert_eq!(runtime.query_tuna("10").await.unwrap().holder, "Fatima");
        assert!(runtime.query_tuna("404").await.is_err());
    }
}
