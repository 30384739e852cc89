//! # Gateway Runtime
//!
//! Owns the wired pipeline and runs the two gateway flows:
//!
//! - **interactive**: seed the ledger, record one catch, hand it to a new
//!   holder and read it back, each step waiting up to the interactive
//!   commit timeout
//! - **batch ingest**: record every catch of a JSON file concurrently with
//!   the batch commit timeout and report a summary

use crate::config::RuntimeConfig;
use crate::devnet::{self, DevnetLedger, Tuna, TunaEntry};
use anyhow::{Context, Result};
use lg_submission::{
    CommitOutcome, GatewayResult, IdentityProvider, NetworkDirectory, OrderOutcome,
    StaticIdentityProvider, SubmissionApi, SubmissionResult, SubmissionService,
    TransactionRequest,
};
use serde::{Deserialize, Serialize};
use shared_bus::InMemoryEventHub;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

/// Pipeline wired to the devnet ledger.
pub type DevnetService = SubmissionService<DevnetLedger, InMemoryEventHub, NetworkDirectory>;

/// One catch of a batch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchRecord {
    pub key: String,
    pub vessel: String,
    pub location: String,
    pub timestamp: String,
    pub holder: String,
    #[serde(default)]
    pub weight: Option<String>,
}

impl CatchRecord {
    fn arguments(&self) -> Vec<String> {
        let mut arguments = vec![
            self.key.clone(),
            self.vessel.clone(),
            self.location.clone(),
            self.timestamp.clone(),
            self.holder.clone(),
        ];
        arguments.extend(self.weight.clone());
        arguments
    }
}

/// Tally of a batch ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub committed: usize,
    pub invalid: usize,
    /// Timed out or event service unreachable
    pub unconfirmed: usize,
    pub order_failed: usize,
    /// Never reached ordering
    pub rejected: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[GatewayResult<SubmissionResult>]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            match result {
                Err(_) => summary.rejected += 1,
                Ok(submission) => match (&submission.order_outcome, &submission.commit_outcome) {
                    (OrderOutcome::Failure { .. }, _) => summary.order_failed += 1,
                    (_, CommitOutcome::Valid) => summary.committed += 1,
                    (_, CommitOutcome::Invalid(_)) => summary.invalid += 1,
                    (_, CommitOutcome::Timeout | CommitOutcome::Unreachable(_)) => {
                        summary.unconfirmed += 1
                    }
                },
            }
        }
        summary
    }
}

/// The running gateway.
pub struct GatewayRuntime {
    config: RuntimeConfig,
    ledger: Arc<DevnetLedger>,
    identities: StaticIdentityProvider,
    service: DevnetService,
    /// Shutdown signal sender.
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl GatewayRuntime {
    /// Wire the pipeline for `config`.
    ///
    /// ## Initialization Order
    ///
    /// 1. Load the network directory
    /// 2. Start the event hub and the devnet ledger on its event endpoints
    /// 3. Enroll the acting identity
    /// 4. Build the submission service
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let directory = Arc::new(
            config
                .load_directory()
                .context("Failed to load network directory")?,
        );

        let hub = InMemoryEventHub::new();
        let ledger = Arc::new(DevnetLedger::new(
            config.channel.clone(),
            config.chaincode.clone(),
            hub.clone(),
            devnet::event_endpoints(directory.as_ref()),
            config.block_interval,
        ));

        let identity = devnet::devnet_identity(&directory, &config.org, &config.user)
            .context("Failed to enroll the gateway identity")?;
        let identities = StaticIdentityProvider::new().with_identity(identity);

        let service = SubmissionService::new(
            config.submission.clone(),
            Arc::clone(&ledger),
            Arc::new(hub),
            directory,
        );
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        Ok(Self {
            config,
            ledger,
            identities,
            service,
            shutdown_tx,
            shutdown_rx,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn service(&self) -> &DevnetService {
        &self.service
    }

    pub fn ledger(&self) -> &DevnetLedger {
        &self.ledger
    }

    /// Request for `operation` addressed to every peer of the gateway's
    /// organization.
    pub async fn request<A: Into<String>>(
        &self,
        operation: &str,
        arguments: impl IntoIterator<Item = A>,
    ) -> GatewayResult<TransactionRequest> {
        let identity = self.identities.signing_identity(&self.config.org).await?;
        TransactionRequest::builder(
            self.config.channel.clone(),
            self.config.chaincode.clone(),
            operation,
        )
        .args(arguments)
        .identity(identity)
        .build()
    }

    pub async fn init_ledger(&self) -> GatewayResult<SubmissionResult> {
        let request = self.request::<String>("initLedger", []).await?;
        self.service.submit_transaction(request).await
    }

    pub async fn record_tuna(&self, record: &CatchRecord) -> GatewayResult<SubmissionResult> {
        let request = self.request("recordTuna", record.arguments()).await?;
        self.service.submit_transaction(request).await
    }

    pub async fn change_tuna_holder(
        &self,
        key: &str,
        holder: &str,
    ) -> GatewayResult<SubmissionResult> {
        let request = self.request("changeTunaHolder", [key, holder]).await?;
        self.service.submit_transaction(request).await
    }

    pub async fn query_tuna(&self, key: &str) -> Result<Tuna> {
        let request = self.request("queryTuna", [key]).await?;
        let payload = self.service.query(request).await?;
        serde_json::from_slice(&payload).with_context(|| format!("Malformed tuna record {key}"))
    }

    pub async fn query_all_tuna(&self) -> Result<Vec<TunaEntry>> {
        let request = self.request("queryAllTuna", [""]).await?;
        let payload = self.service.query(request).await?;
        serde_json::from_slice(&payload).context("Malformed queryAllTuna answer")
    }

    /// Record every catch concurrently with the batch commit timeout.
    pub async fn ingest(&self, records: &[CatchRecord]) -> Result<BatchSummary> {
        let mut requests = Vec::with_capacity(records.len());
        for record in records {
            requests.push(self.request("recordTuna", record.arguments()).await?);
        }

        let span = ledger_telemetry::submission_span!(
            "ingest",
            records = records.len(),
            channel = %self.config.channel
        );
        let results = self
            .service
            .submit_batch(requests)
            .instrument(span)
            .await;

        for (record, result) in records.iter().zip(&results) {
            match result {
                Ok(submission) if submission.is_committed() => {}
                Ok(submission) => ledger_telemetry::log_tx_event!(
                    warn,
                    "Catch not confirmed",
                    submission.tx_id.short(),
                    key = %record.key,
                    outcome = submission.label()
                ),
                Err(error) => warn!(key = %record.key, %error, "Catch rejected"),
            }
        }

        let summary = BatchSummary::from_results(&results);
        info!(?summary, "Batch ingest finished");
        Ok(summary)
    }

    /// Run the configured flow until it finishes or shutdown is signalled.
    pub async fn run(&self) -> Result<()> {
        let mut shutdown = self.shutdown_rx.clone();
        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                info!("Shutdown signal received");
                Ok(())
            }
            result = self.run_flow() => result,
        }
    }

    async fn run_flow(&self) -> Result<()> {
        info!("===========================================");
        info!("  Ledger Gateway Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!(
            "  org={} channel={} chaincode={}",
            self.config.org, self.config.channel, self.config.chaincode
        );
        info!("===========================================");

        match &self.config.batch_file {
            Some(path) => {
                let records = load_batch(path)?;
                let summary = self.ingest(&records).await?;
                if summary.committed < summary.total {
                    warn!(
                        missing = summary.total - summary.committed,
                        "Not every catch was committed"
                    );
                }
                Ok(())
            }
            None => self.run_interactive().await,
        }
    }

    async fn run_interactive(&self) -> Result<()> {
        let seeded = self.init_ledger().await.context("initLedger was rejected")?;
        report("initLedger", &seeded);

        let catch = CatchRecord {
            key: "11".to_string(),
            vessel: "Hound".to_string(),
            location: "-12.021, 28.012".to_string(),
            timestamp: "1504054225".to_string(),
            holder: "Hansel".to_string(),
            weight: Some("110".to_string()),
        };
        let recorded = self
            .record_tuna(&catch)
            .await
            .context("recordTuna was rejected")?;
        report("recordTuna", &recorded);

        let changed = self
            .change_tuna_holder(&catch.key, "Barry")
            .await
            .context("changeTunaHolder was rejected")?;
        report("changeTunaHolder", &changed);

        let tuna = self.query_tuna(&catch.key).await?;
        info!(key = %catch.key, holder = %tuna.holder, vessel = %tuna.vessel, "Queried catch");

        let all = self.query_all_tuna().await?;
        info!(
            records = all.len(),
            height = self.ledger.height(),
            issued = self.service.transactions_issued(),
            "Ledger state"
        );
        Ok(())
    }

    /// Signal shutdown to a running flow. A flow started afterwards stops
    /// immediately.
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        self.shutdown_tx.send_replace(true);
    }
}

/// Read a batch file: a JSON array of catches.
pub fn load_batch(path: &Path) -> Result<Vec<CatchRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read batch file {}", path.display()))?;
    let records: Vec<CatchRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Malformed batch file {}", path.display()))?;
    info!(path = %path.display(), records = records.len(), "Loaded batch file");
    Ok(records)
}

fn report(operation: &str, result: &SubmissionResult) {
    if result.is_committed() {
        ledger_telemetry::log_tx_event!(info, "Transaction committed", result.tx_id.short(), operation);
    } else {
        ledger_telemetry::log_tx_event!(
            warn,
            "Transaction not committed",
            result.tx_id.short(),
            operation,
            order = %result.order_outcome,
            commit = %result.commit_outcome
        );
    }
}
