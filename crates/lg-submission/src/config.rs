//! Submission configuration and profiles

use crate::domain::EndorsementPolicy;
use crate::error::ConfigError;
use std::env;
use std::time::Duration;

/// Commit timeout of the interactive profile.
pub const INTERACTIVE_COMMIT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Commit timeout of the batch-ingest profile.
pub const BATCH_INGEST_COMMIT_TIMEOUT: Duration = Duration::from_millis(3_000);

/// Default bound on one endorser call.
pub const DEFAULT_PROPOSAL_TIMEOUT: Duration = Duration::from_secs(45);

/// Default number of batch submissions in flight.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 16;

/// Submission pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionConfig {
    /// How long the commit watcher waits for a verdict
    pub commit_timeout: Duration,
    /// Commit timeout used by `submit_batch`
    pub batch_commit_timeout: Duration,
    /// Bound on each endorser call
    pub proposal_timeout: Duration,
    /// Verdict rule over endorsements
    pub endorsement_policy: EndorsementPolicy,
    /// Concurrent submissions in one batch
    pub max_in_flight: usize,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self::interactive()
    }
}

impl SubmissionConfig {
    /// One record at a time; 30 s commit timeout.
    pub fn interactive() -> Self {
        Self {
            commit_timeout: INTERACTIVE_COMMIT_TIMEOUT,
            batch_commit_timeout: BATCH_INGEST_COMMIT_TIMEOUT,
            proposal_timeout: DEFAULT_PROPOSAL_TIMEOUT,
            endorsement_policy: EndorsementPolicy::default(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Bulk loading; 3 s commit timeout.
    pub fn batch_ingest() -> Self {
        Self {
            commit_timeout: BATCH_INGEST_COMMIT_TIMEOUT,
            ..Self::interactive()
        }
    }

    /// Interactive profile overridden from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `LG_COMMIT_TIMEOUT_MS`: commit timeout
    /// - `LG_BATCH_COMMIT_TIMEOUT_MS`: commit timeout for batches
    /// - `LG_PROPOSAL_TIMEOUT_MS`: per-endorser timeout
    /// - `LG_ENDORSEMENT_POLICY`: `unanimous` or `first_responder`
    /// - `LG_MAX_IN_FLIGHT`: batch concurrency
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::interactive();

        if let Some(ms) = parse_var::<u64>("LG_COMMIT_TIMEOUT_MS")? {
            config.commit_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>("LG_BATCH_COMMIT_TIMEOUT_MS")? {
            config.batch_commit_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>("LG_PROPOSAL_TIMEOUT_MS")? {
            config.proposal_timeout = Duration::from_millis(ms);
        }
        if let Some(policy) = parse_var::<EndorsementPolicy>("LG_ENDORSEMENT_POLICY")? {
            config.endorsement_policy = policy;
        }
        if let Some(max) = parse_var::<usize>("LG_MAX_IN_FLIGHT")? {
            config.max_in_flight = max;
        }

        config.validate()?;
        Ok(config)
    }

    /// Use a different endorsement policy.
    pub fn with_policy(mut self, policy: EndorsementPolicy) -> Self {
        self.endorsement_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.commit_timeout.is_zero() || self.batch_commit_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "commit timeout must be positive".to_string(),
            ));
        }
        if self.proposal_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "proposal timeout must be positive".to_string(),
            ));
        }
        if self.max_in_flight == 0 {
            return Err(ConfigError::Invalid(
                "max_in_flight must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { var, value }),
        Err(_) => Ok(None),
    }
}
