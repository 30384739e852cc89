//! # Runtime Configuration
//!
//! Everything the gateway binary needs besides telemetry: which directory
//! to load, who to act as, which channel and chaincode to drive, and
//! whether to run a batch ingest.

use crate::devnet::DEVNET_DIRECTORY;
use lg_submission::{ConfigError, NetworkDirectory, SubmissionConfig};
use shared_types::{ChaincodeId, ChannelId, OrgId};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Default devnet block interval.
pub const DEFAULT_BLOCK_INTERVAL: Duration = Duration::from_millis(250);

/// Gateway runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Network directory file; the built-in devnet directory when unset
    pub network_config: Option<PathBuf>,
    /// Organization the gateway acts for
    pub org: OrgId,
    /// Enrollment name of the acting user
    pub user: String,
    pub channel: ChannelId,
    pub chaincode: ChaincodeId,
    /// JSON array of catches to ingest; interactive flow when unset
    pub batch_file: Option<PathBuf>,
    /// Delay between ordering and commit on the devnet ledger
    pub block_interval: Duration,
    pub submission: SubmissionConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            network_config: None,
            org: OrgId::new("org1"),
            user: "user1".to_string(),
            channel: ChannelId::new("mychannel"),
            chaincode: ChaincodeId::new("tuna-app"),
            batch_file: None,
            block_interval: DEFAULT_BLOCK_INTERVAL,
            submission: SubmissionConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `LG_NETWORK_CONFIG`: network directory JSON file
    /// - `LG_ORG`: acting organization (default: org1)
    /// - `LG_USER`: acting user (default: user1)
    /// - `LG_CHANNEL`: channel (default: mychannel)
    /// - `LG_CHAINCODE`: chaincode (default: tuna-app)
    /// - `LG_BATCH_FILE`: batch ingest input
    /// - `LG_BLOCK_INTERVAL_MS`: devnet block interval
    ///
    /// Submission settings come from [`SubmissionConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            submission: SubmissionConfig::from_env()?,
            ..Self::default()
        };

        if let Ok(path) = env::var("LG_NETWORK_CONFIG") {
            config.network_config = Some(PathBuf::from(path));
        }
        if let Ok(org) = env::var("LG_ORG") {
            config.org = OrgId::new(org);
        }
        if let Ok(user) = env::var("LG_USER") {
            config.user = user;
        }
        if let Ok(channel) = env::var("LG_CHANNEL") {
            config.channel = ChannelId::new(channel);
        }
        if let Ok(chaincode) = env::var("LG_CHAINCODE") {
            config.chaincode = ChaincodeId::new(chaincode);
        }
        if let Ok(path) = env::var("LG_BATCH_FILE") {
            config.batch_file = Some(PathBuf::from(path));
        }
        if let Ok(value) = env::var("LG_BLOCK_INTERVAL_MS") {
            let ms = value.trim().parse::<u64>().map_err(|_| ConfigError::Env {
                var: "LG_BLOCK_INTERVAL_MS",
                value,
            })?;
            config.block_interval = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// The configured directory, or the devnet one.
    pub fn load_directory(&self) -> Result<NetworkDirectory, ConfigError> {
        match &self.network_config {
            Some(path) => NetworkDirectory::from_path(path),
            None => {
                info!("LG_NETWORK_CONFIG not set, using the devnet directory");
                NetworkDirectory::from_json_str(DEVNET_DIRECTORY)
            }
        }
    }
}
