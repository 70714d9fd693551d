use crate::committer::CommitterConfig;
use std::convert::TryFrom;
use tokio::time::Duration;

/// Tunables for the commit pipeline. Unset fields get defaults.
#[derive(Clone, Debug, Default)]
pub struct HydraOptions {
    /// A batch is flushed once it holds this many mutations.
    pub max_commit_batch_record_count: Option<usize>,
    /// A batch is flushed at the latest this long after it was opened.
    pub max_commit_batch_delay: Option<Duration>,
    /// Checkpoint is requested once a changelog segment holds this many records.
    pub max_changelog_record_count: Option<u32>,
    /// Checkpoint is requested once a changelog segment holds more than this many bytes.
    pub max_changelog_data_size: Option<u64>,
    pub commit_flush_rpc_timeout: Option<Duration>,
    pub commit_forwarding_rpc_timeout: Option<Duration>,
    /// Checkpoint is requested if the last snapshot is older than this.
    pub snapshot_build_period: Option<Duration>,
}

impl CommitterConfig {
    fn validate(&self) -> Result<(), &'static str> {
        if self.max_commit_batch_record_count == 0 {
            return Err("Max commit batch record count must be positive");
        }
        if self.max_commit_batch_delay == Duration::from_secs(0) {
            return Err("Max commit batch delay must be positive");
        }
        if self.max_changelog_record_count == 0 {
            return Err("Max changelog record count must be positive");
        }
        if self.max_changelog_data_size == 0 {
            return Err("Max changelog data size must be positive");
        }
        if self.commit_flush_rpc_timeout == Duration::from_secs(0) {
            return Err("Commit flush RPC timeout must be positive");
        }
        if self.commit_forwarding_rpc_timeout == Duration::from_secs(0) {
            return Err("Commit forwarding RPC timeout must be positive");
        }
        if self.snapshot_build_period == Duration::from_secs(0) {
            return Err("Snapshot build period must be positive");
        }

        Ok(())
    }
}

impl TryFrom<HydraOptions> for CommitterConfig {
    type Error = &'static str;

    fn try_from(options: HydraOptions) -> Result<Self, Self::Error> {
        let values = CommitterConfig {
            max_commit_batch_record_count: options.max_commit_batch_record_count.unwrap_or(10_000),
            max_commit_batch_delay: options.max_commit_batch_delay.unwrap_or(Duration::from_millis(10)),
            max_changelog_record_count: options.max_changelog_record_count.unwrap_or(1_000_000),
            max_changelog_data_size: options.max_changelog_data_size.unwrap_or(1 << 30),
            commit_flush_rpc_timeout: options.commit_flush_rpc_timeout.unwrap_or(Duration::from_secs(15)),
            commit_forwarding_rpc_timeout: options
                .commit_forwarding_rpc_timeout
                .unwrap_or(Duration::from_secs(30)),
            snapshot_build_period: options.snapshot_build_period.unwrap_or(Duration::from_secs(60 * 60)),
        };

        values.validate()?;
        Ok(values)
    }
}
