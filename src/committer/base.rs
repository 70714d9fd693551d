use crate::automaton::DecoratedAutomaton;
use crate::cell::CellManager;
use crate::committer::EpochContext;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Validated committer settings. See `HydraOptions` for the defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitterConfig {
    pub max_commit_batch_record_count: usize,
    pub max_commit_batch_delay: Duration,
    pub max_changelog_record_count: u32,
    pub max_changelog_data_size: u64,
    pub commit_flush_rpc_timeout: Duration,
    pub commit_forwarding_rpc_timeout: Duration,
    pub snapshot_build_period: Duration,
}

/// Counters owned by one committer.
#[derive(Default)]
pub struct CommitterCounters {
    commits: AtomicU64,
    flushes: AtomicU64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Mutations logged.
    pub commits: u64,
    /// Leader: batches flushed. Follower: replicated batches logged.
    pub flushes: u64,
}

impl CommitterCounters {
    pub(crate) fn add_commits(&self, count: usize) {
        self.commits.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn add_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            commits: self.commits.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
        }
    }
}

/// State shared by the leader and follower committers. Holds no protocol state.
pub(crate) struct CommitterBase {
    pub(crate) config: CommitterConfig,
    pub(crate) cell_manager: Arc<dyn CellManager>,
    pub(crate) automaton: Box<dyn DecoratedAutomaton>,
    pub(crate) epoch: EpochContext,
    pub(crate) logger: slog::Logger,
    pub(crate) counters: Arc<CommitterCounters>,
}

impl CommitterBase {
    pub(crate) fn new(
        logger: slog::Logger,
        config: CommitterConfig,
        cell_manager: Arc<dyn CellManager>,
        automaton: Box<dyn DecoratedAutomaton>,
        epoch: EpochContext,
    ) -> Self {
        let logger = logger.new(slog::o!("CellId" => cell_manager.cell_id().to_string()));

        CommitterBase {
            config,
            cell_manager,
            automaton,
            epoch,
            logger,
            counters: Arc::new(CommitterCounters::default()),
        }
    }
}
