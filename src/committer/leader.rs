use crate::actor::WeakLeaderClient;
use crate::committer::batch::{Batch, FlushContext};
use crate::committer::{
    BatchId, CommitError, CommitterBase, CounterSnapshot, LeaderSignal, LeaderSignalPublisher, LocalFlushFuture,
    MutationFuture, MutationRequest, MutationResponse, QuorumFlushResult, Version,
};
use crate::timers::{AutoCheckpointTimer, BatchFlushTimer};
use bytes::Bytes;
use chrono::Utc;
use std::collections::BTreeMap;
use std::future;
use tokio::sync::oneshot;

/// LeaderCommitter batches mutations on the leader and commits each batch once a quorum of
/// peers has logged it.
///
/// Only one batch is open at a time. It is flushed when it reaches
/// `max_commit_batch_record_count`, when its flush timer fires, on an explicit `flush()`, or
/// when the next mutation doesn't continue it. Flushed batches are remembered by id until
/// their quorum outcome comes back through the invoker.
pub(crate) struct LeaderCommitter {
    base: CommitterBase,
    // Posts continuations (timers, quorum outcomes) back to the event loop that owns us.
    invoker: WeakLeaderClient,
    signals: LeaderSignalPublisher,

    current_batch: Option<OpenBatch>,
    next_batch_id: BatchId,
    // Flushed batch -> version to commit up to once it reaches quorum.
    flushed_batches: BTreeMap<BatchId, Version>,
    prev_quorum_flush_result: QuorumFlushResult,

    logging_suspended: bool,
    pending_mutations: Vec<PendingMutation>,

    _auto_checkpoint_timer: AutoCheckpointTimer,
}

struct OpenBatch {
    batch: Batch,
    // Cancelled on drop.
    _flush_timer: BatchFlushTimer,
}

struct PendingMutation {
    request: MutationRequest,
    promise: oneshot::Sender<Result<MutationResponse, CommitError>>,
}

impl LeaderCommitter {
    pub(crate) fn new(base: CommitterBase, invoker: WeakLeaderClient, signals: LeaderSignalPublisher) -> Self {
        let auto_checkpoint_timer = AutoCheckpointTimer::spawn_timer_task(invoker.clone());

        LeaderCommitter {
            base,
            invoker,
            signals,
            current_batch: None,
            next_batch_id: 1,
            flushed_batches: BTreeMap::new(),
            prev_quorum_flush_result: QuorumFlushResult::resolved(Ok(())),
            logging_suspended: false,
            pending_mutations: vec![],
            _auto_checkpoint_timer: auto_checkpoint_timer,
        }
    }

    pub(crate) fn commit(&mut self, request: MutationRequest) -> MutationFuture {
        if self.logging_suspended {
            let (tx, rx) = oneshot::channel();
            self.pending_mutations.push(PendingMutation { request, promise: tx });

            return Box::pin(async move { rx.await.unwrap_or(Err(CommitError::CommitterExited)) });
        }

        self.log_mutation(request)
    }

    fn log_mutation(&mut self, request: MutationRequest) -> MutationFuture {
        let version = self.base.automaton.logged_version();
        let logged = match self.base.automaton.log_leader_mutation(&request) {
            Ok(logged) => logged,
            Err(e) => {
                slog::warn!(self.base.logger, "Rejecting mutation: {}", e);
                return Box::pin(future::ready(Err(CommitError::InvalidMutation(e))));
            }
        };
        self.base.counters.add_commits(1);

        let quorum_flush_result = self.add_to_batch(version, &request, logged.record_data, logged.local_flush);

        if version.record_id + 1 >= self.base.config.max_changelog_record_count
            || self.base.automaton.logged_data_size() > self.base.config.max_changelog_data_size
        {
            slog::info!(self.base.logger, "Changelog limit reached"; "Version" => %version);
            self.signals.notify(&self.base.logger, LeaderSignal::CheckpointNeeded);
        }

        let response = logged.response;
        Box::pin(async move {
            quorum_flush_result.wait().await?;
            response.await
        })
    }

    fn add_to_batch(
        &mut self,
        version: Version,
        request: &MutationRequest,
        record_data: Bytes,
        local_flush: LocalFlushFuture,
    ) -> QuorumFlushResult {
        let is_stale = match &self.current_batch {
            Some(open) => open.batch.current_version() != version,
            None => false,
        };
        if is_stale {
            self.flush_current_batch();
        }

        let mut open = match self.current_batch.take() {
            Some(open) => open,
            None => self.open_batch(version),
        };
        open.batch.add_mutation(request, record_data, local_flush);
        let quorum_flush_result = open.batch.quorum_flush_result();
        let is_full = open.batch.mutation_count() >= self.base.config.max_commit_batch_record_count;
        self.current_batch = Some(open);

        if is_full {
            self.flush_current_batch();
        }

        quorum_flush_result
    }

    fn open_batch(&mut self, start_version: Version) -> OpenBatch {
        let batch_id = self.next_batch_id;
        self.next_batch_id += 1;

        let batch = Batch::new(&self.base.logger, batch_id, start_version);

        let quorum_flush_result = batch.quorum_flush_result();
        let invoker = self.invoker.clone();
        tokio::spawn(async move {
            let result = quorum_flush_result.wait().await;
            invoker.batch_committed(batch_id, result).await;
        });

        let flush_timer =
            BatchFlushTimer::spawn_timer_task(self.base.config.max_commit_batch_delay, self.invoker.clone(), batch_id);

        OpenBatch {
            batch,
            _flush_timer: flush_timer,
        }
    }

    fn flush_current_batch(&mut self) -> QuorumFlushResult {
        let open = match self.current_batch.take() {
            Some(open) => open,
            None => return self.prev_quorum_flush_result.clone(),
        };
        // Drops the flush timer with it.
        let batch = open.batch;

        let context = FlushContext {
            cell_manager: self.base.cell_manager.clone(),
            epoch_id: self.base.epoch.epoch_id,
            committed_version: self.base.automaton.automaton_version(),
            rpc_timeout: self.base.config.commit_flush_rpc_timeout,
        };
        let flushed = batch.flush(context);
        self.base.counters.add_flush();

        self.flushed_batches.insert(flushed.id, flushed.committed_version);
        self.prev_quorum_flush_result = flushed.quorum_flush_result.clone();

        flushed.quorum_flush_result
    }

    /// Flushes the open batch, if any. Resolves once everything committed so far has reached
    /// quorum.
    pub(crate) fn flush(&mut self) -> QuorumFlushResult {
        self.flush_current_batch()
    }

    pub(crate) fn quorum_flush_result(&self) -> QuorumFlushResult {
        match &self.current_batch {
            Some(open) => open.batch.quorum_flush_result(),
            None => self.prev_quorum_flush_result.clone(),
        }
    }

    pub(crate) fn is_logging_suspended(&self) -> bool {
        self.logging_suspended
    }

    pub(crate) fn suspend_logging(&mut self) {
        assert!(!self.logging_suspended, "Logging is already suspended");
        assert!(self.pending_mutations.is_empty(), "Pending mutations left from last suspension");

        slog::info!(self.base.logger, "Mutations logging suspended");
        self.logging_suspended = true;
    }

    pub(crate) fn resume_logging(&mut self) {
        assert!(self.logging_suspended, "Logging is not suspended");

        slog::info!(
            self.base.logger,
            "Mutations logging resumed";
            "PendingCount" => self.pending_mutations.len()
        );

        let pending_mutations = std::mem::take(&mut self.pending_mutations);
        for pending in pending_mutations {
            let response = self.log_mutation(pending.request);
            let promise = pending.promise;
            tokio::spawn(async move {
                let _ = promise.send(response.await);
            });
        }

        self.logging_suspended = false;
    }

    pub(crate) fn on_batch_timeout(&mut self, batch_id: BatchId) {
        let is_current = match &self.current_batch {
            Some(open) => open.batch.id() == batch_id,
            None => false,
        };

        // The batch may have been flushed some other way before the timer's event got here.
        if is_current {
            slog::debug!(self.base.logger, "Flushing batch on timeout"; "BatchId" => batch_id);
            self.flush_current_batch();
        }
    }

    pub(crate) fn on_batch_committed(&mut self, batch_id: BatchId, result: Result<(), CommitError>) {
        let committed_version = self.flushed_batches.remove(&batch_id);

        match (result, committed_version) {
            (Ok(()), Some(committed_version)) => {
                self.base.automaton.commit_mutations(committed_version);
            }
            (Ok(()), None) => {
                slog::warn!(self.base.logger, "Quorum reached for unknown batch"; "BatchId" => batch_id);
            }
            (Err(e), _) => {
                slog::error!(self.base.logger, "Error committing mutations: {}", e; "BatchId" => batch_id);
                self.signals.notify(&self.base.logger, LeaderSignal::CommitFailed(e));
            }
        }
    }

    pub(crate) fn on_auto_checkpoint_check(&mut self) {
        let period = match chrono::Duration::from_std(self.base.config.snapshot_build_period) {
            Ok(period) => period,
            Err(_) => return,
        };

        if Utc::now() > self.base.automaton.last_snapshot_time() + period {
            slog::info!(self.base.logger, "Snapshot build period elapsed");
            self.signals.notify(&self.base.logger, LeaderSignal::CheckpointNeeded);
        }
    }

    pub(crate) fn counters(&self) -> CounterSnapshot {
        self.base.counters.snapshot()
    }
}
