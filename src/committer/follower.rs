use crate::committer::{
    CommitError, CommitterBase, CounterSnapshot, EpochId, LogMutationsFuture, MutationFuture, MutationRequest,
    RpcError, Version,
};
use bytes::Bytes;
use std::future;
use tokio::sync::oneshot;

/// Outcome of handing a replicated batch to the follower.
pub struct FollowerLogMutations {
    pub result: LogMutationsFuture,
    /// True if logging is suspended and the batch was queued instead of logged.
    pub queued: bool,
}

/// FollowerCommitter logs record batches replicated by the leader, strictly in version order.
pub(crate) struct FollowerCommitter {
    base: CommitterBase,
    logging_suspended: bool,
    pending_mutations: Vec<PendingMutations>,
}

struct PendingMutations {
    expected_version: Version,
    records: Vec<Bytes>,
    promise: oneshot::Sender<Result<(), CommitError>>,
}

impl FollowerCommitter {
    pub(crate) fn new(base: CommitterBase) -> Self {
        FollowerCommitter {
            base,
            logging_suspended: false,
            pending_mutations: vec![],
        }
    }

    pub(crate) fn log_mutations(
        &mut self,
        epoch_id: EpochId,
        expected_version: Version,
        records: Vec<Bytes>,
    ) -> FollowerLogMutations {
        if epoch_id != self.base.epoch.epoch_id {
            slog::warn!(
                self.base.logger,
                "Rejecting mutations from epoch {:?}, current epoch is {:?}",
                epoch_id,
                self.base.epoch.epoch_id
            );
            return FollowerLogMutations {
                result: Box::pin(future::ready(Err(CommitError::EpochMismatch {
                    expected: self.base.epoch.epoch_id,
                    actual: epoch_id,
                }))),
                queued: false,
            };
        }

        if self.logging_suspended {
            let (tx, rx) = oneshot::channel();
            self.pending_mutations.push(PendingMutations {
                expected_version,
                records,
                promise: tx,
            });

            return FollowerLogMutations {
                result: Box::pin(async move { rx.await.unwrap_or(Err(CommitError::CommitterExited)) }),
                queued: true,
            };
        }

        FollowerLogMutations {
            result: self.do_log_mutations(expected_version, records),
            queued: false,
        }
    }

    fn do_log_mutations(&mut self, expected_version: Version, records: Vec<Bytes>) -> LogMutationsFuture {
        let logged_version = self.base.automaton.logged_version();
        if logged_version != expected_version {
            return Box::pin(future::ready(Err(CommitError::OutOfOrderMutations {
                logged: logged_version,
                received: expected_version,
            })));
        }

        let record_count = records.len();
        let mut last_flush = None;
        for record in records {
            // Appends are ordered, so the last record being durable implies the rest are.
            last_flush = Some(self.base.automaton.log_follower_mutation(record));
        }

        self.base.counters.add_commits(record_count);
        self.base.counters.add_flush();

        slog::debug!(
            self.base.logger,
            "Mutations logged by follower";
            "StartVersion" => %expected_version,
            "MutationCount" => record_count
        );

        match last_flush {
            Some(flush) => Box::pin(async move { flush.await.map_err(|_| CommitError::LocalFlushFailed) }),
            None => Box::pin(future::ready(Ok(()))),
        }
    }

    /// Applies replicated mutations up to `version`, as far as they are logged.
    pub(crate) fn commit_mutations(&mut self, version: Version) {
        self.base.automaton.commit_mutations(version);
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
            let result = self.do_log_mutations(pending.expected_version, pending.records);
            let promise = pending.promise;
            tokio::spawn(async move {
                let _ = promise.send(result.await);
            });
        }

        self.logging_suspended = false;
    }

    /// Relays a mutation to the leader of the current epoch.
    pub(crate) fn forward(&self, request: MutationRequest) -> MutationFuture {
        let leader_id = self.base.epoch.leader_id;
        let channel = match self.base.cell_manager.peer_channel(leader_id) {
            Some(channel) => channel,
            None => {
                slog::warn!(self.base.logger, "No channel to leader {}", leader_id);
                return Box::pin(future::ready(Err(CommitError::NoLeaderChannel)));
            }
        };

        let logger = self.base.logger.clone();
        let timeout = self.base.config.commit_forwarding_rpc_timeout;
        Box::pin(async move {
            let result = match tokio::time::timeout(timeout, channel.commit_mutation(request)).await {
                Ok(result) => result,
                Err(elapsed) => Err(RpcError::from(elapsed)),
            };

            result.map_err(|e| {
                slog::warn!(logger, "Error forwarding mutation to leader {}: {}", leader_id, e);
                CommitError::Forwarding(e)
            })
        })
    }

    pub(crate) fn counters(&self) -> CounterSnapshot {
        self.base.counters.snapshot()
    }
}
