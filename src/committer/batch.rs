use crate::cell::{CellManager, LogMutationsRequest};
use crate::committer::promise::{quorum_promise, QuorumPromise};
use crate::committer::{
    CommitError, EpochId, LocalFlushFuture, MutationRequest, PeerId, QuorumFlushResult, RpcError, Version,
};
use bytes::Bytes;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub(crate) type BatchId = u64;

/// Batch is an open run of consecutive mutations on the leader, covering versions
/// `[start_version, start_version + mutation_count)`. It stops accepting mutations once flushed,
/// which consumes it.
pub(crate) struct Batch {
    id: BatchId,
    logger: slog::Logger,
    start_version: Version,
    records: Vec<Bytes>,
    // Only the last one matters. The changelog is append only, so it implies the others.
    local_flush: Option<LocalFlushFuture>,
    promise: QuorumPromise,
    quorum_flush_result: QuorumFlushResult,
}

pub(crate) struct FlushContext {
    pub(crate) cell_manager: Arc<dyn CellManager>,
    pub(crate) epoch_id: EpochId,
    /// The automaton's committed version at send time, not this batch's.
    pub(crate) committed_version: Version,
    pub(crate) rpc_timeout: Duration,
}

/// What's left of a batch after `flush()`.
pub(crate) struct FlushedBatch {
    pub(crate) id: BatchId,
    pub(crate) committed_version: Version,
    pub(crate) quorum_flush_result: QuorumFlushResult,
}

#[derive(Debug)]
enum FlushAck {
    LocalLogged,
    LocalFailed(io::Error),
    RemoteLogged(PeerId),
    RemoteAcknowledged(PeerId),
    RemoteFailed(PeerId, RpcError),
}

impl Batch {
    pub(crate) fn new(logger: &slog::Logger, id: BatchId, start_version: Version) -> Self {
        let (promise, quorum_flush_result) = quorum_promise();

        Batch {
            id,
            logger: logger.new(slog::o!("StartVersion" => start_version.to_string())),
            start_version,
            records: vec![],
            local_flush: None,
            promise,
            quorum_flush_result,
        }
    }

    pub(crate) fn id(&self) -> BatchId {
        self.id
    }

    pub(crate) fn add_mutation(
        &mut self,
        request: &MutationRequest,
        record_data: Bytes,
        local_flush: LocalFlushFuture,
    ) {
        let current_version = self.current_version();
        self.records.push(record_data);
        self.local_flush = Some(local_flush);

        slog::debug!(
            self.logger,
            "Mutation batched";
            "Version" => %current_version,
            "MutationType" => &request.mutation_type
        );
    }

    pub(crate) fn mutation_count(&self) -> usize {
        self.records.len()
    }

    /// Version the next added mutation must have.
    pub(crate) fn current_version(&self) -> Version {
        self.start_version.advance(self.records.len())
    }

    pub(crate) fn quorum_flush_result(&self) -> QuorumFlushResult {
        self.quorum_flush_result.clone()
    }

    /// Ships the batch to the local changelog and every reachable follower. Must be called from
    /// within a tokio runtime.
    pub(crate) fn flush(mut self, context: FlushContext) -> FlushedBatch {
        let committed_version = self.current_version();
        let flushed = FlushedBatch {
            id: self.id,
            committed_version,
            quorum_flush_result: self.quorum_flush_result.clone(),
        };

        let local_flush = match self.local_flush.take() {
            Some(local_flush) => local_flush,
            None => {
                // Nothing to flush.
                self.promise.set(Ok(()));
                return flushed;
            }
        };

        slog::debug!(
            self.logger,
            "Flushing batch";
            "MutationCount" => self.records.len(),
            "CommittedVersion" => %committed_version
        );

        let (ack_tx, ack_rx) = mpsc::unbounded_channel();

        let local_ack_tx = ack_tx.clone();
        tokio::spawn(async move {
            let ack = match local_flush.await {
                Ok(()) => FlushAck::LocalLogged,
                Err(e) => FlushAck::LocalFailed(e),
            };
            let _ = local_ack_tx.send(ack);
        });

        let cell_manager = &context.cell_manager;
        for peer in 0..cell_manager.peer_count() {
            let peer_id = PeerId(peer);
            if peer_id == cell_manager.self_peer_id() {
                continue;
            }
            let channel = match cell_manager.peer_channel(peer_id) {
                Some(channel) => channel,
                None => continue,
            };

            let request = LogMutationsRequest {
                epoch_id: context.epoch_id,
                start_version: self.start_version,
                committed_version: context.committed_version,
                records: self.records.clone(),
            };
            let rpc_timeout = context.rpc_timeout;
            let remote_ack_tx = ack_tx.clone();
            tokio::spawn(async move {
                let ack = match tokio::time::timeout(rpc_timeout, channel.log_mutations(request)).await {
                    Ok(Ok(response)) if response.logged => FlushAck::RemoteLogged(peer_id),
                    Ok(Ok(_)) => FlushAck::RemoteAcknowledged(peer_id),
                    Ok(Err(e)) => FlushAck::RemoteFailed(peer_id, e),
                    Err(elapsed) => FlushAck::RemoteFailed(peer_id, elapsed.into()),
                };
                let _ = remote_ack_tx.send(ack);
            });
        }
        drop(ack_tx);

        let tracker = QuorumTracker {
            logger: self.logger,
            promise: self.promise,
            quorum_count: cell_manager.quorum_count(),
            peer_count: cell_manager.peer_count(),
            flush_count: 0,
        };
        tokio::spawn(tracker.run(ack_rx));

        flushed
    }
}

/// Counts "logged" acks from the local flush and the followers. Resolves the promise as soon as
/// quorum is reached, or with an uncertain error once every attempt is done without it.
struct QuorumTracker {
    logger: slog::Logger,
    promise: QuorumPromise,
    quorum_count: usize,
    peer_count: usize,
    flush_count: usize,
}

impl QuorumTracker {
    async fn run(mut self, mut acks: mpsc::UnboundedReceiver<FlushAck>) {
        while let Some(ack) = acks.recv().await {
            match ack {
                FlushAck::LocalLogged => {
                    slog::debug!(self.logger, "Mutations are flushed locally");
                    self.on_flushed();
                }
                FlushAck::LocalFailed(e) => {
                    slog::error!(self.logger, "Local flush failed: {}", e);
                    self.promise.set(Err(CommitError::LocalFlushFailed));
                }
                FlushAck::RemoteLogged(peer_id) => {
                    slog::debug!(self.logger, "Mutations are flushed by follower"; "PeerId" => %peer_id);
                    self.on_flushed();
                }
                FlushAck::RemoteAcknowledged(peer_id) => {
                    slog::debug!(self.logger, "Mutations are acknowledged by follower"; "PeerId" => %peer_id);
                }
                FlushAck::RemoteFailed(peer_id, e) => {
                    slog::warn!(self.logger, "Error logging mutations at follower: {}", e; "PeerId" => %peer_id);
                }
            }
        }

        // No-op if quorum was reached or the local flush failed.
        self.promise.set(Err(CommitError::QuorumNotReached {
            successful: self.flush_count,
            total: self.peer_count,
        }));
    }

    fn on_flushed(&mut self) {
        self.flush_count += 1;
        if self.flush_count == self.quorum_count {
            self.promise.set(Ok(()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{discard_logger, ready_flush, test_cell, test_cell_without_channels, FakePeerChannel};

    fn context(cell_manager: Arc<dyn CellManager>, rpc_timeout: Duration) -> FlushContext {
        FlushContext {
            cell_manager,
            epoch_id: EpochId(3),
            committed_version: Version::new(0, 0),
            rpc_timeout,
        }
    }

    fn batch_of(start: Version, count: usize) -> Batch {
        let mut batch = Batch::new(&discard_logger(), 1, start);
        for i in 0..count {
            let request = MutationRequest::new("t", format!("{}", i));
            batch.add_mutation(&request, request.data.clone(), ready_flush(Ok(())));
        }
        batch
    }

    #[test]
    fn records_stay_contiguous() {
        let mut batch = Batch::new(&discard_logger(), 7, Version::new(2, 40));
        assert_eq!(batch.current_version(), Version::new(2, 40));

        for i in 0..5 {
            assert_eq!(batch.current_version(), Version::new(2, 40 + i));
            let request = MutationRequest::new("t", "x");
            batch.add_mutation(&request, request.data.clone(), ready_flush(Ok(())));
        }

        assert_eq!(batch.id(), 7);
        assert_eq!(batch.mutation_count(), 5);
        assert_eq!(batch.start_version, Version::new(2, 40));
        assert_eq!(batch.current_version(), Version::new(2, 45));
    }

    #[tokio::test]
    async fn empty_flush_succeeds_without_io() {
        let follower = Arc::new(FakePeerChannel::logged());
        let cell = test_cell(vec![follower.clone()]);

        let flushed = Batch::new(&discard_logger(), 1, Version::new(0, 5)).flush(context(cell, Duration::from_secs(1)));

        assert_eq!(flushed.committed_version, Version::new(0, 5));
        assert_eq!(flushed.quorum_flush_result.wait().await, Ok(()));
        assert!(follower.log_requests().is_empty());
    }

    #[tokio::test]
    async fn quorum_reached_while_a_follower_hangs() {
        let logged = Arc::new(FakePeerChannel::logged());
        let hanging = Arc::new(FakePeerChannel::hanging());
        let cell = test_cell(vec![logged.clone(), hanging.clone()]);

        let flushed = batch_of(Version::new(0, 0), 2).flush(context(cell, Duration::from_secs(60)));

        let result = tokio::time::timeout(Duration::from_secs(5), flushed.quorum_flush_result.wait())
            .await
            .expect("quorum should not wait for the hanging follower");
        assert_eq!(result, Ok(()));
        assert_eq!(flushed.committed_version, Version::new(0, 2));

        let requests = logged.log_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].epoch_id, EpochId(3));
        assert_eq!(requests[0].start_version, Version::new(0, 0));
        assert_eq!(requests[0].records, vec![Bytes::from("0"), Bytes::from("1")]);
    }

    #[tokio::test]
    async fn acknowledged_is_not_logged() {
        let cell = test_cell(vec![
            Arc::new(FakePeerChannel::acknowledged()),
            Arc::new(FakePeerChannel::acknowledged()),
        ]);

        let flushed = batch_of(Version::new(0, 0), 1).flush(context(cell, Duration::from_secs(1)));

        assert_eq!(
            flushed.quorum_flush_result.wait().await,
            Err(CommitError::QuorumNotReached { successful: 1, total: 3 })
        );
    }

    #[tokio::test]
    async fn timeouts_and_failures_leave_the_batch_uncertain() {
        let cell = test_cell(vec![
            Arc::new(FakePeerChannel::failing()),
            Arc::new(FakePeerChannel::hanging()),
        ]);

        let flushed = batch_of(Version::new(0, 0), 1).flush(context(cell, Duration::from_millis(50)));

        let err = flushed.quorum_flush_result.wait().await.unwrap_err();
        assert_eq!(err, CommitError::QuorumNotReached { successful: 1, total: 3 });
        assert!(err.is_maybe_committed());
    }

    #[tokio::test]
    async fn local_failure_without_followers() {
        let cell = test_cell(vec![Arc::new(FakePeerChannel::failing())]);

        let mut batch = Batch::new(&discard_logger(), 1, Version::new(0, 0));
        let request = MutationRequest::new("t", "x");
        batch.add_mutation(
            &request,
            request.data.clone(),
            ready_flush(Err(io::Error::new(io::ErrorKind::Other, "disk gone"))),
        );

        let result = batch.flush(context(cell, Duration::from_secs(1))).quorum_flush_result.wait().await;
        assert_eq!(result, Err(CommitError::LocalFlushFailed));
    }

    #[tokio::test]
    async fn unreachable_peers_are_skipped_but_counted_in_total() {
        let cell = test_cell_without_channels(3);

        let flushed = batch_of(Version::new(1, 0), 1).flush(context(cell, Duration::from_secs(1)));

        assert_eq!(
            flushed.quorum_flush_result.wait().await,
            Err(CommitError::QuorumNotReached { successful: 1, total: 3 })
        );
    }
}
