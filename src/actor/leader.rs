use crate::actor::Callback;
use crate::committer::{
    BatchId, CommitError, CounterSnapshot, LeaderCommitter, MutationFuture, MutationRequest, MutationResponse,
    QuorumFlushResult,
};
use std::future;
use tokio::sync::{mpsc, oneshot};

pub(crate) enum LeaderEvent {
    Commit(MutationRequest, Callback<MutationFuture>),
    Flush(Callback<QuorumFlushResult>),
    QuorumFlushResult(Callback<QuorumFlushResult>),
    SuspendLogging(Callback<()>),
    ResumeLogging(Callback<()>),
    IsLoggingSuspended(Callback<bool>),
    Counters(Callback<CounterSnapshot>),

    // Continuations posted by timers and flushed batches.
    BatchTimeout(BatchId),
    BatchCommitted(BatchId, Result<(), CommitError>),
    AutoCheckpointCheck,
}

/// LeaderCommitterClient submits work to the leader committer's event loop. All methods fail
/// with `CommitError::CommitterExited` once the event loop is gone.
#[derive(Clone)]
pub struct LeaderCommitterClient {
    sender: mpsc::Sender<LeaderEvent>,
}

impl LeaderCommitterClient {
    pub(crate) fn new(buffer_size: usize) -> (Self, mpsc::Receiver<LeaderEvent>) {
        let (tx, rx) = mpsc::channel(buffer_size);

        (LeaderCommitterClient { sender: tx }, rx)
    }

    pub(crate) fn weak(&self) -> WeakLeaderClient {
        WeakLeaderClient {
            sender: self.sender.downgrade(),
        }
    }

    /// Hands the mutation to the committer and returns the future of its response without
    /// waiting for it. Mutations are logged in the order `start_commit` calls complete.
    pub async fn start_commit(&self, request: MutationRequest) -> MutationFuture {
        match self.call(|callback| LeaderEvent::Commit(request, callback)).await {
            Ok(response) => response,
            Err(e) => Box::pin(future::ready(Err(e))),
        }
    }

    pub async fn commit(&self, request: MutationRequest) -> Result<MutationResponse, CommitError> {
        self.start_commit(request).await.await
    }

    pub async fn flush(&self) -> QuorumFlushResult {
        self.call(LeaderEvent::Flush)
            .await
            .unwrap_or_else(|e| QuorumFlushResult::resolved(Err(e)))
    }

    pub async fn quorum_flush_result(&self) -> QuorumFlushResult {
        self.call(LeaderEvent::QuorumFlushResult)
            .await
            .unwrap_or_else(|e| QuorumFlushResult::resolved(Err(e)))
    }

    pub async fn suspend_logging(&self) -> Result<(), CommitError> {
        self.call(LeaderEvent::SuspendLogging).await
    }

    pub async fn resume_logging(&self) -> Result<(), CommitError> {
        self.call(LeaderEvent::ResumeLogging).await
    }

    pub async fn is_logging_suspended(&self) -> Result<bool, CommitError> {
        self.call(LeaderEvent::IsLoggingSuspended).await
    }

    pub async fn counters(&self) -> Result<CounterSnapshot, CommitError> {
        self.call(LeaderEvent::Counters).await
    }

    async fn call<T>(&self, event: impl FnOnce(Callback<T>) -> LeaderEvent) -> Result<T, CommitError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(event(Callback(tx)))
            .await
            .map_err(|_| CommitError::CommitterExited)?;

        rx.await.map_err(|_| CommitError::CommitterExited)
    }
}

/// WeakLeaderClient doesn't keep the event loop alive. Used by tasks the committer spawns, so
/// that they don't outlive it.
#[derive(Clone)]
pub(crate) struct WeakLeaderClient {
    sender: mpsc::WeakSender<LeaderEvent>,
}

impl WeakLeaderClient {
    pub(crate) async fn batch_timeout(&self, batch_id: BatchId) {
        self.send(LeaderEvent::BatchTimeout(batch_id)).await;
    }

    pub(crate) async fn batch_committed(&self, batch_id: BatchId, result: Result<(), CommitError>) {
        self.send(LeaderEvent::BatchCommitted(batch_id, result)).await;
    }

    pub(crate) async fn auto_checkpoint_check(&self) {
        self.send(LeaderEvent::AutoCheckpointCheck).await;
    }

    /// Silently dropped if the event loop has exited.
    async fn send(&self, event: LeaderEvent) {
        if let Some(sender) = self.sender.upgrade() {
            let _ = sender.send(event).await;
        }
    }
}

/// LeaderActor is the leader committer's event loop. Every committer method runs here.
pub(crate) struct LeaderActor {
    logger: slog::Logger,
    receiver: mpsc::Receiver<LeaderEvent>,
    committer: LeaderCommitter,
}

impl LeaderActor {
    pub(crate) fn new(logger: slog::Logger, receiver: mpsc::Receiver<LeaderEvent>, committer: LeaderCommitter) -> Self {
        LeaderActor {
            logger,
            receiver,
            committer,
        }
    }

    pub(crate) async fn run_event_loop(mut self) {
        while let Some(event) = self.receiver.recv().await {
            self.handle_event(event);
        }

        slog::info!(self.logger, "Leader committer event loop has exited");
    }

    // This must NOT be async. Anything long running is spawned and reports back as an event.
    fn handle_event(&mut self, event: LeaderEvent) {
        match event {
            LeaderEvent::Commit(request, callback) => {
                callback.send(self.committer.commit(request));
            }
            LeaderEvent::Flush(callback) => {
                callback.send(self.committer.flush());
            }
            LeaderEvent::QuorumFlushResult(callback) => {
                callback.send(self.committer.quorum_flush_result());
            }
            LeaderEvent::SuspendLogging(callback) => {
                self.committer.suspend_logging();
                callback.send(());
            }
            LeaderEvent::ResumeLogging(callback) => {
                self.committer.resume_logging();
                callback.send(());
            }
            LeaderEvent::IsLoggingSuspended(callback) => {
                callback.send(self.committer.is_logging_suspended());
            }
            LeaderEvent::Counters(callback) => {
                callback.send(self.committer.counters());
            }
            LeaderEvent::BatchTimeout(batch_id) => {
                self.committer.on_batch_timeout(batch_id);
            }
            LeaderEvent::BatchCommitted(batch_id, result) => {
                self.committer.on_batch_committed(batch_id, result);
            }
            LeaderEvent::AutoCheckpointCheck => {
                self.committer.on_auto_checkpoint_check();
            }
        }
    }
}
