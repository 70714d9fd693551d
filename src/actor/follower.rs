use crate::actor::Callback;
use crate::committer::{
    CommitError, CounterSnapshot, EpochId, FollowerCommitter, FollowerLogMutations, MutationFuture, MutationRequest,
    MutationResponse, Version,
};
use bytes::Bytes;
use std::future;
use tokio::sync::{mpsc, oneshot};

pub(crate) enum FollowerEvent {
    LogMutations {
        epoch_id: EpochId,
        expected_version: Version,
        records: Vec<Bytes>,
        callback: Callback<FollowerLogMutations>,
    },
    CommitMutations(Version),
    IsLoggingSuspended(Callback<bool>),
    SuspendLogging(Callback<()>),
    ResumeLogging(Callback<()>),
    Forward(MutationRequest, Callback<MutationFuture>),
    Counters(Callback<CounterSnapshot>),
}

/// FollowerCommitterClient submits work to the follower committer's event loop.
#[derive(Clone)]
pub struct FollowerCommitterClient {
    sender: mpsc::Sender<FollowerEvent>,
}

impl FollowerCommitterClient {
    pub(crate) fn new(buffer_size: usize) -> (Self, mpsc::Receiver<FollowerEvent>) {
        let (tx, rx) = mpsc::channel(buffer_size);

        (FollowerCommitterClient { sender: tx }, rx)
    }

    /// Hands a replicated batch to the follower. Batches are checked against the logged version
    /// in the order `log_mutations` calls complete.
    pub async fn log_mutations(
        &self,
        epoch_id: EpochId,
        expected_version: Version,
        records: Vec<Bytes>,
    ) -> FollowerLogMutations {
        let result = self
            .call(|callback| FollowerEvent::LogMutations {
                epoch_id,
                expected_version,
                records,
                callback,
            })
            .await;

        match result {
            Ok(outcome) => outcome,
            Err(e) => FollowerLogMutations {
                result: Box::pin(future::ready(Err(e))),
                queued: false,
            },
        }
    }

    /// Applies logged mutations up to `version`. Fire and forget.
    pub async fn commit_mutations(&self, version: Version) -> Result<(), CommitError> {
        self.sender
            .send(FollowerEvent::CommitMutations(version))
            .await
            .map_err(|_| CommitError::CommitterExited)
    }

    pub async fn is_logging_suspended(&self) -> Result<bool, CommitError> {
        self.call(FollowerEvent::IsLoggingSuspended).await
    }

    pub async fn suspend_logging(&self) -> Result<(), CommitError> {
        self.call(FollowerEvent::SuspendLogging).await
    }

    pub async fn resume_logging(&self) -> Result<(), CommitError> {
        self.call(FollowerEvent::ResumeLogging).await
    }

    /// Relays the mutation to the current leader and waits for its response.
    pub async fn forward(&self, request: MutationRequest) -> Result<MutationResponse, CommitError> {
        self.call(|callback| FollowerEvent::Forward(request, callback)).await?.await
    }

    pub async fn counters(&self) -> Result<CounterSnapshot, CommitError> {
        self.call(FollowerEvent::Counters).await
    }

    async fn call<T>(&self, event: impl FnOnce(Callback<T>) -> FollowerEvent) -> Result<T, CommitError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(event(Callback(tx)))
            .await
            .map_err(|_| CommitError::CommitterExited)?;

        rx.await.map_err(|_| CommitError::CommitterExited)
    }
}

/// FollowerActor is the follower committer's event loop.
pub(crate) struct FollowerActor {
    logger: slog::Logger,
    receiver: mpsc::Receiver<FollowerEvent>,
    committer: FollowerCommitter,
}

impl FollowerActor {
    pub(crate) fn new(
        logger: slog::Logger,
        receiver: mpsc::Receiver<FollowerEvent>,
        committer: FollowerCommitter,
    ) -> Self {
        FollowerActor {
            logger,
            receiver,
            committer,
        }
    }

    pub(crate) async fn run_event_loop(mut self) {
        while let Some(event) = self.receiver.recv().await {
            self.handle_event(event);
        }

        slog::info!(self.logger, "Follower committer event loop has exited");
    }

    // This must NOT be async.
    fn handle_event(&mut self, event: FollowerEvent) {
        match event {
            FollowerEvent::LogMutations {
                epoch_id,
                expected_version,
                records,
                callback,
            } => {
                callback.send(self.committer.log_mutations(epoch_id, expected_version, records));
            }
            FollowerEvent::CommitMutations(version) => {
                self.committer.commit_mutations(version);
            }
            FollowerEvent::IsLoggingSuspended(callback) => {
                callback.send(self.committer.is_logging_suspended());
            }
            FollowerEvent::SuspendLogging(callback) => {
                self.committer.suspend_logging();
                callback.send(());
            }
            FollowerEvent::ResumeLogging(callback) => {
                self.committer.resume_logging();
                callback.send(());
            }
            FollowerEvent::Forward(request, callback) => {
                callback.send(self.committer.forward(request));
            }
            FollowerEvent::Counters(callback) => {
                callback.send(self.committer.counters());
            }
        }
    }
}
