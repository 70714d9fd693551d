use crate::committer::CommitError;
use tokio::sync::mpsc;

/// Signals the leader raises for collaborators outside the commit pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeaderSignal {
    /// A changelog threshold or the snapshot period was crossed. Advisory.
    CheckpointNeeded,
    /// A batch failed to reach quorum. Usually means the leader should step down.
    CommitFailed(CommitError),
}

pub(crate) fn new() -> (LeaderSignalPublisher, LeaderSignalListener) {
    let (tx, rx) = mpsc::unbounded_channel();

    (LeaderSignalPublisher { sender: tx }, LeaderSignalListener { receiver: rx })
}

pub(crate) struct LeaderSignalPublisher {
    sender: mpsc::UnboundedSender<LeaderSignal>,
}

impl LeaderSignalPublisher {
    pub(crate) fn notify(&self, logger: &slog::Logger, signal: LeaderSignal) {
        slog::info!(logger, "Leader signal: {:?}", signal);

        if self.sender.send(signal).is_err() {
            slog::debug!(logger, "LeaderSignalListener has disconnected.");
        }
    }
}

pub struct LeaderSignalListener {
    receiver: mpsc::UnboundedReceiver<LeaderSignal>,
}

impl LeaderSignalListener {
    /// None once the leader committer has exited.
    pub async fn next(&mut self) -> Option<LeaderSignal> {
        self.receiver.recv().await
    }

    pub fn try_next(&mut self) -> Option<LeaderSignal> {
        self.receiver.try_recv().ok()
    }
}
