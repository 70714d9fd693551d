//! Fakes shared by unit tests across the crate.
use crate::actor::{LeaderActor, LeaderCommitterClient};
use crate::automaton::{
    Automaton, Changelog, ChangelogStore, DecoratedAutomaton, InMemoryChangelogStore, MemoryAutomaton, MutationContext,
};
use crate::cell::{CellManager, LogMutationsRequest, LogMutationsResponse, PeerChannel, StaticCellManager};
use crate::committer::{
    self, CommitterBase, CommitterConfig, EpochContext, EpochId, LeaderCommitter, LeaderSignalListener,
    LocalFlushFuture, MutationRequest, MutationResponse, PeerId, RpcError, Version,
};
use bytes::Bytes;
use std::future;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

pub(crate) fn discard_logger() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}

pub(crate) fn ready_flush(result: io::Result<()>) -> LocalFlushFuture {
    Box::pin(future::ready(result))
}

pub(crate) fn test_config() -> CommitterConfig {
    CommitterConfig {
        max_commit_batch_record_count: 100,
        max_commit_batch_delay: Duration::from_millis(10),
        max_changelog_record_count: 1_000,
        max_changelog_data_size: 1 << 20,
        commit_flush_rpc_timeout: Duration::from_secs(1),
        commit_forwarding_rpc_timeout: Duration::from_secs(1),
        snapshot_build_period: Duration::from_secs(60 * 60),
    }
}

/// Cell where self is peer 0 and `followers[i]` is peer `i + 1`.
pub(crate) fn test_cell(followers: Vec<Arc<FakePeerChannel>>) -> Arc<dyn CellManager> {
    let mut channels: Vec<Option<Arc<dyn PeerChannel>>> = vec![None];
    for follower in followers {
        channels.push(Some(follower as Arc<dyn PeerChannel>));
    }

    Arc::new(StaticCellManager::from_channels("test-cell".into(), PeerId(0), channels).unwrap())
}

/// Cell of `peer_count` peers, none of them reachable.
pub(crate) fn test_cell_without_channels(peer_count: usize) -> Arc<dyn CellManager> {
    Arc::new(StaticCellManager::from_channels("test-cell".into(), PeerId(0), vec![None; peer_count]).unwrap())
}

pub(crate) fn test_memory_automaton() -> (MemoryAutomaton, RecordingAutomaton) {
    let recorder = RecordingAutomaton::new();
    let automaton = MemoryAutomaton::create(
        discard_logger(),
        Box::new(InMemoryChangelogStore::new()),
        Box::new(recorder.clone()),
    )
    .unwrap();

    (automaton, recorder)
}

/// Spawns a leader committer for peer 0 of `cell_manager`, driven by its own event loop.
pub(crate) fn spawn_leader(
    cell_manager: Arc<dyn CellManager>,
    automaton: Box<dyn DecoratedAutomaton>,
    config: CommitterConfig,
) -> (LeaderCommitterClient, LeaderSignalListener) {
    let epoch = EpochContext {
        epoch_id: EpochId(1),
        leader_id: PeerId(0),
    };
    let base = CommitterBase::new(discard_logger(), config, cell_manager, automaton, epoch);

    let (client, rx) = LeaderCommitterClient::new(16);
    let (publisher, listener) = committer::new_signal_channel();
    let leader = LeaderCommitter::new(base, client.weak(), publisher);
    tokio::spawn(LeaderActor::new(discard_logger(), rx, leader).run_event_loop());

    (client, listener)
}

/// Records every applied mutation and echoes its data back as the response.
#[derive(Clone, Default)]
pub(crate) struct RecordingAutomaton {
    applied: Arc<Mutex<Vec<(Version, Bytes)>>>,
}

impl RecordingAutomaton {
    pub(crate) fn new() -> Self {
        RecordingAutomaton::default()
    }

    pub(crate) fn applied(&self) -> Vec<(Version, Bytes)> {
        self.applied.lock().unwrap().clone()
    }
}

impl Automaton for RecordingAutomaton {
    fn apply_mutation(&mut self, context: &MutationContext<'_>) -> MutationResponse {
        let data = context.request.data.clone();
        self.applied.lock().unwrap().push((context.version, data.clone()));

        MutationResponse::new(data)
    }
}

#[derive(Clone, Copy)]
enum FakeBehavior {
    Logged,
    Acknowledged,
    Failing,
    Hanging,
}

/// PeerChannel that answers from a fixed script and remembers what it was sent.
pub(crate) struct FakePeerChannel {
    behavior: FakeBehavior,
    log_requests: Mutex<Vec<LogMutationsRequest>>,
    commit_requests: Mutex<Vec<MutationRequest>>,
}

impl FakePeerChannel {
    fn new(behavior: FakeBehavior) -> Self {
        FakePeerChannel {
            behavior,
            log_requests: Mutex::new(vec![]),
            commit_requests: Mutex::new(vec![]),
        }
    }

    /// Replies `logged: true`. Commits echo the request data.
    pub(crate) fn logged() -> Self {
        Self::new(FakeBehavior::Logged)
    }

    /// Replies `logged: false`.
    pub(crate) fn acknowledged() -> Self {
        Self::new(FakeBehavior::Acknowledged)
    }

    pub(crate) fn failing() -> Self {
        Self::new(FakeBehavior::Failing)
    }

    /// Never replies.
    pub(crate) fn hanging() -> Self {
        Self::new(FakeBehavior::Hanging)
    }

    pub(crate) fn log_requests(&self) -> Vec<LogMutationsRequest> {
        self.log_requests.lock().unwrap().clone()
    }

    pub(crate) fn commit_requests(&self) -> Vec<MutationRequest> {
        self.commit_requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PeerChannel for FakePeerChannel {
    async fn log_mutations(&self, request: LogMutationsRequest) -> Result<LogMutationsResponse, RpcError> {
        self.log_requests.lock().unwrap().push(request);

        match self.behavior {
            FakeBehavior::Logged => Ok(LogMutationsResponse { logged: true }),
            FakeBehavior::Acknowledged => Ok(LogMutationsResponse { logged: false }),
            FakeBehavior::Failing => Err(RpcError::Transport("peer down".into())),
            FakeBehavior::Hanging => future::pending().await,
        }
    }

    async fn commit_mutation(&self, request: MutationRequest) -> Result<MutationResponse, RpcError> {
        let data = request.data.clone();
        self.commit_requests.lock().unwrap().push(request);

        match self.behavior {
            FakeBehavior::Logged | FakeBehavior::Acknowledged => Ok(MutationResponse::new(data)),
            FakeBehavior::Failing => Err(RpcError::Transport("peer down".into())),
            FakeBehavior::Hanging => future::pending().await,
        }
    }
}

/// ChangelogStore whose appends stay pending until the gate is opened.
pub(crate) struct GatedChangelogStore {
    inner: InMemoryChangelogStore,
    gate: watch::Receiver<Option<bool>>,
}

pub(crate) struct ChangelogGate {
    sender: watch::Sender<Option<bool>>,
}

impl GatedChangelogStore {
    pub(crate) fn new() -> (Self, ChangelogGate) {
        let (sender, gate) = watch::channel(None);
        let store = GatedChangelogStore {
            inner: InMemoryChangelogStore::new(),
            gate,
        };

        (store, ChangelogGate { sender })
    }
}

impl ChangelogGate {
    /// Releases every pending and future append, successfully or with an io error.
    pub(crate) fn open(&self, succeed: bool) {
        self.sender.send_replace(Some(succeed));
    }
}

impl ChangelogStore for GatedChangelogStore {
    fn create_changelog(&mut self, segment_id: u32) -> Result<Box<dyn Changelog>, io::Error> {
        Ok(Box::new(GatedChangelog {
            inner: self.inner.create_changelog(segment_id)?,
            gate: self.gate.clone(),
        }))
    }
}

struct GatedChangelog {
    inner: Box<dyn Changelog>,
    gate: watch::Receiver<Option<bool>>,
}

impl Changelog for GatedChangelog {
    fn append(&mut self, record: Bytes) -> LocalFlushFuture {
        let inner_flush = self.inner.append(record);
        let mut gate = self.gate.clone();

        Box::pin(async move {
            loop {
                let state = *gate.borrow();
                match state {
                    Some(true) => return inner_flush.await,
                    Some(false) => return Err(io::Error::new(io::ErrorKind::Other, "gated append failed")),
                    None => {}
                }
                if gate.changed().await.is_err() {
                    return Err(io::Error::new(io::ErrorKind::Other, "gate dropped"));
                }
            }
        })
    }

    fn record_count(&self) -> u32 {
        self.inner.record_count()
    }

    fn data_size(&self) -> u64 {
        self.inner.data_size()
    }
}
