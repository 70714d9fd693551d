use crate::automaton::{
    Automaton, Changelog, ChangelogStore, DecoratedAutomaton, LoggedMutation, MutationContext,
};
use crate::committer::{
    CommitError, LocalFlushFuture, MutationRecord, MutationRequest, MutationResponse, RecordEncodeError, Version,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::convert::TryFrom;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

/// MemoryAutomaton is a `DecoratedAutomaton` over a `ChangelogStore` and an app `Automaton`.
/// Clones are handles to the same automaton.
#[derive(Clone)]
pub struct MemoryAutomaton {
    state: Arc<Mutex<State>>,
}

struct State {
    logger: slog::Logger,
    store: Box<dyn ChangelogStore>,
    changelog: Box<dyn Changelog>,
    automaton: Box<dyn Automaton>,
    logged_version: Version,
    automaton_version: Version,
    last_snapshot_time: DateTime<Utc>,
    // Logged, not yet applied. Ordered by version.
    pending: VecDeque<PendingMutation>,
}

struct PendingMutation {
    version: Version,
    record_data: Bytes,
    // Only the leader has someone waiting on the response.
    response: Option<oneshot::Sender<MutationResponse>>,
}

impl MemoryAutomaton {
    pub fn create(
        logger: slog::Logger,
        mut store: Box<dyn ChangelogStore>,
        automaton: Box<dyn Automaton>,
    ) -> Result<Self, io::Error> {
        let changelog = store.create_changelog(0)?;

        let state = State {
            logger,
            store,
            changelog,
            automaton,
            logged_version: Version::default(),
            automaton_version: Version::default(),
            last_snapshot_time: Utc::now(),
            pending: VecDeque::new(),
        };

        Ok(MemoryAutomaton {
            state: Arc::new(Mutex::new(state)),
        })
    }

    /// Closes the current changelog segment and starts logging to the next one, record 0.
    pub fn rotate_changelog(&self) -> Result<Version, io::Error> {
        let mut state = self.lock();
        let new_version = state.logged_version.rotate();
        state.changelog = state.store.create_changelog(new_version.segment_id)?;
        state.logged_version = new_version;

        slog::info!(state.logger, "Rotated changelog"; "LoggedVersion" => %new_version);
        Ok(new_version)
    }

    pub fn set_last_snapshot_time(&self, time: DateTime<Utc>) {
        self.lock().last_snapshot_time = time;
    }

    pub fn pending_mutation_count(&self) -> usize {
        self.lock().pending.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("MemoryAutomaton lock poisoned")
    }
}

impl State {
    fn append(&mut self, record_data: Bytes, response: Option<oneshot::Sender<MutationResponse>>) -> LocalFlushFuture {
        let version = self.logged_version;
        let local_flush = self.changelog.append(record_data.clone());
        self.logged_version = version.advance(1);
        self.pending.push_back(PendingMutation {
            version,
            record_data,
            response,
        });

        local_flush
    }

    fn apply(&mut self, pending: PendingMutation) {
        let record = match MutationRecord::try_from(pending.record_data) {
            Ok(record) => record,
            Err(e) => {
                slog::error!(self.logger, "Skipping undecodable record: {}", e; "Version" => %pending.version);
                return;
            }
        };

        let context = MutationContext {
            version: pending.version,
            timestamp_millis: record.timestamp_millis,
            random_seed: record.random_seed,
            request: &record.request,
        };
        let response = self.automaton.apply_mutation(&context);

        if let Some(sender) = pending.response {
            let _ = sender.send(response);
        }
    }
}

impl DecoratedAutomaton for MemoryAutomaton {
    fn logged_version(&self) -> Version {
        self.lock().logged_version
    }

    fn automaton_version(&self) -> Version {
        self.lock().automaton_version
    }

    fn logged_data_size(&self) -> u64 {
        self.lock().changelog.data_size()
    }

    fn last_snapshot_time(&self) -> DateTime<Utc> {
        self.lock().last_snapshot_time
    }

    fn log_leader_mutation(&mut self, request: &MutationRequest) -> Result<LoggedMutation, RecordEncodeError> {
        let record = MutationRecord {
            timestamp_millis: Utc::now().timestamp_millis(),
            random_seed: rand::random(),
            request: request.clone(),
        };
        let record_data = record.encode()?;
        let (tx, rx) = oneshot::channel();

        let local_flush = self.lock().append(record_data.clone(), Some(tx));

        Ok(LoggedMutation {
            record_data,
            local_flush,
            response: Box::pin(async move { rx.await.map_err(|_| CommitError::CommitterExited) }),
        })
    }

    fn log_follower_mutation(&mut self, record_data: Bytes) -> LocalFlushFuture {
        self.lock().append(record_data, None)
    }

    fn commit_mutations(&mut self, version: Version) {
        let mut state = self.lock();
        // Can't apply what isn't logged yet.
        let target = version.min(state.logged_version);
        if target <= state.automaton_version {
            return;
        }

        while let Some(next) = state.pending.front() {
            if next.version >= target {
                break;
            }
            if let Some(pending) = state.pending.pop_front() {
                state.apply(pending);
            }
        }

        state.automaton_version = target;
        slog::debug!(state.logger, "Mutations committed"; "AutomatonVersion" => %target);
    }
}
