mod changelog;
mod memory;
mod state_machine;

pub use changelog::Changelog;
pub use changelog::ChangelogStore;
pub use changelog::InMemoryChangelogStore;
pub use memory::MemoryAutomaton;
pub use state_machine::Automaton;
pub use state_machine::MutationContext;
pub use state_machine::NoOpAutomaton;

use crate::committer::{LocalFlushFuture, MutationFuture, MutationRequest, RecordEncodeError, Version};
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Output of logging one mutation on the leader.
pub struct LoggedMutation {
    /// Serialized record, shipped verbatim to followers.
    pub record_data: Bytes,
    /// Resolves once the record is durable locally.
    pub local_flush: LocalFlushFuture,
    /// Resolves once the mutation has been applied.
    pub response: MutationFuture,
}

/// DecoratedAutomaton owns the mutation log and the state machine behind it. It is driven only
/// from the committer's event loop.
pub trait DecoratedAutomaton: Send + 'static {
    /// Version the next logged record will get.
    fn logged_version(&self) -> Version;

    /// Version up to which (exclusive) mutations have been applied.
    fn automaton_version(&self) -> Version;

    /// Bytes logged to the current changelog segment.
    fn logged_data_size(&self) -> u64;

    fn last_snapshot_time(&self) -> DateTime<Utc>;

    /// Assigns `logged_version()` to the mutation and appends it to the changelog. Nothing is
    /// logged when the mutation can't be serialized.
    fn log_leader_mutation(&mut self, request: &MutationRequest) -> Result<LoggedMutation, RecordEncodeError>;

    /// Appends one record received from the leader at `logged_version()`.
    fn log_follower_mutation(&mut self, record_data: Bytes) -> LocalFlushFuture;

    /// Applies every logged mutation below `version`. Monotonic: versions at or below the
    /// applied watermark are ignored.
    fn commit_mutations(&mut self, version: Version);
}
