mod base;
mod batch;
mod epoch;
mod error;
mod follower;
mod leader;
mod mutation;
mod promise;
mod signals;
mod version;

pub use base::CommitterConfig;
pub use base::CounterSnapshot;
pub use epoch::EpochContext;
pub use epoch::EpochId;
pub use epoch::PeerId;
pub use error::CommitError;
pub use error::RpcError;
pub use follower::FollowerLogMutations;
pub use mutation::MutationId;
pub use mutation::MutationRecord;
pub use mutation::MutationRequest;
pub use mutation::MutationResponse;
pub use mutation::RecordDecodeError;
pub use mutation::RecordEncodeError;
pub use mutation::MAX_MUTATION_TYPE_LEN;
pub use promise::BoxFuture;
pub use promise::LocalFlushFuture;
pub use promise::LogMutationsFuture;
pub use promise::MutationFuture;
pub use promise::QuorumFlushResult;
pub use signals::LeaderSignal;
pub use signals::LeaderSignalListener;
pub use version::Version;

pub(crate) use base::CommitterBase;
pub(crate) use batch::BatchId;
pub(crate) use follower::FollowerCommitter;
pub(crate) use leader::LeaderCommitter;
pub(crate) use signals::new as new_signal_channel;
pub(crate) use signals::LeaderSignalPublisher;
