// Root modules are private. Everything public is exported individually below, so the module
// layout can change without breaking callers.
mod actor;
mod api;
mod automaton;
mod cell;
mod committer;
mod server;
mod timers;

#[cfg(test)]
mod test_utils;

mod grpc {
    include!("../generated/hydra.rs");
}

pub use actor::FollowerCommitterClient;
pub use actor::LeaderCommitterClient;
pub use api::create_discard_logger;
pub use api::create_follower_committer;
pub use api::create_leader_committer;
pub use api::create_root_logger_for_stdout;
pub use api::CommitterCreationError;
pub use api::CommitterSetup;
pub use api::HydraOptions;
pub use automaton::Automaton;
pub use automaton::Changelog;
pub use automaton::ChangelogStore;
pub use automaton::DecoratedAutomaton;
pub use automaton::InMemoryChangelogStore;
pub use automaton::LoggedMutation;
pub use automaton::MemoryAutomaton;
pub use automaton::MutationContext;
pub use automaton::NoOpAutomaton;
pub use cell::CellCreationError;
pub use cell::CellManager;
pub use cell::ConnectError;
pub use cell::GrpcPeerChannel;
pub use cell::LogMutationsRequest;
pub use cell::LogMutationsResponse;
pub use cell::PeerChannel;
pub use cell::PeerInfo;
pub use cell::StaticCellManager;
pub use committer::BoxFuture;
pub use committer::CommitError;
pub use committer::CommitterConfig;
pub use committer::CounterSnapshot;
pub use committer::EpochContext;
pub use committer::EpochId;
pub use committer::FollowerLogMutations;
pub use committer::LeaderSignal;
pub use committer::LeaderSignalListener;
pub use committer::LocalFlushFuture;
pub use committer::LogMutationsFuture;
pub use committer::MutationFuture;
pub use committer::MutationId;
pub use committer::MutationRecord;
pub use committer::MutationRequest;
pub use committer::MutationResponse;
pub use committer::PeerId;
pub use committer::QuorumFlushResult;
pub use committer::RecordDecodeError;
pub use committer::RecordEncodeError;
pub use committer::RpcError;
pub use committer::Version;
pub use committer::MAX_MUTATION_TYPE_LEN;
pub use server::shutdown_signal;
pub use server::ActiveCommitter;
pub use server::CommitterRouter;
pub use server::RpcServer;
pub use server::RpcServerShutdownHandle;
pub use server::RpcServerShutdownSignal;
