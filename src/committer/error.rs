use crate::committer::RecordEncodeError;
use crate::committer::Version;
use crate::committer::EpochId;

/// CommitError is the failure outcome of replicating mutations. It is `Clone` because a single
/// quorum outcome is handed to every mutation of a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    #[error("Mutations are uncertain: local commit failed")]
    LocalFlushFailed,
    #[error("Mutations are uncertain: {successful} out of {total} commits were successful")]
    QuorumNotReached { successful: usize, total: usize },
    /// `logged` is the follower's logged version, `received` is where the incoming batch starts.
    #[error("Out-of-order mutations received by follower: batch starts at {received}, follower logged up to {logged}")]
    OutOfOrderMutations { logged: Version, received: Version },
    #[error("Mutations from epoch {actual:?} do not belong to current epoch {expected:?}")]
    EpochMismatch { expected: EpochId, actual: EpochId },
    #[error("Mutation rejected: {0}")]
    InvalidMutation(RecordEncodeError),
    #[error("Error forwarding mutation to leader: {0}")]
    Forwarding(RpcError),
    #[error("No channel to leader")]
    NoLeaderChannel,
    #[error("Committer has exited")]
    CommitterExited,
}

impl CommitError {
    /// True when the mutations may still end up committed (e.g. after recovery), so the caller
    /// can't treat them as rejected.
    pub fn is_maybe_committed(&self) -> bool {
        match self {
            CommitError::LocalFlushFailed | CommitError::QuorumNotReached { .. } => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    #[error("RPC timed out")]
    Timeout,
    #[error("RPC failed with status {code}: {message}")]
    Status { code: String, message: String },
    #[error("Transport failure: {0}")]
    Transport(String),
}

impl From<tonic::Status> for RpcError {
    fn from(status: tonic::Status) -> Self {
        RpcError::Status {
            code: format!("{:?}", status.code()),
            message: status.message().to_string(),
        }
    }
}

impl From<tokio::time::error::Elapsed> for RpcError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        RpcError::Timeout
    }
}
