mod grpc_channel;
mod static_cell;

pub use grpc_channel::ConnectError;
pub use grpc_channel::GrpcPeerChannel;
pub use static_cell::CellCreationError;
pub use static_cell::PeerInfo;
pub use static_cell::StaticCellManager;

use crate::committer::{EpochId, MutationRequest, MutationResponse, PeerId, RpcError, Version};
use bytes::Bytes;
use std::sync::Arc;

/// CellManager knows the members of the cell and how to reach them.
pub trait CellManager: Send + Sync {
    fn cell_id(&self) -> &str;

    fn peer_count(&self) -> usize;

    fn self_peer_id(&self) -> PeerId;

    /// Number of durable copies (self included) needed to commit.
    fn quorum_count(&self) -> usize;

    /// None if the peer is currently unreachable or unknown.
    fn peer_channel(&self, peer_id: PeerId) -> Option<Arc<dyn PeerChannel>>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogMutationsRequest {
    pub epoch_id: EpochId,
    pub start_version: Version,
    pub committed_version: Version,
    pub records: Vec<Bytes>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogMutationsResponse {
    /// True if the follower durably logged the records, false if it only received them.
    pub logged: bool,
}

/// PeerChannel is the client side of the replication RPCs to one peer.
#[async_trait::async_trait]
pub trait PeerChannel: Send + Sync {
    async fn log_mutations(&self, request: LogMutationsRequest) -> Result<LogMutationsResponse, RpcError>;

    async fn commit_mutation(&self, request: MutationRequest) -> Result<MutationResponse, RpcError>;
}

pub(crate) fn majority(peer_count: usize) -> usize {
    peer_count / 2 + 1
}
