use crate::cell::{majority, CellManager, ConnectError, GrpcPeerChannel, PeerChannel};
use crate::committer::PeerId;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct PeerInfo {
    pub peer_id: PeerId,
    pub rpc_addr: SocketAddr,
}

#[derive(Debug, thiserror::Error)]
pub enum CellCreationError {
    #[error("Cell has no peers")]
    EmptyCell,
    #[error("Peer ids must be 0..{peer_count} in order, found {found}")]
    InvalidPeerId { peer_count: usize, found: PeerId },
    #[error("Self peer {0} is not in the cell")]
    SelfNotInCell(PeerId),
    #[error("Failed to create channel to {peer_id}: {source}")]
    PeerChannel { peer_id: PeerId, source: ConnectError },
}

/// StaticCellManager is a fixed cell membership. Quorum is a simple majority.
pub struct StaticCellManager {
    cell_id: String,
    self_peer_id: PeerId,
    // Indexed by peer id. Self has no channel.
    channels: Vec<Option<Arc<dyn PeerChannel>>>,
}

impl StaticCellManager {
    /// Connects lazily to every peer other than self.
    pub fn from_peers(
        cell_id: String,
        self_peer_id: PeerId,
        peers: &[PeerInfo],
    ) -> Result<Self, CellCreationError> {
        let mut channels = Vec::with_capacity(peers.len());
        for (i, peer) in peers.iter().enumerate() {
            if peer.peer_id != PeerId(i) {
                return Err(CellCreationError::InvalidPeerId {
                    peer_count: peers.len(),
                    found: peer.peer_id,
                });
            }

            if peer.peer_id == self_peer_id {
                channels.push(None);
            } else {
                let channel = GrpcPeerChannel::connect_lazy(peer.rpc_addr).map_err(|source| {
                    CellCreationError::PeerChannel {
                        peer_id: peer.peer_id,
                        source,
                    }
                })?;
                channels.push(Some(Arc::new(channel) as Arc<dyn PeerChannel>));
            }
        }

        Self::from_channels(cell_id, self_peer_id, channels)
    }

    pub fn from_channels(
        cell_id: String,
        self_peer_id: PeerId,
        channels: Vec<Option<Arc<dyn PeerChannel>>>,
    ) -> Result<Self, CellCreationError> {
        if channels.is_empty() {
            return Err(CellCreationError::EmptyCell);
        }
        if self_peer_id.0 >= channels.len() {
            return Err(CellCreationError::SelfNotInCell(self_peer_id));
        }

        Ok(StaticCellManager {
            cell_id,
            self_peer_id,
            channels,
        })
    }
}

impl CellManager for StaticCellManager {
    fn cell_id(&self) -> &str {
        &self.cell_id
    }

    fn peer_count(&self) -> usize {
        self.channels.len()
    }

    fn self_peer_id(&self) -> PeerId {
        self.self_peer_id
    }

    fn quorum_count(&self) -> usize {
        majority(self.channels.len())
    }

    fn peer_channel(&self, peer_id: PeerId) -> Option<Arc<dyn PeerChannel>> {
        if peer_id == self.self_peer_id {
            return None;
        }

        self.channels.get(peer_id.0).cloned().flatten()
    }
}
