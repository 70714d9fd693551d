use std::fmt;

#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct EpochId(pub u64);

/// PeerId is a cell member's position in the cell configuration.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct PeerId(pub usize);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// EpochContext identifies one leadership term. Replication traffic from a different epoch is
/// rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EpochContext {
    pub epoch_id: EpochId,
    pub leader_id: PeerId,
}
