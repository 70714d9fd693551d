use crate::actor::{FollowerCommitterClient, LeaderCommitterClient};
use std::sync::{Arc, Mutex};

/// The committer the RPC server hands requests to. Swapped by whoever runs elections.
#[derive(Clone)]
pub enum ActiveCommitter {
    None,
    Leader(LeaderCommitterClient),
    Follower(FollowerCommitterClient),
}

/// CommitterRouter is shared between the RPC server and the code that decides this peer's role.
#[derive(Clone)]
pub struct CommitterRouter {
    active: Arc<Mutex<ActiveCommitter>>,
}

impl Default for CommitterRouter {
    fn default() -> Self {
        CommitterRouter {
            active: Arc::new(Mutex::new(ActiveCommitter::None)),
        }
    }
}

impl CommitterRouter {
    pub fn new() -> Self {
        CommitterRouter::default()
    }

    pub fn install_leader(&self, leader: LeaderCommitterClient) {
        self.replace(ActiveCommitter::Leader(leader));
    }

    pub fn install_follower(&self, follower: FollowerCommitterClient) {
        self.replace(ActiveCommitter::Follower(follower));
    }

    pub fn clear(&self) {
        self.replace(ActiveCommitter::None);
    }

    pub fn current(&self) -> ActiveCommitter {
        self.active.lock().expect("CommitterRouter lock poisoned").clone()
    }

    fn replace(&self, committer: ActiveCommitter) {
        *self.active.lock().expect("CommitterRouter lock poisoned") = committer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_and_clears() {
        let router = CommitterRouter::new();
        assert!(matches!(router.current(), ActiveCommitter::None));

        let (leader, _rx) = LeaderCommitterClient::new(1);
        router.install_leader(leader);
        assert!(matches!(router.current(), ActiveCommitter::Leader(_)));

        let (follower, _rx) = FollowerCommitterClient::new(1);
        // Shared with the server side.
        router.clone().install_follower(follower);
        assert!(matches!(router.current(), ActiveCommitter::Follower(_)));

        router.clear();
        assert!(matches!(router.current(), ActiveCommitter::None));
    }
}
