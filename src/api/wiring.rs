use crate::actor::{FollowerActor, FollowerCommitterClient, LeaderActor, LeaderCommitterClient};
use crate::automaton::DecoratedAutomaton;
use crate::cell::CellManager;
use crate::committer::{
    self, CommitterBase, CommitterConfig, EpochContext, FollowerCommitter, LeaderCommitter, LeaderSignalListener,
};
use crate::HydraOptions;
use std::convert::TryFrom;
use std::sync::Arc;

const EVENT_QUEUE_SIZE: usize = 64;

/// Everything a committer is built from. The committer takes ownership of the automaton.
pub struct CommitterSetup {
    pub logger: slog::Logger,
    pub options: HydraOptions,
    pub cell_manager: Arc<dyn CellManager>,
    pub automaton: Box<dyn DecoratedAutomaton>,
    pub epoch: EpochContext,
}

#[derive(Debug, thiserror::Error)]
pub enum CommitterCreationError {
    #[error("Illegal options for configuring committer: {0}")]
    IllegalOptions(String),
    #[error("Self peer is not the leader of the epoch")]
    NotLeader,
    #[error("Self peer is the leader of the epoch")]
    NotFollower,
}

/// Spawns the leader committer's event loop. Must be called from within a tokio runtime.
pub fn create_leader_committer(
    setup: CommitterSetup,
) -> Result<(LeaderCommitterClient, LeaderSignalListener), CommitterCreationError> {
    if setup.epoch.leader_id != setup.cell_manager.self_peer_id() {
        return Err(CommitterCreationError::NotLeader);
    }

    let logger = setup.logger.new(slog::o!("Role" => "Leader"));
    let base = create_base(logger.clone(), setup)?;

    let (client, event_queue_rx) = LeaderCommitterClient::new(EVENT_QUEUE_SIZE);
    let (signal_publisher, signal_listener) = committer::new_signal_channel();
    let committer = LeaderCommitter::new(base, client.weak(), signal_publisher);

    let actor = LeaderActor::new(logger, event_queue_rx, committer);
    tokio::spawn(actor.run_event_loop());

    Ok((client, signal_listener))
}

/// Spawns the follower committer's event loop. Must be called from within a tokio runtime.
pub fn create_follower_committer(setup: CommitterSetup) -> Result<FollowerCommitterClient, CommitterCreationError> {
    if setup.epoch.leader_id == setup.cell_manager.self_peer_id() {
        return Err(CommitterCreationError::NotFollower);
    }

    let logger = setup.logger.new(slog::o!("Role" => "Follower"));
    let base = create_base(logger.clone(), setup)?;

    let (client, event_queue_rx) = FollowerCommitterClient::new(EVENT_QUEUE_SIZE);
    let committer = FollowerCommitter::new(base);

    let actor = FollowerActor::new(logger, event_queue_rx, committer);
    tokio::spawn(actor.run_event_loop());

    Ok(client)
}

fn create_base(logger: slog::Logger, setup: CommitterSetup) -> Result<CommitterBase, CommitterCreationError> {
    let config = CommitterConfig::try_from(setup.options)
        .map_err(|e| CommitterCreationError::IllegalOptions(e.to_string()))?;

    Ok(CommitterBase::new(
        logger,
        config,
        setup.cell_manager,
        setup.automaton,
        setup.epoch,
    ))
}
