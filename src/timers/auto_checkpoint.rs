use crate::actor::WeakLeaderClient;
use crate::timers::cancel::{self, CancelOnDrop, Cancellation};
use crate::timers::time::{Clock, RealClock};
use tokio::time::{Duration, Instant};

pub(crate) const AUTO_CHECKPOINT_CHECK_PERIOD: Duration = Duration::from_secs(15);

/// Periodically asks the leader to check whether a snapshot is due. Stops when the handle is
/// dropped.
pub(crate) struct AutoCheckpointTimer {
    _cancel: CancelOnDrop,
}

struct AutoCheckpointTimerTask<C: Clock> {
    period: Duration,
    next_check: Instant,
    actor_client: WeakLeaderClient,
    cancellation: Cancellation,
    clock: C,
}

impl AutoCheckpointTimer {
    pub(crate) fn spawn_timer_task(actor_client: WeakLeaderClient) -> Self {
        let (task, handle) = AutoCheckpointTimerTask::new(AUTO_CHECKPOINT_CHECK_PERIOD, actor_client, RealClock);
        tokio::task::spawn(task.run());

        handle
    }
}

impl<C: Clock> AutoCheckpointTimerTask<C> {
    fn new(period: Duration, actor_client: WeakLeaderClient, clock: C) -> (Self, AutoCheckpointTimer) {
        let (cancel, cancellation) = cancel::new();

        let task = AutoCheckpointTimerTask {
            period,
            next_check: clock.now() + period,
            actor_client,
            cancellation,
            clock,
        };

        (task, AutoCheckpointTimer { _cancel: cancel })
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => return,
                _ = self.clock.sleep_until(self.next_check) => {}
            }

            self.actor_client.auto_checkpoint_check().await;
            self.next_check += self.period;
        }
    }
}
