use crate::actor::WeakLeaderClient;
use crate::committer::BatchId;
use crate::timers::cancel::{self, CancelOnDrop, Cancellation};
use crate::timers::time::{Clock, RealClock};
use tokio::time::{Duration, Instant};

/// One-shot timer that asks the leader to flush a batch once `max_commit_batch_delay` has
/// passed since the batch was opened. Dropping the handle cancels it.
pub(crate) struct BatchFlushTimer {
    _cancel: CancelOnDrop,
}

struct BatchFlushTimerTask<C: Clock> {
    deadline: Instant,
    batch_id: BatchId,
    actor_client: WeakLeaderClient,
    cancellation: Cancellation,
    clock: C,
}

impl BatchFlushTimer {
    pub(crate) fn spawn_timer_task(delay: Duration, actor_client: WeakLeaderClient, batch_id: BatchId) -> Self {
        let (task, handle) = BatchFlushTimerTask::new(delay, actor_client, batch_id, RealClock);
        tokio::task::spawn(task.run());

        handle
    }
}

impl<C: Clock> BatchFlushTimerTask<C> {
    fn new(delay: Duration, actor_client: WeakLeaderClient, batch_id: BatchId, clock: C) -> (Self, BatchFlushTimer) {
        let (cancel, cancellation) = cancel::new();

        let task = BatchFlushTimerTask {
            deadline: clock.now() + delay,
            batch_id,
            actor_client,
            cancellation,
            clock,
        };

        (task, BatchFlushTimer { _cancel: cancel })
    }

    async fn run(mut self) {
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => return,
            _ = self.clock.sleep_until(self.deadline) => {}
        }

        self.actor_client.batch_timeout(self.batch_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::LeaderCommitterClient;
    use crate::timers::test_utils::TestUtilActor;
    use crate::timers::time;

    #[tokio::test]
    async fn fires_once_after_delay() {
        let delay = Duration::from_millis(10);
        let (client, rx) = LeaderCommitterClient::new(10);
        let mut actor = TestUtilActor::new(rx);
        let (clock, mut controller) = time::mocked_clock();

        let (task, _handle) = BatchFlushTimerTask::new(delay, client.weak(), 42, clock);
        let join_handle = tokio::spawn(task.run());

        controller.advance(delay / 2);
        actor.assert_no_event().await;

        controller.advance(delay / 2);
        actor.assert_batch_timeout_event(42).await;

        join_handle.await.unwrap();
        controller.advance(delay * 10);
        actor.assert_no_event().await;
    }

    #[tokio::test]
    async fn dropping_handle_cancels() {
        let delay = Duration::from_millis(10);
        let (client, rx) = LeaderCommitterClient::new(10);
        let mut actor = TestUtilActor::new(rx);
        let (clock, mut controller) = time::mocked_clock();

        let (task, handle) = BatchFlushTimerTask::new(delay, client.weak(), 7, clock);
        let join_handle = tokio::spawn(task.run());

        drop(handle);
        controller.advance(delay * 2);

        join_handle.await.unwrap();
        actor.assert_no_event().await;
    }
}
