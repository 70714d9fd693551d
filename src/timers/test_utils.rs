use crate::actor::LeaderEvent;
use crate::committer::BatchId;
use std::time::Duration;
use tokio::sync::mpsc;

/// Stands in for the leader's event loop and asserts on what the timers post to it.
pub(super) struct TestUtilActor {
    rx: mpsc::Receiver<LeaderEvent>,
    timeout: Duration,
}

impl TestUtilActor {
    pub(super) fn new(rx: mpsc::Receiver<LeaderEvent>) -> Self {
        TestUtilActor {
            rx,
            timeout: Duration::from_millis(10),
        }
    }

    async fn recv(&mut self) -> LeaderEvent {
        tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
            .await
            .expect("Unexpected timeout")
            .expect("Expected event")
    }

    pub(super) async fn assert_batch_timeout_event(&mut self, expected_batch_id: BatchId) {
        match self.recv().await {
            LeaderEvent::BatchTimeout(batch_id) => assert_eq!(batch_id, expected_batch_id),
            _ => panic!("Unexpected event"),
        }
    }

    pub(super) async fn assert_auto_checkpoint_check_event(&mut self) {
        match self.recv().await {
            LeaderEvent::AutoCheckpointCheck => {}
            _ => panic!("Unexpected event"),
        }
    }

    pub(super) async fn assert_no_event(&mut self) {
        if tokio::time::timeout(self.timeout, self.rx.recv()).await.is_ok() {
            panic!("Expected no event");
        }
    }
}
