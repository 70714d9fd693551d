use tokio::time::Instant;

/// Time source of the timer tasks, so tests can drive them without sleeping.
#[async_trait::async_trait]
pub(crate) trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;

    async fn sleep_until(&mut self, deadline: Instant);
}

#[derive(Copy, Clone)]
pub(crate) struct RealClock;

#[async_trait::async_trait]
impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&mut self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await;
    }
}

#[cfg(test)]
pub(crate) use mock::mocked_clock;

#[cfg(test)]
mod mock {
    use super::Clock;
    use tokio::sync::watch;
    use tokio::time::{Duration, Instant};

    pub(crate) fn mocked_clock() -> (MockClock, MockClockController) {
        let (tx, rx) = watch::channel(Instant::now());

        (MockClock { now: rx }, MockClockController { now: tx })
    }

    /// Only moves when its controller says so.
    pub(crate) struct MockClock {
        now: watch::Receiver<Instant>,
    }

    #[async_trait::async_trait]
    impl Clock for MockClock {
        fn now(&self) -> Instant {
            *self.now.borrow()
        }

        async fn sleep_until(&mut self, deadline: Instant) {
            if self.now.wait_for(|now| *now >= deadline).await.is_err() {
                // Controller is gone, so this deadline never comes.
                std::future::pending::<()>().await;
            }
        }
    }

    pub(crate) struct MockClockController {
        now: watch::Sender<Instant>,
    }

    impl MockClockController {
        pub(crate) fn now(&self) -> Instant {
            *self.now.borrow()
        }

        /// Wakes every sleeper whose deadline is now in the past.
        pub(crate) fn advance(&mut self, duration: Duration) {
            self.now.send_modify(|now| *now += duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::Duration;

    #[tokio::test]
    async fn periodic_sleeper_catches_up_after_large_advance() {
        let tick = Duration::from_millis(500);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let (mut clock, mut controller) = mocked_clock();
        let start = controller.now();

        tokio::spawn(async move {
            let mut next_wake = start;
            loop {
                next_wake += tick;
                clock.sleep_until(next_wake).await;
                if tx.send(next_wake).is_err() {
                    return;
                }
            }
        });

        controller.advance(tick / 2);
        tokio::time::timeout(Duration::from_millis(20), rx.recv())
            .await
            .expect_err("Expected timeout");

        controller.advance(tick);
        assert_eq!(rx.recv().await, Some(start + tick));

        // Crosses two deadlines at once. Each one still gets its wake up.
        controller.advance(tick * 2);
        assert_eq!(rx.recv().await, Some(start + tick * 2));
        assert_eq!(rx.recv().await, Some(start + tick * 3));
        tokio::time::timeout(Duration::from_millis(20), rx.recv())
            .await
            .expect_err("Expected timeout");
    }
}
