use crate::committer::{CommitError, MutationResponse};
use std::future::Future;
use std::io;
use std::pin::Pin;
use tokio::sync::watch;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Resolves to the response of one committed mutation.
pub type MutationFuture = BoxFuture<Result<MutationResponse, CommitError>>;

/// Resolves once a follower has durably logged a replicated batch.
pub type LogMutationsFuture = BoxFuture<Result<(), CommitError>>;

/// Resolves once one locally appended record is durable.
pub type LocalFlushFuture = BoxFuture<io::Result<()>>;

type QuorumSlot = Option<Result<(), CommitError>>;

pub(crate) fn quorum_promise() -> (QuorumPromise, QuorumFlushResult) {
    let (tx, rx) = watch::channel(None);

    (QuorumPromise { slot: tx }, QuorumFlushResult { slot: rx })
}

/// Write side of a batch's quorum outcome. The first `set` wins, later ones are ignored.
pub(crate) struct QuorumPromise {
    slot: watch::Sender<QuorumSlot>,
}

impl QuorumPromise {
    /// Returns true if this call resolved the promise.
    pub(crate) fn set(&self, result: Result<(), CommitError>) -> bool {
        if self.slot.borrow().is_some() {
            return false;
        }

        self.slot.send_replace(Some(result));
        true
    }
}

/// Read side of a batch's quorum outcome. Cheap to clone, every clone observes the same result.
#[derive(Clone)]
pub struct QuorumFlushResult {
    slot: watch::Receiver<QuorumSlot>,
}

impl QuorumFlushResult {
    /// An already resolved result, e.g. for a flush with nothing pending.
    pub fn resolved(result: Result<(), CommitError>) -> Self {
        let (promise, result_handle) = quorum_promise();
        promise.set(result);

        result_handle
    }

    pub fn try_result(&self) -> Option<Result<(), CommitError>> {
        self.slot.borrow().clone()
    }

    pub fn is_set(&self) -> bool {
        self.slot.borrow().is_some()
    }

    pub async fn wait(mut self) -> Result<(), CommitError> {
        loop {
            let current = self.slot.borrow().clone();
            if let Some(result) = current {
                return result;
            }

            if self.slot.changed().await.is_err() {
                // Promise dropped. It may have resolved right before dropping.
                return self.slot.borrow().clone().unwrap_or(Err(CommitError::CommitterExited));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn resolves_exactly_once() {
        let (promise, result) = quorum_promise();
        assert!(!result.is_set());

        assert!(promise.set(Ok(())));
        assert!(!promise.set(Err(CommitError::LocalFlushFailed)));

        assert_eq!(result.try_result(), Some(Ok(())));
        assert_eq!(result.clone().wait().await, Ok(()));
    }

    #[tokio::test]
    async fn every_waiter_sees_the_result() {
        let (promise, result) = quorum_promise();
        let waiters: Vec<_> = (0..3).map(|_| tokio::spawn(result.clone().wait())).collect();

        tokio::time::sleep(Duration::from_millis(5)).await;
        promise.set(Err(CommitError::QuorumNotReached { successful: 1, total: 3 }));

        for waiter in waiters {
            assert_eq!(
                waiter.await.unwrap(),
                Err(CommitError::QuorumNotReached { successful: 1, total: 3 })
            );
        }
    }

    #[tokio::test]
    async fn dropped_promise() {
        let (promise, result) = quorum_promise();
        drop(promise);
        assert_eq!(result.wait().await, Err(CommitError::CommitterExited));

        let (promise, result) = quorum_promise();
        promise.set(Ok(()));
        drop(promise);
        assert_eq!(result.wait().await, Ok(()));
    }

    #[tokio::test]
    async fn pre_resolved() {
        assert_eq!(QuorumFlushResult::resolved(Ok(())).wait().await, Ok(()));
    }
}
