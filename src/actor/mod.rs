mod follower;
mod leader;

pub use follower::FollowerCommitterClient;
pub use leader::LeaderCommitterClient;

pub(crate) use follower::FollowerActor;
pub(crate) use leader::LeaderActor;
#[cfg(test)]
pub(crate) use leader::LeaderEvent;
pub(crate) use leader::WeakLeaderClient;

use tokio::sync::oneshot;

pub(crate) struct Callback<T>(oneshot::Sender<T>);

impl<T> Callback<T> {
    pub(crate) fn send(self, message: T) {
        let _ = self.0.send(message);
    }
}
