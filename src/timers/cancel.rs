use tokio::sync::oneshot;

/// Held by whoever owns the timer. Dropping it cancels the timer task.
pub(super) struct CancelOnDrop {
    _tx: oneshot::Sender<()>,
}

/// Held by the timer task.
pub(super) struct Cancellation {
    rx: oneshot::Receiver<()>,
}

impl Cancellation {
    /// Resolves once the paired `CancelOnDrop` is gone.
    pub(super) async fn cancelled(&mut self) {
        let _ = (&mut self.rx).await;
    }
}

pub(super) fn new() -> (CancelOnDrop, Cancellation) {
    let (tx, rx) = oneshot::channel();

    (CancelOnDrop { _tx: tx }, Cancellation { rx })
}
