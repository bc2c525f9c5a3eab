use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a cancellable background task.
///
/// Wraps a spawned tokio task together with its cancellation token so the
/// task can be stopped explicitly (view hidden, component shutdown) and is
/// always cancelled when the handle is dropped. Restarting means spawning a
/// fresh task; the loops in this crate recompute once before waiting, so a
/// restart immediately refreshes stale state.
#[derive(Debug)]
pub struct ScheduledTask {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawn a background task that observes the given cancellation token
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(f(cancel.clone()));

        Self { cancel, task }
    }

    /// Signal the task to stop
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether a stop has been requested
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the task has finished running
    #[allow(dead_code)]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
