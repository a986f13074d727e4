use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Work deferred until the host is idle, approximated by a short delay.
///
/// Cancelling (or dropping) the task before it runs means it never runs.
#[derive(Debug)]
pub struct IdleTask {
    handle: JoinHandle<()>,
}

impl IdleTask {
    pub fn schedule<F>(delay: Duration, work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for IdleTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
