use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs a task once the caller has been quiet for `delay`.
///
/// Each [`schedule`](Debouncer::schedule) drops the task armed before it, so a
/// burst of calls runs only the last task, `delay` after the last call. Once a
/// task has fired it runs detached: rescheduling never cancels work in flight.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm `task`, replacing any task that has not fired yet.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        }));
    }

    /// Drop the armed task. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}
