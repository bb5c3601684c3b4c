//! Cancellable delayed task.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs the most recently scheduled task once `delay` has passed without
/// another `schedule` call.
///
/// Scheduling cancels the pending timer, not a task that already started:
/// once the delay expires the task is spawned on its own and runs to
/// completion even if something newer is scheduled meanwhile.
///
/// Must be used inside a tokio runtime.
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

    /// Replaces any pending task with `task`, to run after the delay.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancel() {
            tracing::debug!("Debounce timer restarted");
        }
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        }));
    }

    /// Drops the pending task, if its timer has not fired yet.
    ///
    /// Returns true if a task was cancelled.
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
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_task(counter: &Arc<AtomicUsize>, value: usize) -> impl Future<Output = ()> {
        let counter = Arc::clone(counter);
        async move {
            counter.store(value, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_after_delay() {
        let ran = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_secs(1));

        debouncer.schedule(counting_task(&ran, 1));
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(ran.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_keeps_only_last_task() {
        let runs = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_secs(1));

        for value in 1..=3 {
            let runs = Arc::clone(&runs);
            let last = Arc::clone(&last);
            debouncer.schedule(async move {
                runs.fetch_add(1, Ordering::SeqCst);
                last.store(value, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(400)).await;
        }

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let ran = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_secs(1));

        assert!(!debouncer.cancel());
        debouncer.schedule(counting_task(&ran, 1));
        assert!(debouncer.cancel());
        assert!(!debouncer.is_pending());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_task_survives_reschedule() {
        let finished = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(100));

        let slow = Arc::clone(&finished);
        debouncer.schedule(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            slow.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(200)).await;

        // The slow task is in flight; a new schedule must not abort it
        debouncer.schedule(counting_task(&Arc::new(AtomicUsize::new(0)), 1));
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }
}
