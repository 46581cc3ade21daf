//! Owned background timers.
//!
//! UI timers (alert auto-dismiss, redirect countdowns, the spinner tick) are
//! spawned through a [`TaskScope`]. Dropping the scope aborts whatever is still
//! running, so no timer outlives the screen that started it.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Set of tasks aborted together.
#[derive(Default)]
pub struct TaskScope {
    handles: Vec<JoinHandle<()>>,
}

impl TaskScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `task` inside the scope.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handles.retain(|h| !h.is_finished());
        self.handles.push(tokio::spawn(task));
    }

    /// Runs `action` once after `delay` unless the scope is cancelled first.
    pub fn spawn_after<F>(&mut self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
    }

    /// Number of tasks that have not finished yet.
    pub fn active(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Aborts every task in the scope.
    pub fn cancel_all(&mut self) {
        let count = self.handles.len();
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        trace!(count = %count, "Cancelled scoped tasks");
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn spawn_after_fires_once_delay_elapses() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut scope = TaskScope::new();
        let counter = fired.clone();
        scope.spawn_after(Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(scope.active(), 0);
    }

    #[tokio::test]
    async fn dropping_scope_aborts_pending_timers() {
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let mut scope = TaskScope::new();
            let counter = fired.clone();
            scope.spawn_after(Duration::from_millis(50), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            assert_eq!(scope.active(), 1);
        }

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancel_all_leaves_scope_reusable() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut scope = TaskScope::new();
        let first = fired.clone();
        scope.spawn_after(Duration::from_millis(50), move || {
            first.fetch_add(1, Ordering::SeqCst);
        });
        scope.cancel_all();

        let second = fired.clone();
        scope.spawn_after(Duration::from_millis(5), move || {
            second.fetch_add(10, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 10);
    }
}
