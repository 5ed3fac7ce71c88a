//! Callback delivery context.
//!
//! [`Call::enqueue`](crate::Call::enqueue) executes the exchange on the tokio
//! runtime and then hands the completion callback to a [`CallbackExecutor`],
//! which decides on which thread or task the callback runs.

use tokio::runtime::Handle;

/// A unit of callback work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs completion callbacks.
pub trait CallbackExecutor: Send + Sync + 'static {
    fn execute(&self, task: Task);
}

/// Runs callbacks directly on the task that completed the call.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl CallbackExecutor for InlineExecutor {
    #[inline]
    fn execute(&self, task: Task) {
        task();
    }
}

/// Runs callbacks on the blocking pool of a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime the caller is running on.
    ///
    /// Returns `None` outside a tokio runtime.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl CallbackExecutor for TokioExecutor {
    fn execute(&self, task: Task) {
        let _ = self.handle.spawn_blocking(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_inline_runs_immediately() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        InlineExecutor.execute(Box::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_current_outside_runtime() {
        assert!(TokioExecutor::current().is_none());
    }

    #[tokio::test]
    async fn test_tokio_executor_runs_task() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let executor = TokioExecutor::current().unwrap();
        executor.execute(Box::new(move || {
            let _ = tx.send(std::thread::current().id());
        }));
        let thread = rx.await.unwrap();
        assert_ne!(thread, std::thread::current().id());
    }
}
