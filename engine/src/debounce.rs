//! Delay-coalescing primitive: only the last call inside a quiet window runs.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::lock;

struct Pending {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

struct Shared<T> {
    callback: Box<dyn Fn(T) + Send + Sync>,
    pending: Mutex<Pending>,
}

impl<T> Shared<T> {
    // The callback runs under the lock so `cancel` cannot slip in between
    // the generation check and the call.
    fn fire(&self, generation: u64, arg: T) {
        let mut pending = lock(&self.pending);
        if pending.generation != generation {
            return;
        }
        pending.task = None;
        (self.callback)(arg);
    }
}

/// Wraps a callback so that it runs `delay` after the most recent call.
///
/// Each call supersedes the pending one; only the newest argument is
/// delivered. Dropping the debouncer cancels whatever is pending.
///
/// The callback must not call back into the same debouncer: it runs while
/// the debouncer's lock is held, and `call`/`cancel` from inside it would
/// deadlock.
pub struct Debouncer<T> {
    shared: Arc<Shared<T>>,
    delay: Duration,
    runtime: Handle,
}

impl<T: Send + 'static> Debouncer<T> {
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, like [`Handle::current`].
    pub fn new(delay: Duration, callback: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self::with_handle(Handle::current(), delay, callback)
    }

    pub fn with_handle(
        runtime: Handle,
        delay: Duration,
        callback: impl Fn(T) + Send + Sync + 'static,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                callback: Box::new(callback),
                pending: Mutex::new(Pending { generation: 0, task: None }),
            }),
            delay,
            runtime,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn call(&self, arg: T) {
        let mut pending = lock(&self.shared.pending);
        pending.generation += 1;
        if let Some(task) = pending.task.take() {
            task.abort();
        }
        let generation = pending.generation;
        let shared = Arc::clone(&self.shared);
        let delay = self.delay;
        pending.task = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            shared.fire(generation, arg);
        }));
    }

    /// Drop the pending invocation, if any. If the callback is already
    /// running this waits for it; once this returns, nothing scheduled
    /// before it will run.
    pub fn cancel(&self) {
        let mut pending = lock(&self.shared.pending);
        pending.generation += 1;
        if let Some(task) = pending.task.take() {
            task.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.shared.pending).task.is_some()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let mut pending = lock(&self.shared.pending);
        pending.generation += 1;
        if let Some(task) = pending.task.take() {
            task.abort();
        }
    }
}
