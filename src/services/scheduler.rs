use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Trailing-edge debounce: runs a task once `delay` has passed without a
/// new `schedule` call. At most one timer is outstanding.
pub struct DebounceScheduler {
    delay: Duration,
    generation: AtomicU64,
    slot: Arc<Mutex<Option<Timer>>>,
}

struct Timer {
    generation: u64,
    handle: JoinHandle<()>,
}

impl DebounceScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Arms the timer, replacing any outstanding one. Outside a tokio runtime
    /// nothing is armed and any outstanding timer is left as it is.
    pub fn schedule<F, Fut>(&self, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            warn!("no tokio runtime, debounce timer not armed");
            return;
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let slot = Arc::clone(&self.slot);
        let delay = self.delay;

        // Hold the slot while spawning so the timer cannot fire before it is
        // registered.
        let mut current = lock(&self.slot);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            // Detach from the slot before running: once the task starts, a
            // later `schedule` or `cancel` must not abort it.
            {
                let mut current = lock(&slot);
                let is_current = current
                    .as_ref()
                    .is_some_and(|timer| timer.generation == generation);
                if !is_current {
                    return;
                }
                current.take();
            }

            task().await;
        });

        if let Some(previous) = current.replace(Timer { generation, handle }) {
            debug!("debounce timer re-armed");
            previous.handle.abort();
        }
    }

    /// Cancels the outstanding timer. Returns whether one was cancelled.
    pub fn cancel(&self) -> bool {
        match lock(&self.slot).take() {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        lock(&self.slot).is_some()
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock(slot: &Mutex<Option<Timer>>) -> MutexGuard<'_, Option<Timer>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
