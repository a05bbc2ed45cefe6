use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    pending: Option<Pending>,
}

/// Delays a task until `delay` has passed with no newer `schedule` call.
///
/// Once the quiet period ends the task detaches from the slot, so `cancel`
/// only stops tasks still waiting, never one already running.
#[derive(Clone)]
pub struct Debouncer {
    name: &'static str,
    delay: Duration,
    slot: Arc<Mutex<Slot>>,
}

impl Debouncer {
    pub fn new(name: &'static str, delay: Duration) -> Self {
        Self {
            name,
            delay,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.lock();
        slot.generation += 1;
        let generation = slot.generation;

        let delay = self.delay;
        let name = self.name;
        let shared = self.slot.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut slot = shared.lock().unwrap_or_else(|e| e.into_inner());
                if slot.pending.as_ref().map(|p| p.generation) != Some(generation) {
                    return;
                }
                slot.pending = None;
            }
            debug!(channel = name, "debounce fired");
            task.await;
        });

        if let Some(previous) = slot.pending.replace(Pending { generation, handle }) {
            previous.handle.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(previous) = self.lock().pending.take() {
            debug!(channel = self.name, "debounce cancelled");
            previous.handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}
