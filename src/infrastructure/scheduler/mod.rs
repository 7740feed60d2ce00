use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use uuid::Uuid;

struct Scheduled {
    generation: u64,
    handle: AbortHandle,
}

/// Keyed queue of delayed tasks (artifact and job cleanup).
///
/// At most one task is pending per key: scheduling again replaces the
/// previous one. Delays run on tokio time, so a paused runtime clock drives
/// them in tests.
pub struct CleanupScheduler {
    tasks: Arc<Mutex<HashMap<Uuid, Scheduled>>>,
    generation: AtomicU64,
}

impl Default for CleanupScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl CleanupScheduler {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// Run `task` after `delay`, replacing any task pending for `key`
    pub fn schedule<F>(&self, key: Uuid, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let tasks = self.tasks.clone();

        // Holding the lock across spawn keeps the task from finishing before it is registered
        let mut pending = self.tasks.lock();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut pending = tasks.lock();
                if pending.get(&key).map(|s| s.generation) == Some(generation) {
                    pending.remove(&key);
                }
            }
            task.await;
        })
        .abort_handle();

        if let Some(previous) = pending.insert(key, Scheduled { generation, handle }) {
            previous.handle.abort();
            tracing::debug!(key = %key, delay_secs = delay.as_secs(), "Cleanup rescheduled");
        } else {
            tracing::debug!(key = %key, delay_secs = delay.as_secs(), "Cleanup scheduled");
        }
    }

    /// Cancel the task pending for `key`. Returns `false` if none was pending.
    pub fn cancel(&self, key: Uuid) -> bool {
        match self.tasks.lock().remove(&key) {
            Some(scheduled) => {
                scheduled.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self, key: Uuid) -> bool {
        self.tasks.lock().contains_key(&key)
    }

    /// Number of tasks still waiting for their delay
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Abort every pending task
    pub fn shutdown(&self) {
        let drained: Vec<Scheduled> = self.tasks.lock().drain().map(|(_, s)| s).collect();
        let count = drained.len();
        for scheduled in drained {
            scheduled.handle.abort();
        }
        tracing::info!(aborted = count, "Cleanup scheduler stopped");
    }
}
