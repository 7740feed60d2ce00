use super::model::Job;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Shared job table.
///
/// Every access takes the lock for the duration of one closure, so readers
/// see a job either before or after a transition, never in between. The lock
/// is never held across an await point.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) {
        self.jobs.write().insert(job.id, job);
    }

    /// Snapshot of a job
    pub fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.read().get(&id).cloned()
    }

    /// Mutate a job in place. Returns `None` if the job no longer exists.
    pub fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut Job) -> R) -> Option<R> {
        self.jobs.write().get_mut(&id).map(f)
    }

    pub fn remove(&self, id: Uuid) -> Option<Job> {
        self.jobs.write().remove(&id)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}
