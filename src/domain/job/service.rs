use super::error::JobServiceError;
use super::model::{Artifact, ArtifactRef, Job, JobStatus};
use super::store::JobStore;
use crate::domain::tts::SpeechDispatcher;
use crate::domain::voice::{Voice, VoiceCatalog};
use crate::infrastructure::repositories::{ArtifactError, ArtifactRepository};
use crate::infrastructure::scheduler::CleanupScheduler;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Notify, Semaphore};
use uuid::Uuid;

/// Filename suggested to clients downloading a finished audiobook
pub const DOWNLOAD_FILENAME: &str = "audiobook.mp3";

/// How long stored audio and job records survive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// After the first download of a background job
    pub job_download: Duration,
    /// After a synchronous generate response
    pub sync_download: Duration,
    /// After a voice preview
    pub preview: Duration,
    /// Submitted jobs that are never downloaded
    pub idle_timeout: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            job_download: Duration::from_secs(3600),
            sync_download: Duration::from_secs(30),
            preview: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(24 * 3600),
        }
    }
}

pub fn artifact_key(file_id: Uuid) -> String {
    format!("audiobook_{}.mp3", file_id)
}

#[async_trait]
pub trait JobServiceApi: Send + Sync {
    /// Validate and enqueue a synthesis job
    ///
    /// This operation:
    /// - Rejects empty text and unknown voices without creating a job
    /// - Records the job as pending and schedules its idle expiry
    /// - Spawns the background task that synthesizes and stores the audio
    ///
    /// Returns the new job id immediately
    async fn submit(&self, text: String, voice_id: String) -> Result<Uuid, JobServiceError>;

    /// Snapshot of a job's current state
    async fn get_status(&self, job_id: Uuid) -> Result<Job, JobServiceError>;

    /// Audio of a finished job. The first successful call starts the
    /// retention window after which the job and its audio are removed.
    async fn fetch_artifact(&self, job_id: Uuid) -> Result<Artifact, JobServiceError>;
}

/// Counts running job tasks so shutdown can wait for them
#[derive(Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

struct InFlightGuard(Arc<InFlight>);

impl InFlight {
    fn enter(self: &Arc<Self>) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard(self.clone())
    }

    async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

pub struct JobService {
    store: Arc<JobStore>,
    catalog: Arc<VoiceCatalog>,
    dispatcher: Arc<SpeechDispatcher>,
    artifacts: Arc<dyn ArtifactRepository>,
    scheduler: Arc<CleanupScheduler>,
    retention: RetentionPolicy,
    limiter: Option<Arc<Semaphore>>,
    in_flight: Arc<InFlight>,
    accepting: AtomicBool,
}

impl JobService {
    pub fn new(
        store: Arc<JobStore>,
        catalog: Arc<VoiceCatalog>,
        dispatcher: Arc<SpeechDispatcher>,
        artifacts: Arc<dyn ArtifactRepository>,
        scheduler: Arc<CleanupScheduler>,
        retention: RetentionPolicy,
    ) -> Self {
        Self {
            store,
            catalog,
            dispatcher,
            artifacts,
            scheduler,
            retention,
            limiter: None,
            in_flight: Arc::new(InFlight::default()),
            accepting: AtomicBool::new(true),
        }
    }

    /// Cap how many jobs synthesize at once; `0` means unbounded
    pub fn with_max_concurrent_jobs(mut self, max: usize) -> Self {
        self.limiter = (max > 0).then(|| Arc::new(Semaphore::new(max)));
        self
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// Jobs whose background task has not finished yet
    pub fn in_flight(&self) -> usize {
        self.in_flight.count.load(Ordering::SeqCst)
    }

    /// Stop accepting jobs, drop pending cleanups and wait up to `grace` for
    /// running jobs. Returns `false` if some were still running at the deadline.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.accepting.store(false, Ordering::SeqCst);
        self.scheduler.shutdown();

        let running = self.in_flight();
        if running == 0 {
            return true;
        }

        tracing::info!(running, grace_secs = grace.as_secs(), "Waiting for running jobs");
        match tokio::time::timeout(grace, self.in_flight.wait_idle()).await {
            Ok(()) => {
                tracing::info!("All jobs drained");
                true
            }
            Err(_) => {
                tracing::warn!(
                    still_running = self.in_flight(),
                    "Shutdown grace period elapsed with jobs still running"
                );
                false
            }
        }
    }

    fn validate(&self, text: &str, voice_id: &str) -> Result<Voice, JobServiceError> {
        if text.trim().is_empty() {
            return Err(JobServiceError::Validation("Text cannot be empty".to_string()));
        }
        self.catalog
            .get(voice_id)
            .cloned()
            .ok_or_else(|| JobServiceError::Validation(format!("Unknown voice: {}", voice_id)))
    }

    fn schedule_expiry(&self, job_id: Uuid, delay: Duration) {
        let store = self.store.clone();
        let artifacts = self.artifacts.clone();
        self.scheduler.schedule(job_id, delay, async move {
            expire_job(&store, artifacts.as_ref(), job_id).await;
        });
    }

    fn worker(&self) -> JobWorker {
        JobWorker {
            store: self.store.clone(),
            dispatcher: self.dispatcher.clone(),
            artifacts: self.artifacts.clone(),
        }
    }
}

#[async_trait]
impl JobServiceApi for JobService {
    async fn submit(&self, text: String, voice_id: String) -> Result<Uuid, JobServiceError> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(JobServiceError::ShuttingDown);
        }

        let voice = self.validate(&text, &voice_id)?;

        let job = Job::new(voice.id.clone());
        let job_id = job.id;
        self.store.insert(job);
        self.schedule_expiry(job_id, self.retention.idle_timeout);

        tracing::info!(
            job_id = %job_id,
            voice = %voice.id,
            provider = %voice.provider.name(),
            text_length = text.len(),
            "Job submitted"
        );

        let guard = self.in_flight.enter();
        let limiter = self.limiter.clone();
        let worker = self.worker();
        tokio::spawn(async move {
            let _guard = guard;
            let _permit = match limiter {
                Some(limiter) => match limiter.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => {
                        worker.store.update(job_id, |job| job.fail("job queue closed"));
                        return;
                    }
                },
                None => None,
            };
            worker.run(job_id, text, voice).await;
        });

        Ok(job_id)
    }

    async fn get_status(&self, job_id: Uuid) -> Result<Job, JobServiceError> {
        self.store.get(job_id).ok_or(JobServiceError::NotFound)
    }

    async fn fetch_artifact(&self, job_id: Uuid) -> Result<Artifact, JobServiceError> {
        let job = self.store.get(job_id).ok_or(JobServiceError::NotFound)?;

        let artifact = match job.artifact() {
            Some(artifact) => artifact.clone(),
            None if job.status() == JobStatus::Error => {
                return Err(JobServiceError::NotReady(format!(
                    "Job failed: {}",
                    job.error_message().unwrap_or_default()
                )));
            }
            None => {
                return Err(JobServiceError::NotReady(format!(
                    "Job is not ready (status: {}, progress: {}%)",
                    job.status(),
                    job.progress()
                )));
            }
        };

        let bytes = match self.artifacts.load(&artifact.key).await {
            Ok(bytes) => bytes,
            // Expired between the lookup and the read
            Err(ArtifactError::NotFound(_)) => return Err(JobServiceError::NotFound),
            Err(e) => return Err(e.into()),
        };

        if self.store.update(job_id, |job| job.mark_delivered()) == Some(true) {
            tracing::info!(
                job_id = %job_id,
                retention_secs = self.retention.job_download.as_secs(),
                "First download, retention window started"
            );
            self.schedule_expiry(job_id, self.retention.job_download);
        }

        Ok(Artifact {
            bytes,
            mime_type: artifact.mime_type,
            filename: artifact.filename,
        })
    }
}

/// Everything a background job task needs, detached from the service
struct JobWorker {
    store: Arc<JobStore>,
    dispatcher: Arc<SpeechDispatcher>,
    artifacts: Arc<dyn ArtifactRepository>,
}

impl JobWorker {
    async fn run(self, job_id: Uuid, text: String, voice: Voice) {
        if self.store.update(job_id, |job| job.start()) != Some(true) {
            tracing::warn!(job_id = %job_id, "Job expired before processing started");
            return;
        }

        let started = Instant::now();
        tracing::info!(job_id = %job_id, "Job processing started");

        let store = self.store.clone();
        let on_progress = move |progress: u8| {
            store.update(job_id, |job| job.advance(progress));
        };

        match self.produce(&text, &voice, &on_progress).await {
            Ok(artifact) => {
                let key = artifact.key.clone();
                let size_bytes = artifact.size_bytes;
                if self.store.update(job_id, |job| job.complete(artifact)) == Some(true) {
                    tracing::info!(
                        job_id = %job_id,
                        audio_size = size_bytes,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Job completed"
                    );
                } else {
                    tracing::warn!(job_id = %job_id, "Job expired while processing, discarding audio");
                    if let Err(e) = self.artifacts.delete(&key).await {
                        tracing::warn!(job_id = %job_id, error = %e, "Failed to discard orphaned audio");
                    }
                }
            }
            Err(e) => {
                tracing::error!(
                    job_id = %job_id,
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Job failed"
                );
                self.store.update(job_id, |job| job.fail(e.to_string()));
            }
        }
    }

    async fn produce(
        &self,
        text: &str,
        voice: &Voice,
        on_progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<ArtifactRef, JobServiceError> {
        let audio = self.dispatcher.synthesize(text, voice, on_progress).await?;

        let key = artifact_key(Uuid::new_v4());
        self.artifacts.save(&key, &audio).await?;

        Ok(ArtifactRef::mp3(key, DOWNLOAD_FILENAME, audio.len()))
    }
}

async fn expire_job(store: &JobStore, artifacts: &dyn ArtifactRepository, job_id: Uuid) {
    let Some(job) = store.remove(job_id) else {
        return;
    };

    if let Some(artifact) = job.artifact() {
        if let Err(e) = artifacts.delete(&artifact.key).await {
            tracing::warn!(job_id = %job_id, key = %artifact.key, error = %e, "Failed to delete expired audio");
        }
    }

    tracing::info!(job_id = %job_id, status = %job.status(), "Job expired");
}
