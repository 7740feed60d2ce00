use audiobook_backend::{
    controllers::{jobs::JobController, tts::TtsController},
    domain::{
        job::{JobService, JobStore, RetentionPolicy},
        tts::{SpeechDispatcher, TtsService},
        voice::{Gender, ProviderKind, ProviderName, Voice, VoiceCatalog},
    },
    infrastructure::{
        http::{build_router, serve, AppState},
        repositories::{ArtifactRepository, FsArtifactRepository, PollyTtsRepository},
        scheduler::CleanupScheduler,
    },
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use tokio::sync::oneshot;


use api_client::{ApiResponse, TestClient};
use fake_providers::{unreachable_polly_client, ScriptedProvider};

/// Direct voice: the whole text goes to the provider in one call
pub const DIRECT_VOICE: &str = "pt-BR-AntonioNeural";
/// Chunked voice with a small limit so short texts split
pub const CHUNKED_VOICE: &str = "pt-BR-Wavenet-C";
pub const CHUNK_LIMIT: usize = 40;
/// Voice whose provider is unreachable
pub const POLLY_VOICE: &str = "pt-BR-Camila";
pub const ENGLISH_VOICE: &str = "en-US-JennyNeural";

pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn test_retention() -> RetentionPolicy {
    RetentionPolicy {
        job_download: Duration::from_millis(1000),
        sync_download: Duration::from_millis(500),
        preview: Duration::from_millis(500),
        idle_timeout: Duration::from_secs(60),
    }
}

fn test_voice(id: &str, language: &str, gender: Gender, provider: ProviderKind) -> Voice {
    Voice {
        id: id.to_string(),
        label: id.to_string(),
        language: language.to_string(),
        gender,
        voice_name: None,
        provider,
    }
}

fn test_catalog() -> VoiceCatalog {
    VoiceCatalog::new(vec![
        test_voice(DIRECT_VOICE, "pt-BR", Gender::Male, ProviderKind::Edge),
        test_voice(ENGLISH_VOICE, "en-US", Gender::Female, ProviderKind::Edge),
        test_voice(
            CHUNKED_VOICE,
            "pt-BR",
            Gender::Female,
            ProviderKind::Google {
                chunk_limit: CHUNK_LIMIT,
            },
        ),
        test_voice(
            POLLY_VOICE,
            "pt-BR",
            Gender::Female,
            ProviderKind::Polly { chunk_limit: 3000 },
        ),
    ])
    .expect("valid test catalog")
}

pub struct TestContext {
    pub client: TestClient,
    pub provider: Arc<ScriptedProvider>,
    pub job_service: Arc<JobService>,
    pub audio_dir: PathBuf,
    shutdown: Option<oneshot::Sender<()>>,
    _temp_dir: TempDir,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
            let audio_dir = temp_dir.path().join("audio");
            let artifacts: Arc<dyn ArtifactRepository> = Arc::new(
                FsArtifactRepository::open(&audio_dir)
                    .await
                    .expect("Failed to open artifact storage"),
            );

            let provider = Arc::new(ScriptedProvider::new(Duration::from_millis(30)));
            let dispatcher = Arc::new(
                SpeechDispatcher::new()
                    .with_provider(ProviderName::Edge, provider.clone())
                    .with_provider(ProviderName::Google, provider.clone())
                    .with_provider(
                        ProviderName::Polly,
                        Arc::new(PollyTtsRepository::new(Arc::new(unreachable_polly_client()))),
                    ),
            );

            let catalog = Arc::new(test_catalog());
            let scheduler = Arc::new(CleanupScheduler::new());

            let job_service = Arc::new(JobService::new(
                Arc::new(JobStore::new()),
                catalog.clone(),
                dispatcher.clone(),
                artifacts.clone(),
                scheduler.clone(),
                test_retention(),
            ));
            let tts_service = Arc::new(TtsService::new(
                catalog.clone(),
                dispatcher.clone(),
                artifacts,
                scheduler,
                test_retention(),
                true,
            ));

            let state = AppState {
                catalog,
                dispatcher,
                job_controller: Arc::new(JobController::new(job_service.clone())),
                tts_controller: Arc::new(TtsController::new(tts_service)),
            };
            let app = build_router(state, MAX_BODY_BYTES);

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
            let server_jobs = job_service.clone();
            tokio::spawn(async move {
                serve(listener, app, server_jobs, Duration::from_secs(5), async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
            });

            Self {
                client: TestClient::new(&base_url),
                provider,
                job_service,
                audio_dir,
                shutdown: Some(shutdown_tx),
                _temp_dir: temp_dir,
            }
        }
    }

    fn teardown(mut self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            if let Some(shutdown) = self.shutdown.take() {
                let _ = shutdown.send(());
            }
        }
    }
}

impl TestContext {
    /// Submit a job and return its id
    pub async fn submit_job(&self, text: &str, voice: &str) -> String {
        let response = self
            .client
            .post("/api/jobs", &json!({ "text": text, "voice": voice }))
            .await
            .unwrap();
        response.assert_status(hyper::StatusCode::ACCEPTED);
        response.body.as_ref().unwrap()["job_id"]
            .as_str()
            .expect("job_id in response")
            .to_string()
    }

    /// Poll a job until it is done or failed, returning every status body seen
    pub async fn wait_for_job(&self, job_id: &str) -> Vec<Value> {
        let mut seen = Vec::new();
        for _ in 0..500 {
            let response = self
                .client
                .get(&format!("/api/jobs/{}", job_id))
                .await
                .unwrap();
            response.assert_status(hyper::StatusCode::OK);
            let body = response.body.clone().unwrap();
            let status = body["status"].as_str().unwrap_or_default().to_string();
            seen.push(body);
            if status == "done" || status == "error" {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {} did not finish, last status: {:?}", job_id, seen.last());
    }

    pub async fn download(&self, job_id: &str) -> ApiResponse {
        self.client
            .get(&format!("/api/jobs/{}/download", job_id))
            .await
            .unwrap()
    }

    /// Files currently in the artifact directory
    pub fn stored_files(&self) -> Vec<String> {
        std::fs::read_dir(&self.audio_dir)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }
}
