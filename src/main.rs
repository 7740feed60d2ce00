use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use audiobook_backend::controllers::{jobs::JobController, tts::TtsController};
use audiobook_backend::domain::job::{JobService, JobStore};
use audiobook_backend::domain::tts::{SpeechDispatcher, TtsService};
use audiobook_backend::domain::voice::{ProviderName, VoiceCatalog};
use audiobook_backend::infrastructure::config::{Config, LogFormat};
use audiobook_backend::infrastructure::http::{start_http_server, AppState};
use audiobook_backend::infrastructure::repositories::{
    ArtifactRepository, AzureTtsRepository, FsArtifactRepository, GoogleTtsRepository,
    OpenAiTtsRepository, PollyTtsRepository,
};
use audiobook_backend::infrastructure::scheduler::CleanupScheduler;

const PROVIDER_HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        development = config.is_development(),
        "Starting Audiobook Backend on {}:{}",
        config.host,
        config.port
    );

    // Load the voice catalog
    let catalog = match &config.voice_catalog_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading voice catalog from file");
            VoiceCatalog::from_json_file(path)?
        }
        None => VoiceCatalog::builtin()?,
    };

    // Register the providers that have credentials
    let dispatcher = build_dispatcher(&config).await?;
    tracing::info!(providers = ?dispatcher.providers(), "Speech providers registered");

    let (catalog, dropped) = catalog.retain(|voice| dispatcher.supports(voice.provider.name()));
    for voice in &dropped {
        tracing::warn!(
            voice = %voice.id,
            provider = %voice.provider.name(),
            "Voice disabled, provider not configured"
        );
    }
    if catalog.is_empty() {
        tracing::warn!("No voices available; configure at least one speech provider");
    }
    tracing::info!(voices = catalog.len(), "Voice catalog ready");

    // Artifact storage and cleanup
    let artifacts: Arc<dyn ArtifactRepository> =
        Arc::new(FsArtifactRepository::open(&config.audio_dir).await?);
    tracing::info!(audio_dir = %config.audio_dir.display(), "Artifact storage ready");

    let config = Arc::new(config);
    let catalog = Arc::new(catalog);
    let dispatcher = Arc::new(dispatcher);
    let scheduler = Arc::new(CleanupScheduler::new());

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate services
    tracing::info!("Instantiating services...");
    let job_service = Arc::new(
        JobService::new(
            Arc::new(JobStore::new()),
            catalog.clone(),
            dispatcher.clone(),
            artifacts.clone(),
            scheduler.clone(),
            config.retention(),
        )
        .with_max_concurrent_jobs(config.max_concurrent_jobs),
    );
    let tts_service = Arc::new(TtsService::new(
        catalog.clone(),
        dispatcher.clone(),
        artifacts,
        scheduler,
        config.retention(),
        config.preview_cache_enabled,
    ));

    // 2. Instantiate controllers
    tracing::info!("Instantiating controllers...");
    let state = AppState {
        catalog,
        dispatcher,
        job_controller: Arc::new(JobController::new(job_service.clone())),
        tts_controller: Arc::new(TtsController::new(tts_service)),
    };

    // Start HTTP server with all routes
    start_http_server(config, state, job_service).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn build_dispatcher(config: &Config) -> Result<SpeechDispatcher, Box<dyn std::error::Error>> {
    let http_client = reqwest::Client::builder()
        .timeout(PROVIDER_HTTP_TIMEOUT)
        .build()?;

    let mut dispatcher = SpeechDispatcher::new();

    if let Some(key) = &config.azure_speech_key {
        let repository = match &config.azure_speech_endpoint {
            Some(endpoint) => {
                AzureTtsRepository::with_endpoint(http_client.clone(), endpoint.clone(), key.clone())
            }
            None => AzureTtsRepository::new(http_client.clone(), &config.azure_speech_region, key.clone()),
        };
        tracing::info!(region = %config.azure_speech_region, "Edge voices enabled via Azure Speech");
        dispatcher = dispatcher.with_provider(ProviderName::Edge, Arc::new(repository));
    }

    if let Some(key) = &config.google_tts_api_key {
        let repository = match &config.google_tts_endpoint {
            Some(endpoint) => {
                GoogleTtsRepository::with_endpoint(http_client.clone(), endpoint.clone(), key.clone())
            }
            None => GoogleTtsRepository::new(http_client.clone(), key.clone()),
        };
        tracing::info!("Google Cloud TTS enabled");
        dispatcher = dispatcher.with_provider(ProviderName::Google, Arc::new(repository));
    }

    if config.polly_enabled {
        tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

        let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
        let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
        if !has_access_key || !has_secret_key {
            tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (instance metadata, etc.)");
        }

        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()))
            .load()
            .await;
        let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
        dispatcher = dispatcher.with_provider(
            ProviderName::Polly,
            Arc::new(PollyTtsRepository::new(polly_client)),
        );
    }

    if let Some(key) = &config.openai_api_key {
        let openai_config = async_openai::config::OpenAIConfig::new().with_api_key(key.clone());
        let client = Arc::new(async_openai::Client::with_config(openai_config));
        tracing::info!(model = %config.openai_tts_model, "OpenAI TTS enabled");
        dispatcher = dispatcher.with_provider(
            ProviderName::OpenAi,
            Arc::new(OpenAiTtsRepository::new(client, config.openai_tts_model.clone())),
        );
    }

    Ok(dispatcher)
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "audiobook_backend=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
