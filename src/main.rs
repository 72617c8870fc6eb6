//! Survey Debrief server binary.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use secrecy::ExposeSecret;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use survey_debrief::adapters::ai::{OpenAIConfig, OpenAIProvider};
use survey_debrief::adapters::archive::{AzureBlobArchive, LocalFileArchive};
use survey_debrief::adapters::assets::FileQuestionCatalog;
use survey_debrief::adapters::chat_log::JsonlChatLogger;
use survey_debrief::adapters::http::{app_router, InterviewHandlers};
use survey_debrief::adapters::storage::InMemoryInterviewStore;
use survey_debrief::application::{
    CreateInterviewHandler, EndInterviewHandler, ExpireInterviewsHandler, GetInterviewHandler,
    InitializeSessionHandler, SendMessageHandler, StartInterviewHandler,
};
use survey_debrief::config::{
    AiConfig, AiProvider, AppConfig, ConfigError, InterviewConfig, ServerConfig, ValidationError,
};
use survey_debrief::domain::foundation::Timestamp;
use survey_debrief::domain::prompt::{PromptTemplate, TemplateError};
use survey_debrief::ports::{
    AIError, ArchiveError, CatalogError, InterviewStore, LogError, TranscriptArchive,
};

/// Failures that stop the server from starting.
#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("completion provider: {0}")]
    Provider(#[from] AIError),

    #[error("question catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("prompt template: {0}")]
    Template(#[from] TemplateError),

    #[error("chat log: {0}")]
    Log(#[from] LogError),

    #[error("transcript archive: {0}")]
    Archive(#[from] ArchiveError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let addr = config.server.socket_addr()?;
    let handlers = build_handlers(&config).await?;
    let app = with_middleware(
        app_router(handlers, config.server.access_password.clone()),
        &config.server,
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Survey debrief listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

async fn build_handlers(config: &AppConfig) -> Result<InterviewHandlers, StartupError> {
    let provider = Arc::new(OpenAIProvider::new(provider_config(&config.ai))?);

    let catalog = FileQuestionCatalog::load(config.interview.assets_dir()).await?;
    tracing::info!(questions = catalog.len(), "Question catalog loaded");
    let initial_template = PromptTemplate::from_file(config.interview.initial_message_path()).await?;
    let system_template = PromptTemplate::from_file(config.interview.system_message_path()).await?;

    let logger = Arc::new(JsonlChatLogger::init(config.storage.log_dir.clone()).await?);

    let archive: Arc<dyn TranscriptArchive> = match config.storage.blob_connection_string() {
        Some(connection_string) => Arc::new(AzureBlobArchive::from_connection_string(
            connection_string,
            config.storage.archive_container.clone(),
            std::time::Duration::from_secs(config.storage.archive_timeout_secs),
        )?),
        None => {
            tracing::warn!(
                dir = %config.storage.archive_dir.display(),
                "No blob connection string configured, archiving to local directory"
            );
            Arc::new(LocalFileArchive::new(config.storage.archive_dir.clone()))
        }
    };

    let store = Arc::new(InMemoryInterviewStore::new());
    spawn_expiry_sweep(store.clone(), &config.interview);

    let initialize = Arc::new(InitializeSessionHandler::new(
        Arc::new(catalog),
        initial_template,
        system_template,
        config.ai.model_args(),
    ));

    Ok(InterviewHandlers::new(
        Arc::new(CreateInterviewHandler::new(store.clone())),
        Arc::new(StartInterviewHandler::new(store.clone(), initialize)),
        Arc::new(GetInterviewHandler::new(store.clone())),
        Arc::new(SendMessageHandler::new(
            store.clone(),
            provider,
            logger,
            config.interview.end_check(),
        )),
        Arc::new(
            EndInterviewHandler::new(
                store,
                archive,
                config.interview.completion_code_prefix.clone(),
            )
            .with_retention(config.interview.exit_retention()),
        ),
    ))
}

/// Periodically drops interviews that were never exited.
fn spawn_expiry_sweep(store: Arc<dyn InterviewStore>, interview: &InterviewConfig) {
    let expire = ExpireInterviewsHandler::new(store, interview.max_age());
    let mut ticker = tokio::time::interval(interview.sweep_interval());
    tokio::spawn(async move {
        loop {
            ticker.tick().await;
            expire.handle(Timestamp::now()).await;
        }
    });
}

fn provider_config(ai: &AiConfig) -> OpenAIConfig {
    let api_key = ai
        .api_key
        .as_ref()
        .map(|k| k.expose_secret().clone())
        .unwrap_or_default();

    let base = match ai.provider {
        AiProvider::Azure => OpenAIConfig::azure(ai.endpoint.clone().unwrap_or_default(), api_key),
        AiProvider::OpenAI => match &ai.base_url {
            Some(url) => OpenAIConfig::new(api_key).with_base_url(url.clone()),
            None => OpenAIConfig::new(api_key),
        },
    };

    base.with_model(ai.model.clone())
        .with_api_version(ai.api_version.clone())
        .with_timeout(ai.timeout())
}

/// Request tracing, CORS and the REST timeout.
///
/// Upgraded WebSocket connections run outside the request future, so the
/// timeout only bounds the handshake.
fn with_middleware(app: Router, server: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let app = if origins.is_empty() {
        app
    } else {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
    };

    app.layer(TimeoutLayer::new(std::time::Duration::from_secs(
        server.request_timeout_secs,
    )))
    .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
