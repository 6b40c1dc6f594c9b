//! services/bot/src/bin/bot.rs

use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    middleware as axum_middleware,
    Router,
};
use bot_lib::{
    adapters::{OpenAiQuizAdapter, PdfTextAdapter, TracingNotifier, DEFAULT_SYSTEM_PROMPT},
    commands::{CommandDescriptions, CommandRouter},
    config::Config,
    error::BotError,
    quiz::{reaper, QuizService},
    web::{command_handler, health_handler, require_bot_token, state::AppState},
};
use quizbot_core::domain::Session;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), BotError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting bot...");

    // --- 2. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| BotError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let quiz_adapter = Arc::new(OpenAiQuizAdapter::new(
        openai_client.clone(),
        config.quiz_model.clone(),
    ));
    let pdf_adapter = Arc::new(PdfTextAdapter::new(config.staging_path.clone()));
    let notifier = Arc::new(TracingNotifier);

    // --- 3. Build the Quiz Service Around the One Session ---
    let session = Arc::new(Mutex::new(Session::new()));
    let default_prompt = config
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
    let service = Arc::new(QuizService::new(
        session,
        pdf_adapter,
        quiz_adapter,
        default_prompt,
    ));

    // --- 4. Start the Idle Reaper ---
    let reaper_cancel = CancellationToken::new();
    let reaper_task = tokio::spawn(reaper::run(
        service.clone(),
        notifier,
        config.reaper_interval,
        config.idle_timeout,
        reaper_cancel.clone(),
    ));

    // --- 5. Build the Shared AppState & Router ---
    let command_router = Arc::new(CommandRouter::new(
        service,
        CommandDescriptions::from_env(),
    ));
    let app_state = Arc::new(AppState {
        config: config.clone(),
        router: command_router,
    });

    let protected_routes = Router::new()
        .route("/commands", post(command_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_bot_token,
        ));

    let app = Router::new()
        .route("/", get(health_handler))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .with_state(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    // --- 7. Shut Down ---
    reaper_cancel.cancel();
    let _ = reaper_task.await;

    Ok(())
}
