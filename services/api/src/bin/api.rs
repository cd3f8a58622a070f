//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        analysis_llm::OpenAiAnalysisAdapter, store::DbStore, tts::OpenAiTtsAdapter,
        tutor_llm::OpenAiTutorAdapter,
    },
    config::Config,
    error::ApiError,
    web::{rest, ApiDoc, AppState},
};
use async_openai::{config::OpenAIConfig, types::SpeechModel, Client};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use gurukul_core::catalog::LessonCatalog;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(DbStore::new(db_pool));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let tutor = Arc::new(OpenAiTutorAdapter::new(
        openai_client.clone(),
        config.tutor_model.clone(),
    ));
    let analysis = Arc::new(OpenAiAnalysisAdapter::new(
        openai_client.clone(),
        config.analysis_model.clone(),
    ));

    let tts_voice = OpenAiTtsAdapter::parse_voice(&config.tts_voice).ok_or_else(|| {
        ApiError::Internal(format!(
            "Invalid TTS voice specified in config: '{}'",
            config.tts_voice
        ))
    })?;
    let tts = Arc::new(OpenAiTtsAdapter::new(
        openai_client,
        SpeechModel::Tts1Hd,
        tts_voice,
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        LessonCatalog::builtin(),
        store,
        tutor,
        analysis,
        tts,
        config.clone(),
    ));

    let cors = CorsLayer::new()
        .allow_origin(
            "http://localhost:3000"
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(e.to_string()))?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/meta", get(rest::get_meta))
        .route("/onboarding", post(rest::onboard_handler))
        .route("/profile", get(rest::get_profile_handler))
        .route("/profile/language", post(rest::change_language_handler))
        .route("/library", get(rest::library_handler))
        .route("/lessons/{id}", get(rest::lesson_detail_handler))
        .route("/lessons/{id}/complete", post(rest::complete_lesson_handler))
        .route("/dashboard", get(rest::dashboard_handler))
        .route("/dashboard/analysis", get(rest::analysis_handler))
        .route("/downloads", get(rest::downloads_handler))
        .route("/downloads/{id}/toggle", post(rest::toggle_download_handler))
        .route("/chat", get(rest::chat_handler))
        .route("/chat/send", post(rest::chat_send_handler))
        .route("/chat/focus", post(rest::chat_focus_handler))
        .route("/chat/clear", post(rest::chat_clear_handler))
        .route("/speech", post(rest::speech_handler))
        .route("/logout", post(rest::logout_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
