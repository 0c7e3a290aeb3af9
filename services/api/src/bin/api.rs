//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::DbAdapter,
    config::Config,
    error::ApiError,
    web::{
        advance_question_handler, complete_item_handler, create_session_handler,
        delete_session_handler, get_session_handler, navigate_handler, preview_answer_handler,
        record_answer_handler, rest::ApiDoc, session_result_handler, state::AppState,
        state::SessionRegistry, video_progress_handler,
    },
};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tutelearn_core::gate::CompletionGate;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

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
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        topics: db_adapter.clone(),
        ledger: db_adapter,
        config: config.clone(),
        gate: CompletionGate::new(config.min_watch_fraction),
        sessions: SessionRegistry::new(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/topics/{topic_id}/sessions", post(create_session_handler))
        .route(
            "/sessions/{session_id}",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route(
            "/sessions/{session_id}/items/complete",
            post(complete_item_handler),
        )
        .route(
            "/sessions/{session_id}/videos/progress",
            post(video_progress_handler),
        )
        .route("/sessions/{session_id}/answers", post(record_answer_handler))
        .route(
            "/sessions/{session_id}/advance",
            post(advance_question_handler),
        )
        .route("/sessions/{session_id}/navigate", post(navigate_handler))
        .route(
            "/sessions/{session_id}/questions/{question_index}/preview",
            get(preview_answer_handler),
        )
        .route(
            "/sessions/{session_id}/result",
            get(session_result_handler),
        )
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
