//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::database::Database;
use crate::embeddings::EmbeddingService;
use crate::history::HistoryStore;
use crate::rag::RagPipeline;
use crate::Result;

/// Assemble routes and middleware layers
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let mut app = routes::api_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
///
/// # Errors
/// - Database, embedder or LLM client setup errors
/// - Bind or serve errors
pub async fn serve_api(
    config: &AppConfig,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("🚀 Starting IT support assistant API server...");

    // Initialize services
    let database = Arc::new(Database::from_config(config).await?);
    database.verify_schema_or_error().await?;
    let embedding_service = Arc::new(EmbeddingService::new(config)?);
    info!(
        "🧠 Embeddings: {} {} ({} dims)",
        embedding_service.provider(),
        embedding_service.model(),
        embedding_service.dimension()
    );
    let pipeline = Arc::new(RagPipeline::from_services(
        config,
        database.clone(),
        embedding_service,
    )?);
    info!(
        "🤖 LLM: {} {}, top_k = {}",
        config.llm.provider,
        config.llm_model(),
        pipeline.config().top_k
    );
    let history: Arc<dyn HistoryStore> = database;

    let state = AppState::new(pipeline, history, &config.server);
    if state.api_key.is_some() {
        info!("🔒 X-API-KEY required on /query and /history");
    }

    let app = build_router(state, enable_cors);

    // Start server
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /         - Service status");
    info!("  GET  /health   - Health check");
    info!("  POST /query    - Ask a question");
    info!("  GET  /history  - Caller's past questions");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
