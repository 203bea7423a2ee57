/// API request handlers
use std::sync::Arc;
use std::time::Duration;

use axum::Json;

use crate::api::types::ApiResponse;
use crate::api::types::HealthResponse;
use crate::api::types::StatusResponse;
use crate::config::ServerConfig;
use crate::history::HistoryStore;
use crate::rag::RagPipeline;

pub mod history;
pub mod query;

pub use history::*;
pub use query::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RagPipeline>,
    pub history: Arc<dyn HistoryStore>,
    /// Deadline around one pipeline call
    pub request_timeout: Duration,
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(
        pipeline: Arc<RagPipeline>,
        history: Arc<dyn HistoryStore>,
        server: &ServerConfig,
    ) -> Self {
        Self {
            pipeline,
            history,
            request_timeout: Duration::from_secs(server.request_timeout_secs),
            api_key: server.api_key.clone().filter(|k| !k.is_empty()),
        }
    }
}

/// Root status handler
pub async fn root() -> Json<ApiResponse<StatusResponse>> {
    Json(ApiResponse::success(StatusResponse {
        status: "ok".to_string(),
        message: "IT support assistant is running".to_string(),
    }))
}

/// Health check handler
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
