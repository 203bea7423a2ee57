//! Embeddings generation module
//!
//! Maps text to fixed-dimension vectors through an HTTP provider:
//! - Ollama (local models such as `all-minilm`)
//! - OpenAI-compatible endpoints
//!
//! The same model must be used for the stored chunk vectors and for query
//! vectors; [`Embedder::model_id`] is what the vector index filters on.

pub mod client;
pub mod generator;
pub mod text_preprocessing;

use async_trait::async_trait;

pub use client::EmbeddingClient;
pub use generator::EmbeddingService;
pub use text_preprocessing::preprocess_text_for_embedding;

use crate::config::ProviderKind;
use crate::errors::Result;

/// Maximum batch size for embedding generation
pub const MAX_BATCH_SIZE: usize = 100;

/// Text-to-vector provider
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts; output order matches input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Identifies the vector space
    fn model_id(&self) -> &str;
}

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        Self {
            provider: config.embeddings.provider,
            model: config.embeddings.model.clone(),
            dimension: config.embeddings.dimension,
            endpoint: config.embeddings.endpoint.clone(),
            api_key: config.embeddings.api_key.clone(),
        }
    }
}
