//! Embedding generation service with preprocessing and dimension checks

use async_trait::async_trait;
use tracing::debug;

use super::client::EmbeddingClient;
use super::preprocess_text_for_embedding;
use super::Embedder;
use super::EmbeddingConfig;
use super::MAX_BATCH_SIZE;
use crate::config::ProviderKind;
use crate::errors::HelpdeskError;
use crate::errors::Result;

/// Service for generating embeddings in a fixed vector space
pub struct EmbeddingService {
    client: EmbeddingClient,
    config: EmbeddingConfig,
}

impl EmbeddingService {
    /// Create a new embedding service
    ///
    /// # Errors
    /// - Unsupported provider or HTTP client build failure
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        Self::from_config(EmbeddingConfig::from_app_config(config))
    }

    /// Create from custom config
    ///
    /// # Errors
    /// - Unsupported provider or HTTP client build failure
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let client = EmbeddingClient::new(
            config.provider,
            config.model.clone(),
            config.endpoint.clone(),
            config.api_key.clone(),
        )?;

        Ok(Self { client, config })
    }

    /// Generate embedding for a single text
    ///
    /// # Errors
    /// - Blank text after preprocessing
    /// - Provider errors or a vector of the wrong dimension
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        let processed_text = preprocess_text_for_embedding(text)?;
        let embedding = self.client.generate(&processed_text).await?;
        self.check_dimension(&embedding)?;
        Ok(embedding)
    }

    /// Generate embeddings for multiple texts, in input order
    ///
    /// # Errors
    /// - Any text blank after preprocessing
    /// - Provider errors or a vector of the wrong dimension
    pub async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let processed: Vec<String> = texts
            .iter()
            .map(|t| preprocess_text_for_embedding(t))
            .collect::<Result<_>>()?;

        let mut embeddings = Vec::with_capacity(processed.len());
        for chunk in processed.chunks(MAX_BATCH_SIZE) {
            let chunk_embeddings = self
                .client
                .generate_batch(chunk.iter().map(String::as_str).collect())
                .await?;
            embeddings.extend(chunk_embeddings);
        }

        for embedding in &embeddings {
            self.check_dimension(embedding)?;
        }
        debug!("Generated {} embeddings", embeddings.len());

        Ok(embeddings)
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.config.dimension {
            return Err(HelpdeskError::EmbeddingError(format!(
                "Model {} returned {} dimensions, expected {}",
                self.config.model,
                embedding.len(),
                self.config.dimension
            )));
        }
        Ok(())
    }

    /// Get the embedding dimension
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Get the model name
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Get the provider
    #[must_use]
    pub const fn provider(&self) -> ProviderKind {
        self.config.provider
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.generate(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.generate_batch(texts).await
    }

    fn model_id(&self) -> &str {
        self.model()
    }
}
