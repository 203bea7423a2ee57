//! Embedding API clients for Ollama and OpenAI-compatible endpoints

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::ProviderKind;
use crate::errors::HelpdeskError;
use crate::errors::Result;

/// Maximum concurrent requests when a provider has no batch endpoint
const OLLAMA_BATCH_CONCURRENCY: usize = 16;

/// Client for generating embeddings from an HTTP provider
pub struct EmbeddingClient {
    provider: ProviderKind,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    /// - Unsupported provider (Gemini is generation-only here)
    pub fn new(
        provider: ProviderKind,
        model: String,
        endpoint: String,
        api_key: Option<String>,
    ) -> Result<Self> {
        if provider == ProviderKind::Gemini {
            return Err(HelpdeskError::ConfigError(
                "Gemini is not supported as an embedding provider; use ollama or openai"
                    .to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .pool_idle_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| HelpdeskError::HttpError(e.to_string()))?;

        Ok(Self {
            provider,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    /// Generate embedding for a single text
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Invalid API responses (malformed JSON, missing embedding)
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        match self.provider {
            ProviderKind::OpenAI => {
                let mut batch = self.generate_batch_openai(vec![text]).await?;
                batch.pop().ok_or_else(|| {
                    HelpdeskError::EmbeddingError("No embedding in response".to_string())
                })
            }
            ProviderKind::Ollama => self.generate_ollama(text).await,
            ProviderKind::Gemini => Err(HelpdeskError::ConfigError(
                "Gemini embeddings are not supported".to_string(),
            )),
        }
    }

    /// Generate embeddings for multiple texts, preserving input order
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Invalid API responses (malformed JSON, count mismatches)
    pub async fn generate_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        match self.provider {
            ProviderKind::OpenAI => self.generate_batch_openai(texts).await,
            ProviderKind::Ollama => {
                use futures::stream::StreamExt;
                use futures::stream::{
                    self,
                };

                // Ollama has no batch endpoint; `buffered` keeps results in input order
                let concurrency = texts.len().clamp(1, OLLAMA_BATCH_CONCURRENCY);
                let requests: Vec<_> = texts
                    .iter()
                    .map(|text| self.generate_ollama(text))
                    .collect();
                let results: Vec<Result<Vec<f32>>> = stream::iter(requests)
                    .buffered(concurrency)
                    .collect()
                    .await;

                results.into_iter().collect()
            }
            ProviderKind::Gemini => Err(HelpdeskError::ConfigError(
                "Gemini embeddings are not supported".to_string(),
            )),
        }
    }

    /// Generate embeddings in batch using an `OpenAI`-compatible API
    async fn generate_batch_openai(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            HelpdeskError::ConfigError("OpenAI API key not provided".to_string())
        })?;

        #[derive(Serialize)]
        struct OpenAIBatchRequest<'a> {
            input: Vec<&'a str>,
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            index: usize,
            embedding: Vec<f32>,
        }

        let expected = texts.len();
        let url = format!("{}/embeddings", self.endpoint);
        debug!("Calling OpenAI embeddings API: {} items", expected);

        let request = OpenAIBatchRequest {
            input: texts,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| HelpdeskError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(HelpdeskError::EmbeddingError(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let mut result: OpenAIResponse = response.json().await.map_err(|e| {
            HelpdeskError::EmbeddingError(format!("Failed to parse response: {e}"))
        })?;

        if result.data.len() != expected {
            return Err(HelpdeskError::EmbeddingError(format!(
                "Expected {expected} embeddings, got {}",
                result.data.len()
            )));
        }

        result.data.sort_by_key(|d| d.index);
        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    /// Generate embedding using Ollama API
    async fn generate_ollama(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.endpoint);
        debug!("Calling Ollama embeddings API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| HelpdeskError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(HelpdeskError::EmbeddingError(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaResponse = response.json().await.map_err(|e| {
            HelpdeskError::EmbeddingError(format!("Failed to parse response: {e}"))
        })?;

        Ok(result.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_rejected_as_embedder() {
        let result = EmbeddingClient::new(
            ProviderKind::Gemini,
            "text-embedding-004".to_string(),
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
            None,
        );
        assert!(matches!(result, Err(HelpdeskError::ConfigError(_))));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = EmbeddingClient::new(
            ProviderKind::Ollama,
            "all-minilm".to_string(),
            "http://localhost:11434/".to_string(),
            None,
        )
        .unwrap();
        assert_eq!(client.endpoint, "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_openai_without_key_fails_before_network() {
        let client = EmbeddingClient::new(
            ProviderKind::OpenAI,
            "text-embedding-3-small".to_string(),
            "http://127.0.0.1:9".to_string(),
            None,
        )
        .unwrap();

        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, HelpdeskError::ConfigError(_)));
    }

    #[tokio::test]
    #[ignore = "Requires a running Ollama with all-minilm"]
    async fn test_ollama_embedding() {
        let client = EmbeddingClient::new(
            ProviderKind::Ollama,
            "all-minilm".to_string(),
            "http://localhost:11434".to_string(),
            None,
        )
        .unwrap();

        let embedding = client.generate("Hello, world!").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
