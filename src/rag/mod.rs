//! RAG (Retrieval-Augmented Generation) module
//!
//! Turns one helpdesk question into one grounded answer:
//! - Nearest-chunk retrieval from the vector index
//! - Context assembly in retrieval order
//! - Prompt building from a fixed system instruction
//! - Answer generation, timing and failure tagging
//!
//! # Examples
//!
//! ```rust,no_run
//! use helpdesk_rag::config::AppConfig;
//! use helpdesk_rag::rag::RagPipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let pipeline = RagPipeline::from_config(&config).await?;
//!
//!     let result = pipeline.answer("My printer won't print").await?;
//!     println!("Answer: {}", result.answer_text);
//!     println!("{} chunks in {:.2}s", result.num_chunks_retrieved, result.elapsed_seconds);
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod pipeline;
pub mod prompts;
pub mod retriever;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

pub use context::AssembledContext;
pub use context::ContextAssembler;
pub use pipeline::PipelineConfig;
pub use pipeline::RagPipeline;
pub use prompts::Prompt;
pub use retriever::PgVectorIndex;

use crate::errors::Result;

/// Scalar metadata value attached to a chunk by the ingestion process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

/// A slice of the support manual as stored in the vector index
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl DocumentChunk {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }
}

/// One search hit; lower distance means more relevant
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub chunk: DocumentChunk,
    pub distance: f32,
}

/// Outcome of one successful `answer()` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    pub answer_text: String,
    pub elapsed_seconds: f64,
    /// Chunks actually placed into the prompt context
    pub num_chunks_retrieved: usize,
    /// Mean distance over the chunks in the context; `None` when there were none
    pub average_retrieval_distance: Option<f32>,
}

impl AnswerResult {
    /// Latency in milliseconds rounded to two decimals, as stored in history
    #[must_use]
    pub fn latency_ms(&self) -> f64 {
        (self.elapsed_seconds * 1000.0 * 100.0).round() / 100.0
    }
}

/// Nearest-neighbour search over embedded chunks.
///
/// Implementations embed `query_text` with the same model that built the
/// index and return at most `k` hits in ascending distance order.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn search(&self, query_text: &str, k: usize) -> Result<Vec<RetrievedChunk>>;
}

/// Hosted language model producing the answer text for a prompt
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String>;

    /// Identifies the backend model, for logs
    fn model_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_ms_rounding() {
        let result = AnswerResult {
            answer_text: "ok".into(),
            elapsed_seconds: 1.234_567,
            num_chunks_retrieved: 1,
            average_retrieval_distance: Some(0.2),
        };
        assert!((result.latency_ms() - 1234.57).abs() < 1e-9);
    }

    #[test]
    fn test_metadata_deserializes_scalars() {
        let chunk: DocumentChunk = serde_json::from_str(
            r#"{"content":"text","metadata":{"source":"manual.pdf","page":4,"score":0.5,"ocr":false}}"#,
        )
        .unwrap();

        assert_eq!(
            chunk.metadata.get("source"),
            Some(&MetadataValue::Text("manual.pdf".into()))
        );
        assert_eq!(chunk.metadata.get("page"), Some(&MetadataValue::Integer(4)));
        assert_eq!(chunk.metadata.get("score"), Some(&MetadataValue::Float(0.5)));
        assert_eq!(chunk.metadata.get("ocr"), Some(&MetadataValue::Bool(false)));
    }

    #[test]
    fn test_metadata_defaults_to_empty() {
        let chunk: DocumentChunk = serde_json::from_str(r#"{"content":"text"}"#).unwrap();
        assert!(chunk.metadata.is_empty());
    }
}
