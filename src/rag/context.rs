//! Context assembly from retrieved chunks

use crate::rag::prompts::DEFAULT_EMPTY_CONTEXT_NOTICE;
use crate::rag::RetrievedChunk;

/// Separator placed between chunk contents
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// Context text plus the chunks that actually made it in
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    pub text: String,
    pub distances: Vec<f32>,
}

impl AssembledContext {
    #[must_use]
    pub fn num_chunks(&self) -> usize {
        self.distances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    #[must_use]
    pub fn average_distance(&self) -> Option<f32> {
        if self.distances.is_empty() {
            return None;
        }
        Some(self.distances.iter().sum::<f32>() / self.distances.len() as f32)
    }
}

/// Joins retrieved chunk contents, most relevant first
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    max_context_length: usize,
    empty_notice: String,
}

impl ContextAssembler {
    #[must_use]
    pub fn new(max_context_length: usize, empty_notice: impl Into<String>) -> Self {
        Self {
            max_context_length,
            empty_notice: empty_notice.into(),
        }
    }

    /// Assemble context from chunks in the order given.
    ///
    /// Stops before the first chunk that would push the text over the
    /// length budget; the first chunk is always kept.
    #[must_use]
    pub fn assemble(&self, chunks: &[RetrievedChunk]) -> AssembledContext {
        if chunks.is_empty() {
            return AssembledContext {
                text: self.empty_notice.clone(),
                distances: Vec::new(),
            };
        }

        let mut text = String::new();
        let mut distances = Vec::with_capacity(chunks.len());

        for retrieved in chunks {
            let content = retrieved.chunk.content.as_str();
            let added = if text.is_empty() {
                content.len()
            } else {
                CHUNK_SEPARATOR.len() + content.len()
            };

            if !distances.is_empty() && text.len() + added > self.max_context_length {
                break;
            }

            if !text.is_empty() {
                text.push_str(CHUNK_SEPARATOR);
            }
            text.push_str(content);
            distances.push(retrieved.distance);
        }

        AssembledContext { text, distances }
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(8000, DEFAULT_EMPTY_CONTEXT_NOTICE)
    }
}
