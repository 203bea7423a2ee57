//! LLM module: the answer generator behind the RAG pipeline
//!
//! Supports hosted and local chat models:
//! - Gemini (`generateContent`, system instruction as a top-level field)
//! - OpenAI-compatible `/chat/completions`
//! - Ollama `/api/chat`

pub mod client;

use serde::Deserialize;
use serde::Serialize;

pub use client::LlmService;

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}
