//! IT support assistant
//!
//! Answers employee IT questions from an indexed support manual:
//! retrieve the nearest manual chunks, assemble them into a prompt and
//! ask an LLM for a grounded answer. Every answered exchange is kept in a
//! per-user history that can be clustered into topics offline.

pub mod api;
pub mod cli;
pub mod clustering;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod errors;
pub mod history;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;

pub use config::AppConfig;
pub use errors::*;
