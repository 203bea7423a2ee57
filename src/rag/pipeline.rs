//! Complete RAG pipeline: Retrieve -> Assemble -> Generate

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::database::Database;
use crate::embeddings::EmbeddingService;
use crate::errors::PipelineError;
use crate::errors::Result;
use crate::llm::LlmService;
use crate::rag::AnswerGenerator;
use crate::rag::AnswerResult;
use crate::rag::ContextAssembler;
use crate::rag::PgVectorIndex;
use crate::rag::Prompt;
use crate::rag::VectorIndex;
use crate::HelpdeskError;

/// Settings fixed when the pipeline is built
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub top_k: usize,
    pub max_context_chars: usize,
    pub system_instruction: String,
    pub empty_context_notice: String,
}

impl PipelineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            top_k: config.rag.top_k,
            max_context_chars: config.rag.max_context_chars,
            system_instruction: config.rag.system_instruction.clone(),
            empty_context_notice: config.rag.empty_context_notice.clone(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

/// Question answering over the IT support manual
pub struct RagPipeline {
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn AnswerGenerator>,
    context_assembler: ContextAssembler,
    config: PipelineConfig,
}

impl RagPipeline {
    /// Create a pipeline from explicit collaborators
    #[must_use]
    pub fn new(
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn AnswerGenerator>,
        config: PipelineConfig,
    ) -> Self {
        let context_assembler =
            ContextAssembler::new(config.max_context_chars, config.empty_context_notice.clone());

        Self {
            index,
            generator,
            context_assembler,
            config,
        }
    }

    /// Build the production pipeline: pgvector index, HTTP embedder and LLM
    ///
    /// # Errors
    /// - Database connection errors
    /// - Embedding or LLM client configuration errors
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let database = Arc::new(Database::from_config(config).await?);
        let embedder = Arc::new(EmbeddingService::new(config)?);
        Self::from_services(config, database, embedder)
    }

    /// Build the production pipeline on top of already-created services
    ///
    /// # Errors
    /// - LLM client configuration errors
    pub fn from_services(
        config: &AppConfig,
        database: Arc<Database>,
        embedder: Arc<EmbeddingService>,
    ) -> Result<Self> {
        let index = Arc::new(PgVectorIndex::new(database, embedder));
        let generator = Arc::new(LlmService::new(config)?);
        Ok(Self::new(
            index,
            generator,
            PipelineConfig::from_app_config(config),
        ))
    }

    /// Answer one question.
    ///
    /// Retrieval and generation run strictly in sequence with no retry and
    /// no internal deadline; callers bring their own timeout.
    ///
    /// # Errors
    /// - [`PipelineError::Retrieval`] when the index or embedder fails
    /// - [`PipelineError::Generation`] when the generator fails or returns blank text
    pub async fn answer(&self, question: &str) -> std::result::Result<AnswerResult, PipelineError> {
        let start = Instant::now();

        debug!("Step 1: Retrieving top {} chunks", self.config.top_k);
        let mut retrieved = self
            .index
            .search(question, self.config.top_k)
            .await
            .map_err(PipelineError::retrieval)?;

        if retrieved.len() > self.config.top_k {
            warn!(
                "Vector index returned {} chunks for k={}, truncating",
                retrieved.len(),
                self.config.top_k
            );
            retrieved.truncate(self.config.top_k);
        }

        debug!("Step 2: Assembling context from {} chunks", retrieved.len());
        let context = self.context_assembler.assemble(&retrieved);
        if context.is_empty() {
            info!("No chunks retrieved, answering from empty context");
        }

        debug!("Step 3: Generating answer");
        let prompt = Prompt::build(&self.config.system_instruction, &context.text, question);
        let answer_text = self
            .generator
            .generate(&prompt)
            .await
            .map_err(PipelineError::generation)?;

        if answer_text.trim().is_empty() {
            return Err(PipelineError::generation(HelpdeskError::LlmError(
                "Answer generator returned an empty response".to_string(),
            )));
        }

        let elapsed_seconds = start.elapsed().as_secs_f64();
        let result = AnswerResult {
            answer_text,
            elapsed_seconds,
            num_chunks_retrieved: context.num_chunks(),
            average_retrieval_distance: context.average_distance(),
        };

        info!(
            question_len = question.len(),
            latency_ms = result.latency_ms(),
            num_chunks = result.num_chunks_retrieved,
            distances = ?context.distances,
            avg_distance = ?result.average_retrieval_distance,
            model = self.generator.model_id(),
            "RAG query completed"
        );

        Ok(result)
    }

    /// Get pipeline settings
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
