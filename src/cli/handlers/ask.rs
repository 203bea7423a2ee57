//! Question answering handlers: one-off `ask` and bulk `populate`

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing::warn;

use crate::cli::output::print_answer;
use crate::cli::output::print_error;
use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::cli::output::truncate_str;
use crate::database::Database;
use crate::embeddings::EmbeddingService;
use crate::history::HistoryStore;
use crate::models::NewHistoryEntry;
use crate::rag::RagPipeline;
use crate::AppConfig;
use crate::HelpdeskError;
use crate::Result;

/// Counts from one `populate` run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PopulateSummary {
    pub answered: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub async fn handle_ask_command(
    config: &AppConfig,
    question: String,
    user: Option<String>,
) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        return Err(HelpdeskError::Custom("Question must not be empty".to_string()));
    }

    print_info(&format!("🤖 Question: \"{question}\""));

    let database = Arc::new(Database::from_config(config).await?);
    let embedder = Arc::new(EmbeddingService::new(config)?);
    let pipeline = RagPipeline::from_services(config, database.clone(), embedder)?;

    let result = pipeline.answer(question).await?;
    print_answer(&result);

    if let Some(user) = user {
        database
            .record(NewHistoryEntry::from_answer(&user, question, &result))
            .await?;
        print_success(&format!("Recorded in {user}'s history"));
    }

    Ok(())
}

pub async fn handle_populate_command(
    config: &AppConfig,
    file: &Path,
    user: &str,
    delay_ms: u64,
) -> Result<()> {
    let content = tokio::fs::read_to_string(file).await?;
    let questions = parse_question_file(&content);
    print_info(&format!(
        "📥 {} questions from {}",
        questions.len(),
        file.display()
    ));

    let database = Arc::new(Database::from_config(config).await?);
    let embedder = Arc::new(EmbeddingService::new(config)?);
    let pipeline = RagPipeline::from_services(config, database.clone(), embedder)?;

    let summary = populate_history(
        &pipeline,
        database.as_ref(),
        &questions,
        user,
        Duration::from_millis(delay_ms),
    )
    .await?;

    print_success(&format!(
        "Answered {}, skipped {} already present, {} failed",
        summary.answered, summary.skipped, summary.failed
    ));
    if summary.failed > 0 {
        print_error("Some questions failed; see the log for details");
    }

    Ok(())
}

/// One question per line; surrounding whitespace and blank lines dropped
#[must_use]
pub fn parse_question_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Answer each question not already in history and record it for `user`.
///
/// A failed question is logged and skipped. `delay` is slept after every
/// pipeline call.
///
/// # Errors
/// History store errors abort the run
pub async fn populate_history(
    pipeline: &RagPipeline,
    history: &dyn HistoryStore,
    questions: &[String],
    user: &str,
    delay: Duration,
) -> Result<PopulateSummary> {
    let mut summary = PopulateSummary::default();
    let total = questions.len();

    for (i, question) in questions.iter().enumerate() {
        if history.question_exists(question).await? {
            info!("[{}/{}] Already answered, skipping: {}", i + 1, total, question);
            summary.skipped += 1;
            continue;
        }

        match pipeline.answer(question).await {
            Ok(result) => {
                history
                    .record(NewHistoryEntry::from_answer(user, question.as_str(), &result))
                    .await?;
                info!(
                    "[{}/{}] {} -> {}",
                    i + 1,
                    total,
                    question,
                    truncate_str(&result.answer_text, 60)
                );
                summary.answered += 1;
            }
            Err(e) => {
                warn!("[{}/{}] Failed ({}): {}: {}", i + 1, total, e.kind(), question, e);
                summary.failed += 1;
            }
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::history::InMemoryHistoryStore;
    use crate::rag::AnswerGenerator;
    use crate::rag::DocumentChunk;
    use crate::rag::PipelineConfig;
    use crate::rag::Prompt;
    use crate::rag::RetrievedChunk;
    use crate::rag::VectorIndex;

    struct OneChunkIndex;

    #[async_trait]
    impl VectorIndex for OneChunkIndex {
        async fn search(&self, _query_text: &str, _k: usize) -> Result<Vec<RetrievedChunk>> {
            Ok(vec![RetrievedChunk {
                chunk: DocumentChunk::new("Hold the power button for ten seconds."),
                distance: 0.2,
            }])
        }
    }

    /// Fails for any question mentioning "crash"
    struct PickyGenerator;

    #[async_trait]
    impl AnswerGenerator for PickyGenerator {
        async fn generate(&self, prompt: &Prompt) -> Result<String> {
            if prompt.question.contains("crash") {
                Err(HelpdeskError::LlmError("quota exceeded".to_string()))
            } else {
                Ok(format!("Answer to: {}", prompt.question))
            }
        }

        fn model_id(&self) -> &str {
            "picky"
        }
    }

    fn pipeline() -> RagPipeline {
        RagPipeline::new(
            Arc::new(OneChunkIndex),
            Arc::new(PickyGenerator),
            PipelineConfig::default(),
        )
    }

    #[test]
    fn test_parse_question_file_skips_blanks() {
        let questions = parse_question_file("  How do I reset MFA?\n\n\t\nPrinter offline  \n");
        assert_eq!(questions, vec!["How do I reset MFA?", "Printer offline"]);
    }

    #[tokio::test]
    async fn test_populate_records_answers() {
        let store = InMemoryHistoryStore::new();
        let questions = parse_question_file("Laptop will not boot\nWi-Fi keeps dropping\n");

        let summary = populate_history(&pipeline(), &store, &questions, "bulk", Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(summary.answered, 2);
        let entries = store.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.username == "bulk"));
        assert_eq!(entries[0].num_chunks, 1);
        assert_eq!(entries[1].answer, "Answer to: Wi-Fi keeps dropping");
    }

    #[tokio::test]
    async fn test_populate_skips_existing_and_continues_past_failures() {
        let store = InMemoryHistoryStore::new();
        populate_history(
            &pipeline(),
            &store,
            &["Laptop will not boot".to_string()],
            "bulk",
            Duration::ZERO,
        )
        .await
        .unwrap();

        let questions = vec![
            "Laptop will not boot".to_string(),
            "Outlook crash on start".to_string(),
            "Wi-Fi keeps dropping".to_string(),
        ];
        let summary = populate_history(&pipeline(), &store, &questions, "bulk", Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(
            summary,
            PopulateSummary {
                answered: 1,
                skipped: 1,
                failed: 1,
            }
        );
        let entries = store.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| !e.question.contains("crash")));
    }
}
