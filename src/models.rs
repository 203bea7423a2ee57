use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// A stored question/answer exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HistoryEntry {
    pub id: i64,
    pub username: String,
    pub question: String,
    pub answer: String,
    pub latency_ms: f64,
    pub num_chunks: i32,
    pub avg_distance: Option<f64>,
    /// Topic label assigned by offline clustering
    pub cluster: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Request to record a new exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub username: String,
    pub question: String,
    pub answer: String,
    pub latency_ms: f64,
    pub num_chunks: i32,
    pub avg_distance: Option<f64>,
}

impl NewHistoryEntry {
    /// Build a history record from a pipeline result
    #[must_use]
    pub fn from_answer(
        username: impl Into<String>,
        question: impl Into<String>,
        result: &crate::rag::AnswerResult,
    ) -> Self {
        Self {
            username: username.into(),
            question: question.into(),
            answer: result.answer_text.clone(),
            latency_ms: result.latency_ms(),
            num_chunks: i32::try_from(result.num_chunks_retrieved).unwrap_or(i32::MAX),
            avg_distance: result.average_retrieval_distance.map(f64::from),
        }
    }
}

/// Question text with its row id, as fed to clustering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuestionRecord {
    pub id: i64,
    pub question: String,
}
