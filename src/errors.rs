use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelpdeskError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("History entry not found: id {0}")]
    HistoryNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Clustering error: {0}")]
    ClusteringError(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("{0}")]
    Custom(String),
}

/// Failure of one `answer()` call, tagged by the stage that failed.
///
/// An empty retrieval is never represented here: it produces a normal
/// answer built from an empty context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Vector index or embedding provider unreachable or erroring.
    #[error("Retrieval failure: {0}")]
    Retrieval(#[source] Box<HelpdeskError>),

    /// Answer generator failed, timed out or returned an unusable response.
    #[error("Generation failure: {0}")]
    Generation(#[source] Box<HelpdeskError>),
}

impl PipelineError {
    pub fn retrieval(cause: HelpdeskError) -> Self {
        Self::Retrieval(Box::new(cause))
    }

    pub fn generation(cause: HelpdeskError) -> Self {
        Self::Generation(Box::new(cause))
    }

    /// Short machine-readable kind, used in API error envelopes and logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Retrieval(_) => "retrieval_failure",
            Self::Generation(_) => "generation_failure",
        }
    }
}

pub type Result<T> = std::result::Result<T, HelpdeskError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_error_variants_display() {
        let errors = vec![
            HelpdeskError::Custom("custom".to_string()),
            HelpdeskError::ConfigError("config".to_string()),
            HelpdeskError::EmbeddingError("embedding".to_string()),
            HelpdeskError::LlmError("llm".to_string()),
            HelpdeskError::ClusteringError("clustering".to_string()),
            HelpdeskError::HttpError("http".to_string()),
        ];

        for error in &errors {
            assert!(!format!("{error}").is_empty());
        }
    }

    #[test]
    fn test_pipeline_error_keeps_cause() {
        let err = PipelineError::generation(HelpdeskError::LlmError("quota exceeded".into()));
        assert_eq!(err.kind(), "generation_failure");
        assert!(err.to_string().contains("quota exceeded"));

        let source = err.source().expect("cause should be attached");
        assert!(source.to_string().contains("LLM error"));
    }

    #[test]
    fn test_pipeline_error_converts_into_helpdesk_error() {
        let err: HelpdeskError =
            PipelineError::retrieval(HelpdeskError::HttpError("connection refused".into())).into();
        assert!(matches!(
            err,
            HelpdeskError::Pipeline(PipelineError::Retrieval(_))
        ));
        assert!(err.to_string().starts_with("Retrieval failure"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: HelpdeskError = io_err.into();
        assert!(matches!(err, HelpdeskError::Io(_)));
    }
}
