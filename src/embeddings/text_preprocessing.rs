//! Text preprocessing utilities for embedding generation

use tracing::debug;

use crate::errors::HelpdeskError;

/// Preprocess text for embedding generation
///
/// This function handles:
/// - Normalizing whitespace and newlines
/// - Replacing control characters
pub fn preprocess_text_for_embedding(text: &str) -> Result<String, HelpdeskError> {
    if text.is_empty() {
        return Err(HelpdeskError::EmbeddingError(
            "Empty text provided".to_string(),
        ));
    }

    let sanitized = normalize_whitespace(&sanitize_text(text));

    if sanitized.is_empty() {
        return Err(HelpdeskError::EmbeddingError(
            "Text contains only whitespace after preprocessing".to_string(),
        ));
    }

    debug!(
        "Preprocessed text: {} -> {} chars",
        text.len(),
        sanitized.len()
    );
    Ok(sanitized)
}

/// Collapse newlines, tabs and runs of spaces into single spaces
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Replace control characters with spaces
fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
