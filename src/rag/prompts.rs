//! Prompt templates for helpdesk RAG queries

/// Default system instruction. `{context}` is replaced with the assembled context.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = r#"You are an expert IT support assistant.
Use STRICTLY the context below to answer the question.
If the answer is not in the context, say clearly: "I don't know".

--- Context ---
{context}
"#;

/// Context used when retrieval returns nothing
pub const DEFAULT_EMPTY_CONTEXT_NOTICE: &str =
    "No relevant information was found in the IT support manual.";

/// Placeholder substituted with the assembled context
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// A fully assembled prompt: system instruction with context, plus the literal question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub question: String,
}

impl Prompt {
    /// Fill the system template with `context`.
    ///
    /// A template without the placeholder gets the context appended after it.
    #[must_use]
    pub fn build(system_template: &str, context: &str, question: &str) -> Self {
        let system = if system_template.contains(CONTEXT_PLACEHOLDER) {
            system_template.replace(CONTEXT_PLACEHOLDER, context)
        } else {
            format!("{}\n\n--- Context ---\n{context}\n", system_template.trim_end())
        };

        Self {
            system,
            question: question.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_substitutes_context() {
        let prompt = Prompt::build(DEFAULT_SYSTEM_INSTRUCTION, "Restart the spooler.", "q?");
        assert!(prompt.system.contains("Restart the spooler."));
        assert!(!prompt.system.contains(CONTEXT_PLACEHOLDER));
        assert!(prompt.system.contains("I don't know"));
        assert_eq!(prompt.question, "q?");
    }

    #[test]
    fn test_build_without_placeholder_appends_context() {
        let prompt = Prompt::build("Answer briefly.", "ctx", "why?");
        assert!(prompt.system.starts_with("Answer briefly."));
        assert!(prompt.system.ends_with("ctx\n"));
    }
}
