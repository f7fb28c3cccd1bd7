//! Classifier and hypothetical-answer prompt calls.

use std::sync::Arc;

use tracing::debug;

use ocx_core::{GenerationBackend, Result};

/// System prompt for the message classifier. The model is asked for a
/// single-word label so the output can be matched directly.
pub const CLASSIFIER_SYSTEM_PROMPT: &str = "Classify the following user message as exactly one \
of: question, statement, other. Respond with only the single label word, lowercase, and \
nothing else.";

/// System prompt for the hypothetical-answer generation step.
pub const HYDE_SYSTEM_PROMPT: &str = "Answer the users question:";

/// Text block announcing spliced-in retrieval context.
pub const CONTEXT_PREAMBLE: &str =
    "Here is some relevant information that you can use to answer the question:";

/// Classifier label for a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Question,
    Statement,
    Other,
}

impl MessageKind {
    /// Map raw model output to a label. Anything that is not recognizably
    /// "question" or "statement" lands in `Other`, which fails open (the
    /// middleware skips retrieval rather than guessing).
    fn from_model_output(output: &str) -> Self {
        let label = output.trim().trim_matches(|c: char| !c.is_alphanumeric());
        if label.eq_ignore_ascii_case("question") {
            MessageKind::Question
        } else if label.eq_ignore_ascii_case("statement") {
            MessageKind::Statement
        } else {
            MessageKind::Other
        }
    }
}

/// Classify a user message. One LLM round-trip; errors propagate.
pub async fn classify(
    backend: &Arc<dyn GenerationBackend>,
    message: &str,
) -> Result<MessageKind> {
    let output = backend
        .generate_with_system(CLASSIFIER_SYSTEM_PROMPT, message)
        .await?;
    let kind = MessageKind::from_model_output(&output);
    debug!(
        subsystem = "rag",
        component = "classifier",
        classification = ?kind,
        "Message classified"
    );
    Ok(kind)
}

/// Generate a hypothetical answer to embed in place of the raw question.
///
/// A hypothetical answer tends to sit closer in embedding space to stored
/// answer-like chunks than the question itself does.
pub async fn hypothetical_answer(
    backend: &Arc<dyn GenerationBackend>,
    question: &str,
) -> Result<String> {
    backend
        .generate_with_system(HYDE_SYSTEM_PROMPT, question)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parsing_exact() {
        assert_eq!(
            MessageKind::from_model_output("question"),
            MessageKind::Question
        );
        assert_eq!(
            MessageKind::from_model_output("statement"),
            MessageKind::Statement
        );
        assert_eq!(MessageKind::from_model_output("other"), MessageKind::Other);
    }

    #[test]
    fn test_label_parsing_tolerates_noise() {
        assert_eq!(
            MessageKind::from_model_output("  Question.\n"),
            MessageKind::Question
        );
        assert_eq!(
            MessageKind::from_model_output("\"statement\""),
            MessageKind::Statement
        );
    }

    #[test]
    fn test_unrecognized_label_is_other() {
        assert_eq!(
            MessageKind::from_model_output("I think this is a question"),
            MessageKind::Other
        );
        assert_eq!(MessageKind::from_model_output(""), MessageKind::Other);
    }
}
