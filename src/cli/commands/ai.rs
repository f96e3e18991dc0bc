//! AI Commands
//!
//! Boundary layer over [`JournalAssistant`](crate::ai::JournalAssistant):
//! reads entry text, validates it, runs the operation and turns failures
//! into a short message for the writer.
//!
//! Usage:
//!   reverie questions [TEXT] [--file PATH] [--max-excerpt-chars N] [-f json]
//!   reverie enhance [TEXT] [--file PATH] [--style NAME]
//!   reverie insert-answer --question Q --answer A [TEXT] [--file PATH]
//!   reverie reflect [TEXT] [--file PATH] [--style NAME] [-f json]

use anyhow::anyhow;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::ai::excerpt_tail;
use crate::cli::ui::Output;
use crate::cli::util::{AssistantContext, read_input, require_min_chars, require_non_blank};
use crate::types::{ErrorCategory, ReverieError};

/// Which operation failed, for the user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiAction {
    Questions,
    Enhance,
    InsertAnswer,
    Reflect,
}

impl AiAction {
    fn failure(&self) -> &'static str {
        match self {
            AiAction::Questions => "Failed to generate questions",
            AiAction::Enhance => "Failed to enhance entry",
            AiAction::InsertAnswer => "Failed to insert answer",
            AiAction::Reflect => "Failed to reflect on entry",
        }
    }
}

/// Shared input options
#[derive(Debug, Clone, Default)]
pub struct EntryInput {
    pub text: Option<String>,
    pub file: Option<PathBuf>,
}

impl EntryInput {
    fn read(self) -> crate::types::Result<String> {
        read_input(self.text, self.file)
    }
}

/// Map an operation failure to a short message; the cause stays attached
pub fn describe_failure(action: AiAction, err: ReverieError) -> anyhow::Error {
    if let ReverieError::Validation(_) = err {
        return err.into();
    }

    let hint = match err.category() {
        ErrorCategory::Auth => Some("check the API key in GEMINI_API_KEY or provider.api_key"),
        ErrorCategory::Quota => Some("the provider quota is exhausted, try again later"),
        ErrorCategory::Timeout | ErrorCategory::Network => {
            Some("the provider could not be reached")
        }
        ErrorCategory::Config => Some("run 'reverie config show' to inspect the configuration"),
        _ => None,
    };

    let message = match hint {
        Some(hint) => format!("{} ({})", action.failure(), hint),
        None => action.failure().to_string(),
    };
    anyhow!(err).context(message)
}

fn runtime() -> anyhow::Result<Runtime> {
    Ok(Runtime::new()?)
}

/// Generate reflection questions from the tail of an entry
pub fn questions(
    input: EntryInput,
    max_excerpt_chars: usize,
    format: &str,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let action = AiAction::Questions;
    let text = input.read()?;
    let excerpt = excerpt_tail(text.trim(), max_excerpt_chars);
    require_min_chars(excerpt, "Entry excerpt too short")?;

    let context = AssistantContext::load(config_path).map_err(|e| describe_failure(action, e))?;
    debug!(excerpt_chars = excerpt.chars().count(), "Requesting questions");

    let questions = runtime()?
        .block_on(context.assistant.generate_questions(excerpt))
        .map_err(|e| describe_failure(action, e))?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&questions)?);
    } else {
        Output::new().questions(&questions);
    }
    Ok(())
}

/// Rewrite an entry for coherence in a writing style
pub fn enhance(
    input: EntryInput,
    style: Option<&str>,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let action = AiAction::Enhance;
    let content = input.read()?;
    require_min_chars(&content, "Content too short to enhance")?;

    let context = AssistantContext::load(config_path).map_err(|e| describe_failure(action, e))?;
    let enhanced = runtime()?
        .block_on(context.assistant.enhance_entry(&content, style))
        .map_err(|e| describe_failure(action, e))?;

    let output = Output::new();
    if enhanced.is_empty() {
        output.warning("The provider returned an empty entry");
    }
    output.text(&enhanced);
    Ok(())
}

/// Work a question and its answer into an entry
pub fn insert_answer(
    input: EntryInput,
    question: &str,
    answer: &str,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let action = AiAction::InsertAnswer;
    require_non_blank(question, "Question")?;
    require_non_blank(answer, "Answer")?;
    let original = input.read()?;

    let context = AssistantContext::load(config_path).map_err(|e| describe_failure(action, e))?;
    let updated = runtime()?
        .block_on(context.assistant.insert_answer(&original, question, answer))
        .map_err(|e| describe_failure(action, e))?;

    Output::new().text(&updated);
    Ok(())
}

/// Enhance an entry, then ask questions about the result
pub fn reflect(
    input: EntryInput,
    style: Option<&str>,
    format: &str,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let action = AiAction::Reflect;
    let content = input.read()?;
    require_min_chars(&content, "Content too short to reflect on")?;

    let context = AssistantContext::load(config_path).map_err(|e| describe_failure(action, e))?;
    let reflection = runtime()?
        .block_on(context.assistant.reflect(&content, style))
        .map_err(|e| describe_failure(action, e))?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&reflection)?);
        return Ok(());
    }

    let output = Output::new();
    output.section("Enhanced entry");
    output.text(&reflection.enhanced);
    output.section("Questions");
    output.questions(&reflection.questions);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_validation_errors_pass_through_unwrapped() {
        let err = describe_failure(
            AiAction::Enhance,
            ReverieError::Validation("Content too short to enhance".to_string()),
        );
        assert_eq!(err.to_string(), "Invalid input: Content too short to enhance");
    }

    #[test]
    fn test_auth_failure_mentions_api_key() {
        let err = describe_failure(AiAction::Questions, ReverieError::http(403, "denied"));
        let message = err.to_string();
        assert!(message.starts_with("Failed to generate questions"));
        assert!(message.contains("API key"));
        assert!(format!("{:#}", err).contains("HTTP 403"));
    }

    #[test]
    fn test_timeout_failure_message() {
        let err = describe_failure(
            AiAction::InsertAnswer,
            ReverieError::timeout(Duration::from_secs(30)),
        );
        assert_eq!(
            err.to_string(),
            "Failed to insert answer (the provider could not be reached)"
        );
    }

    #[test]
    fn test_parse_failure_has_no_hint() {
        let err = describe_failure(AiAction::Reflect, ReverieError::ProviderUnexpectedFormat);
        assert_eq!(err.to_string(), "Failed to reflect on entry");
        assert!(err.downcast_ref::<ReverieError>().is_some());
    }

    #[test]
    fn test_short_excerpt_rejected_before_loading_config() {
        let input = EntryInput {
            text: Some("  tiny  ".to_string()),
            file: None,
        };
        let err = questions(input, 2000, "text", Some(Path::new("/nonexistent/config.toml")))
            .unwrap_err();
        assert!(err.to_string().contains("Entry excerpt too short"));
    }

    #[test]
    fn test_blank_answer_rejected() {
        let input = EntryInput {
            text: Some("A long enough journal entry.".to_string()),
            file: None,
        };
        let err = insert_answer(input, "What then?", "   ", None).unwrap_err();
        assert!(err.to_string().contains("Answer must not be blank"));
    }
}
