//! Journal Assistant
//!
//! Facade over the generation pipeline. Each operation:
//!
//! 1. reads the current configuration once from the [`ConfigProvider`]
//! 2. renders the operation's template
//! 3. sends it through the [`RetryPolicy`] and transport
//! 4. interprets the reply (text or question list)
//!
//! Entry text is never recorded in spans or log fields.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::interpreter::{QuestionList, ResponseInterpreter};
use super::prompt::{PromptVariables, TemplateEngine, excerpt_tail};
use super::provider::{GenerationTransport, SharedTransport};
use super::retry::RetryPolicy;
use crate::config::{Config, ConfigProvider};
use crate::constants::input as input_constants;
use crate::types::{Operation, Result};

/// Enhanced entry plus questions generated from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reflection {
    pub enhanced: String,
    pub questions: QuestionList,
}

pub struct JournalAssistant {
    transport: SharedTransport,
    config_provider: Arc<dyn ConfigProvider>,
    retry: RetryPolicy,
}

impl JournalAssistant {
    pub fn new(transport: SharedTransport, config_provider: Arc<dyn ConfigProvider>) -> Self {
        Self {
            transport,
            config_provider,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn transport(&self) -> &dyn GenerationTransport {
        self.transport.as_ref()
    }

    /// Reflection questions for an entry excerpt.
    ///
    /// Callers validate the excerpt length; a malformed reply degrades to
    /// the configured fallback questions instead of failing.
    #[instrument(skip(self, excerpt), fields(excerpt_chars = excerpt.chars().count()))]
    pub async fn generate_questions(&self, excerpt: &str) -> Result<QuestionList> {
        let config = self.config_provider.current()?;
        let variables = PromptVariables::new().with("excerpt", excerpt);
        let raw = self
            .complete(&config, Operation::QuestionGeneration, &variables)
            .await?;

        let interpreter = ResponseInterpreter::new(config.prompts.fallback_questions);
        let questions = interpreter.questions(&raw);
        info!(count = questions.len(), "Generated reflection questions");
        Ok(questions)
    }

    /// Rewrite an entry in the given writing style (`None` = configured default).
    /// Unknown style names render an empty style descriptor.
    #[instrument(skip(self, content), fields(content_chars = content.chars().count()))]
    pub async fn enhance_entry(&self, content: &str, writing_style: Option<&str>) -> Result<String> {
        let config = self.config_provider.current()?;
        let style = writing_style.unwrap_or(config.prompts.default_writing_style.as_str());
        let descriptor = config
            .prompts
            .template(Operation::EntryEnhancement)?
            .style_descriptor(style);
        if descriptor.is_empty() {
            debug!(style, "No descriptor for writing style");
        }

        let variables = PromptVariables::new()
            .with("content", content)
            .with("style", descriptor);
        let raw = self
            .complete(&config, Operation::EntryEnhancement, &variables)
            .await?;

        Ok(ResponseInterpreter::new(Vec::new()).text(&raw))
    }

    /// Work a question and its answer into the entry
    #[instrument(skip_all)]
    pub async fn insert_answer(
        &self,
        original_entry: &str,
        question: &str,
        answer: &str,
    ) -> Result<String> {
        let config = self.config_provider.current()?;
        let variables = PromptVariables::new()
            .with("original_entry", original_entry)
            .with("question", question)
            .with("answer", answer);
        let raw = self
            .complete(&config, Operation::QuestionInsertion, &variables)
            .await?;

        Ok(ResponseInterpreter::new(Vec::new()).text(&raw))
    }

    /// Enhance, then ask questions about the enhanced text.
    /// Falls back to the original text for the questions if enhancement came back empty.
    #[instrument(skip(self, content))]
    pub async fn reflect(&self, content: &str, writing_style: Option<&str>) -> Result<Reflection> {
        let enhanced = self.enhance_entry(content, writing_style).await?;
        let source = if enhanced.is_empty() { content } else { &enhanced };
        let excerpt = excerpt_tail(source, input_constants::DEFAULT_EXCERPT_CHARS);
        let questions = self.generate_questions(excerpt).await?;

        Ok(Reflection {
            enhanced,
            questions,
        })
    }

    async fn complete(
        &self,
        config: &Config,
        operation: Operation,
        variables: &PromptVariables,
    ) -> Result<String> {
        let request = TemplateEngine::new(&config.prompts).request(operation, variables)?;
        debug!(
            %operation,
            provider = self.transport.name(),
            model = self.transport.model(),
            prompt_chars = request.prompt.len(),
            "Sending generation request"
        );

        self.retry
            .execute(|| self.transport.send(&request))
            .await
    }
}
