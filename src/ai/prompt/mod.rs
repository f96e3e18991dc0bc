//! Prompt Template Engine
//!
//! Fills `{{name}}` placeholders in configured templates.
//!
//! ## Rules
//!
//! 1. Every placeholder in the template is replaced; a name without a value
//!    becomes the empty string, so no marker ever reaches the provider
//! 2. Variables the template never references are ignored
//! 3. Substitution is a single pass: placeholder-looking text inside a
//!    value is left alone
//! 4. `custom_instructions` is always filled from configuration as
//!    `prefix + text + "\n\n"`, or empty when no instructions are set

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ai::provider::GenerationRequest;
use crate::config::{CustomInstructions, PromptConfig};
use crate::types::{Operation, Result};

/// Name of the placeholder carrying the writer's custom instructions
pub const CUSTOM_INSTRUCTIONS_VAR: &str = "custom_instructions";

static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
        .expect("Failed to compile placeholder regex")
});

/// Named values for one render call
#[derive(Debug, Clone, Default)]
pub struct PromptVariables {
    values: HashMap<String, String>,
}

impl PromptVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable (builder style)
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Renders the templates of one configuration snapshot
#[derive(Debug, Clone, Copy)]
pub struct TemplateEngine<'a> {
    prompts: &'a PromptConfig,
}

impl<'a> TemplateEngine<'a> {
    pub fn new(prompts: &'a PromptConfig) -> Self {
        Self { prompts }
    }

    /// Render the template of `operation` with `variables`.
    ///
    /// Fails with `ReverieError::Config` when the operation has no template.
    pub fn render(&self, operation: Operation, variables: &PromptVariables) -> Result<String> {
        let template = self.prompts.template(operation)?;
        let custom = render_custom_instructions(&self.prompts.custom_instructions);

        Ok(substitute(&template.template, |name| {
            if name == CUSTOM_INSTRUCTIONS_VAR {
                custom.as_str()
            } else {
                variables.get(name).unwrap_or("")
            }
        }))
    }

    /// Render and pair the prompt with the template's sampling settings
    pub fn request(
        &self,
        operation: Operation,
        variables: &PromptVariables,
    ) -> Result<GenerationRequest> {
        let prompt = self.render(operation, variables)?;
        let template = self.prompts.template(operation)?;
        Ok(GenerationRequest::new(prompt, template))
    }
}

/// `prefix + text + "\n\n"` when instructions are set, otherwise empty
pub fn render_custom_instructions(custom: &CustomInstructions) -> String {
    if custom.is_set() {
        format!("{}{}\n\n", custom.prefix, custom.text)
    } else {
        String::new()
    }
}

/// Replace every placeholder in one pass
fn substitute<'v>(template: &str, lookup: impl Fn(&str) -> &'v str) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures<'_>| lookup(&caps[1]).to_string())
        .into_owned()
}

/// Trailing `max_chars` characters of `text`, split on a char boundary
pub fn excerpt_tail(text: &str, max_chars: usize) -> &str {
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }
    match text.char_indices().nth(total - max_chars) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}

/// Whether text still contains a placeholder marker
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(text)
}
