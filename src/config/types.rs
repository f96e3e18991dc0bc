//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Prompt templates, custom instructions and fallback questions live in a
//! single store keyed by operation name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ai::provider::ProviderConfig;
use crate::types::{Operation, ReverieError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Generation provider settings
    pub provider: ProviderConfig,

    /// Prompt templates and custom instructions
    pub prompts: PromptConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            provider: ProviderConfig::default(),
            prompts: PromptConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ReverieError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.provider.host.trim().is_empty() {
            return Err(ReverieError::Config(
                "provider.host must not be empty".to_string(),
            ));
        }

        if self.provider.model.trim().is_empty() {
            return Err(ReverieError::Config(
                "provider.model must not be empty".to_string(),
            ));
        }

        for (name, template) in &self.prompts.templates {
            if template.template.trim().is_empty() {
                return Err(ReverieError::Config(format!(
                    "Template '{}' must not be empty",
                    name
                )));
            }

            if !(0.0..=2.0).contains(&template.temperature) {
                return Err(ReverieError::Config(format!(
                    "Template '{}' temperature must be between 0.0 and 2.0, got {}",
                    name, template.temperature
                )));
            }

            if template.max_output_tokens == 0 {
                return Err(ReverieError::Config(format!(
                    "Template '{}' max_output_tokens must be greater than 0",
                    name
                )));
            }
        }

        if self.prompts.fallback_questions.is_empty() {
            return Err(ReverieError::Config(
                "prompts.fallback_questions must contain at least one question".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Prompt Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Writing style used when the caller does not name one
    pub default_writing_style: String,

    /// Generic questions returned when a reply yields none
    pub fallback_questions: Vec<String>,

    /// User-editable directive prepended to every prompt
    pub custom_instructions: CustomInstructions,

    /// Templates keyed by operation name (`question_generation`, ...)
    pub templates: BTreeMap<String, PromptTemplate>,
}

impl PromptConfig {
    /// Look up the template for an operation
    pub fn template(&self, operation: Operation) -> Result<&PromptTemplate> {
        self.templates.get(operation.as_str()).ok_or_else(|| {
            ReverieError::Config(format!("No prompt template configured for '{}'", operation))
        })
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        let mut templates = BTreeMap::new();
        templates.insert(
            Operation::QuestionGeneration.as_str().to_string(),
            PromptTemplate::new(QUESTION_GENERATION_TEMPLATE, 0.7, 200),
        );
        templates.insert(
            Operation::EntryEnhancement.as_str().to_string(),
            PromptTemplate::new(ENTRY_ENHANCEMENT_TEMPLATE, 0.5, 2048)
                .with_styles(default_writing_styles()),
        );
        templates.insert(
            Operation::QuestionInsertion.as_str().to_string(),
            PromptTemplate::new(QUESTION_INSERTION_TEMPLATE, 0.5, 2048),
        );

        Self {
            default_writing_style: "natural".to_string(),
            fallback_questions: vec![
                "How did that make you feel?".to_string(),
                "What details stand out to you about that moment?".to_string(),
            ],
            custom_instructions: CustomInstructions::default(),
            templates,
        }
    }
}

/// Free-text directive from the writer plus the fixed prefix it is rendered with
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomInstructions {
    pub prefix: String,
    pub text: String,
}

impl CustomInstructions {
    /// Whether there is anything to render
    pub fn is_set(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

impl Default for CustomInstructions {
    fn default() -> Self {
        Self {
            prefix: "Follow these personal instructions from the writer: ".to_string(),
            text: String::new(),
        }
    }
}

/// A template string with its sampling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub template: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    /// Writing style name → descriptor (enhancement only)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<String, String>,
}

impl PromptTemplate {
    pub fn new(template: &str, temperature: f64, max_output_tokens: u32) -> Self {
        Self {
            template: template.to_string(),
            temperature,
            max_output_tokens,
            styles: BTreeMap::new(),
        }
    }

    pub fn with_styles(mut self, styles: BTreeMap<String, String>) -> Self {
        self.styles = styles;
        self
    }

    /// Descriptor for a style name; unknown names yield an empty descriptor
    pub fn style_descriptor(&self, style: &str) -> &str {
        self.styles.get(style).map(String::as_str).unwrap_or("")
    }
}

// =============================================================================
// Default Templates
// =============================================================================

const QUESTION_GENERATION_TEMPLATE: &str = r#"{{custom_instructions}}Based on this journal entry excerpt, generate 2-3 thoughtful, empathetic questions to help the writer reflect deeper or add more detail. Focus on emotions, details, and thoughts. The questions should feel natural and conversational. Return ONLY a valid JSON array of question strings, nothing else.

Entry excerpt: "{{excerpt}}"

Example format: ["How did that make you feel?", "What specific details stand out to you about that moment?"]"#;

const ENTRY_ENHANCEMENT_TEMPLATE: &str = r#"{{custom_instructions}}Rewrite this journal entry to be more coherent, well-structured, and polished while maintaining the author's authentic voice, tone, emotional content, and all important details. Do not change the meaning or add information that wasn't there. Keep the same perspective (first person) and tense.
{{style}}
Return ONLY the enhanced entry text, nothing else.

Original entry: "{{content}}""#;

const QUESTION_INSERTION_TEMPLATE: &str = r#"{{custom_instructions}}The writer was asked: "{{question}}"
They answered: "{{answer}}"

Integrate this answer naturally into the journal entry below. Maintain the flow, voice, tense and perspective of the entry and keep everything already written. Return ONLY the updated entry text, nothing else.

Journal entry:
{{original_entry}}"#;

fn default_writing_styles() -> BTreeMap<String, String> {
    [
        (
            "natural",
            "Style: keep the wording natural and conversational, close to how the writer speaks.",
        ),
        (
            "concise",
            "Style: tighten the prose, remove repetition and filler, keep sentences short.",
        ),
        (
            "descriptive",
            "Style: bring out sensory detail and atmosphere already present in the entry.",
        ),
        (
            "reflective",
            "Style: favor a calm, introspective tone that lingers on thoughts and feelings.",
        ),
    ]
    .into_iter()
    .map(|(name, descriptor)| (name.to_string(), descriptor.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        for op in Operation::ALL {
            assert!(config.prompts.template(op).is_ok());
        }
    }

    #[test]
    fn test_default_sampling_settings() {
        let prompts = PromptConfig::default();
        let questions = prompts.template(Operation::QuestionGeneration).unwrap();
        assert_eq!(questions.temperature, 0.7);
        assert_eq!(questions.max_output_tokens, 200);

        let enhance = prompts.template(Operation::EntryEnhancement).unwrap();
        assert_eq!(enhance.temperature, 0.5);
        assert_eq!(enhance.max_output_tokens, 2048);
        assert!(enhance.styles.contains_key("natural"));
    }

    #[test]
    fn test_missing_template_is_config_error() {
        let mut prompts = PromptConfig::default();
        prompts.templates.remove("question_insertion");
        let err = prompts.template(Operation::QuestionInsertion).unwrap_err();
        assert!(matches!(err, ReverieError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_temperature() {
        let mut config = Config::default();
        if let Some(template) = config.prompts.templates.get_mut("entry_enhancement") {
            template.temperature = 3.5;
        }
        assert!(matches!(config.validate(), Err(ReverieError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_fallback() {
        let mut config = Config::default();
        config.prompts.fallback_questions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_style_descriptor_is_empty() {
        let prompts = PromptConfig::default();
        let enhance = prompts.template(Operation::EntryEnhancement).unwrap();
        assert_eq!(enhance.style_descriptor("baroque"), "");
        assert!(!enhance.style_descriptor("concise").is_empty());
    }

    #[test]
    fn test_custom_instructions_blank_is_unset() {
        let mut custom = CustomInstructions::default();
        assert!(!custom.is_set());
        custom.text = "   \n".to_string();
        assert!(!custom.is_set());
        custom.text = "Write in British English.".to_string();
        assert!(custom.is_set());
    }
}
