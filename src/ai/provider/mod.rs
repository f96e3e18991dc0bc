//! Generation Provider Abstraction
//!
//! Defines the [`GenerationTransport`] trait: one prompt in, one generated
//! text out, or a classified [`ReverieError`](crate::types::ReverieError).
//!
//! ## Modules
//!
//! - `gemini`: HTTPS transport for the Gemini `generateContent` endpoint

mod gemini;
#[cfg(test)]
pub(crate) mod mock;

pub use gemini::GeminiTransport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::PromptTemplate;
use crate::constants::provider as provider_constants;
use crate::types::Result;

// =============================================================================
// Generation Request
// =============================================================================

/// Sampling parameters for one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

impl SamplingParams {
    /// Temperature and output size from the template; nucleus/top-k fixed by policy
    pub fn from_template(template: &PromptTemplate) -> Self {
        Self {
            temperature: template.temperature as f32,
            max_output_tokens: template.max_output_tokens,
            top_p: provider_constants::TOP_P,
            top_k: provider_constants::TOP_K,
        }
    }
}

/// Fully substituted prompt plus sampling parameters, built fresh per call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub sampling: SamplingParams,
}

impl GenerationRequest {
    pub fn new(prompt: String, template: &PromptTemplate) -> Self {
        Self {
            prompt,
            sampling: SamplingParams::from_template(template),
        }
    }
}

/// Shared transport type for concurrent use by many assistant calls.
pub type SharedTransport = Arc<dyn GenerationTransport>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Connection settings for the generation provider
///
/// Note: the API key is never serialized and is redacted in debug output.
/// The transport converts it to `SecretString` internally.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider host, optionally with scheme (`https://` assumed)
    pub host: String,
    /// Model name
    pub model: String,
    /// API key; falls back to the GEMINI_API_KEY env var
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("host", &self.host)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            host: provider_constants::DEFAULT_HOST.to_string(),
            model: provider_constants::DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

// =============================================================================
// Transport Trait
// =============================================================================

/// Issues one generation request and normalizes the outcome
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    /// Send the request, returning the raw generated text
    async fn send(&self, request: &GenerationRequest) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}
