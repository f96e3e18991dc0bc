//! Reverie - AI Reflection for a Personal Journal
//!
//! Generates reflection questions for journal entries and rewrites entries
//! for coherence using a hosted large language model.
//!
//! ## Core Features
//!
//! - **Prompt Templates**: `{{name}}` placeholders, custom instructions on every prompt
//! - **Resilient Transport**: fixed timeout, classified failures, exponential backoff
//! - **Tolerant Parsing**: JSON array, then question lines, then fallback questions
//! - **Live Configuration**: templates and instructions re-read on every call
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use reverie::{FileConfigProvider, GeminiTransport, JournalAssistant, ConfigProvider};
//!
//! let provider = Arc::new(FileConfigProvider::new());
//! let transport = GeminiTransport::new(provider.current()?.provider)?;
//! let assistant = JournalAssistant::new(Arc::new(transport), provider);
//! let questions = assistant.generate_questions("Walked to the harbour today.").await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: prompt engine, transport, retry policy, interpreter, assistant
//! - [`config`]: layered configuration and the config provider capability
//! - [`cli`]: command-line boundary

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{
    Config, ConfigLoader, ConfigProvider, CustomInstructions, FileConfigProvider, PromptConfig,
    PromptTemplate, StaticConfigProvider,
};

// Error Types
pub use types::{ErrorCategory, Operation, Result, ReverieError};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    GeminiTransport, GenerationRequest, GenerationTransport, JournalAssistant, QuestionList,
    Reflection, ResponseInterpreter, RetryPolicy, TemplateEngine,
};
