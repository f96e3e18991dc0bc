//! AI Integration Layer
//!
//! Generation pipeline for journal entries:
//! prompt rendering → retry → transport → response interpretation.

pub mod assistant;
pub mod interpreter;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod timeout;

pub use assistant::{JournalAssistant, Reflection};
pub use interpreter::{QuestionList, QuestionSource, ResponseInterpreter};
pub use prompt::{PromptVariables, TemplateEngine, excerpt_tail};
pub use provider::{
    GeminiTransport, GenerationRequest, GenerationTransport, ProviderConfig, SamplingParams,
    SharedTransport,
};
pub use retry::RetryPolicy;
pub use timeout::{default_request_timeout, with_timeout};
