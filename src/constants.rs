//! Global Constants
//!
//! Centralized constants for the generation pipeline.
//! All magic numbers should be defined here with documentation.

/// Generation provider constants
pub mod provider {
    /// Default provider host (scheme optional, `https` assumed)
    pub const DEFAULT_HOST: &str = "generativelanguage.googleapis.com";

    /// Default model name
    pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

    /// Environment variable consulted when no API key is configured
    pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

    /// Header carrying the API key
    pub const API_KEY_HEADER: &str = "x-goog-api-key";

    /// Fixed request timeout (seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Nucleus sampling parameter, fixed by policy
    pub const TOP_P: f32 = 0.95;

    /// Top-k sampling parameter, fixed by policy
    pub const TOP_K: u32 = 40;
}

/// Retry policy constants
pub mod retry {
    /// Additional attempts after the first one
    pub const MAX_RETRIES: usize = 2;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 1_000;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;
}

/// Response interpretation constants
pub mod interpreter {
    /// Upper bound on returned reflection questions
    pub const MAX_QUESTIONS: usize = 3;
}

/// Boundary (CLI) input constants
pub mod input {
    /// Minimum trimmed length of text sent for questions or enhancement
    pub const MIN_INPUT_CHARS: usize = 10;

    /// Default length of the trailing excerpt used for question generation
    pub const DEFAULT_EXCERPT_CHARS: usize = 2_000;
}
