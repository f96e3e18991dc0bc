//! Unified Error Type System
//!
//! Centralized error types for the whole crate.
//! Provides failure classification for retry decisions.
//!
//! ## Error Categories
//!
//! - **Auth**: API key or permission failures (fail fast)
//! - **Quota**: Provider quota exhausted (fail fast)
//! - **BadRequest**: Provider rejected the request (fail fast)
//! - **Timeout / Network / Transient / ParseError**: retry with backoff
//! - **Config / Validation**: local problems, never retried
//!
//! Classification happens once, when the transport constructs the error.
//! Everything downstream reads [`ReverieError::category`].

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories used for retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid or missing API key, permission denied
    Auth,
    /// Quota or resource exhaustion reported by the provider
    Quota,
    /// Provider rejected the request as malformed
    BadRequest,
    /// Request exceeded the transport deadline
    Timeout,
    /// Connection-level failure (DNS, reset, refused)
    Network,
    /// Server-side problem that may resolve on its own
    Transient,
    /// Success-shaped response that could not be used
    ParseError,
    /// Missing template or invalid configuration
    Config,
    /// Caller input rejected at the boundary
    Validation,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "AUTH"),
            Self::Quota => write!(f, "QUOTA"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Network => write!(f, "NETWORK"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Config => write!(f, "CONFIG"),
            Self::Validation => write!(f, "VALIDATION"),
        }
    }
}

impl ErrorCategory {
    /// Check if this category may succeed on another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Network | Self::Transient | Self::ParseError
        )
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw provider signals (messages, status codes) to categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an explicit error message reported by the provider
    pub fn classify_message(message: &str) -> ErrorCategory {
        let lower = message.to_lowercase();

        if lower.contains("api key")
            || lower.contains("api_key")
            || lower.contains("invalid key")
            || lower.contains("unauthenticated")
            || lower.contains("unauthorized")
            || lower.contains("permission denied")
            || lower.contains("permission_denied")
        {
            return ErrorCategory::Auth;
        }

        if lower.contains("quota")
            || lower.contains("resource exhausted")
            || lower.contains("resource_exhausted")
        {
            return ErrorCategory::Quota;
        }

        ErrorCategory::Transient
    }

    /// Classify a non-2xx HTTP status
    pub fn classify_http_status(status: u16) -> ErrorCategory {
        match status {
            400 => ErrorCategory::BadRequest,
            401 | 403 => ErrorCategory::Auth,
            _ => ErrorCategory::Transient,
        }
    }

    /// Classify a non-2xx reply from its status and body.
    ///
    /// Statuses that look transient (429, 5xx) defer to the body when it names
    /// a key or quota problem: Gemini reports quota exhaustion as a 429 with a
    /// `RESOURCE_EXHAUSTED` payload.
    pub fn classify_http(status: u16, body: &str) -> ErrorCategory {
        match Self::classify_http_status(status) {
            ErrorCategory::Transient => match Self::classify_message(body) {
                category @ (ErrorCategory::Auth | ErrorCategory::Quota) => category,
                _ => ErrorCategory::Transient,
            },
            category => category,
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ReverieError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Provider Errors
    // -------------------------------------------------------------------------
    #[error("Provider timed out after {duration:?}")]
    ProviderTimeout { duration: Duration },

    #[error("Provider returned HTTP {status}: {body}")]
    ProviderHttp {
        status: u16,
        body: String,
        category: ErrorCategory,
    },

    #[error("Provider returned an empty response")]
    ProviderEmptyResponse,

    #[error("Failed to parse provider response: {0}")]
    ProviderParse(String),

    #[error("Unexpected response format from provider")]
    ProviderUnexpectedFormat,

    /// Explicit error reported by the provider
    #[error("Provider error [{category}]: {message}")]
    Provider {
        message: String,
        category: ErrorCategory,
    },

    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Local Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ReverieError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl ReverieError {
    /// Create a timeout error
    pub fn timeout(duration: Duration) -> Self {
        Self::ProviderTimeout { duration }
    }

    /// Create an HTTP status error, classifying the status and body
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let category = ErrorClassifier::classify_http(status, &body);
        Self::ProviderHttp {
            status,
            body,
            category,
        }
    }

    /// Create an explicit provider error, classifying the message
    pub fn provider(message: impl Into<String>) -> Self {
        let message = message.into();
        let category = ErrorClassifier::classify_message(&message);
        Self::Provider { message, category }
    }

    /// Category used for retry decisions
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ProviderTimeout { .. } => ErrorCategory::Timeout,
            Self::ProviderHttp { category, .. } | Self::Provider { category, .. } => *category,
            Self::ProviderEmptyResponse
            | Self::ProviderParse(_)
            | Self::ProviderUnexpectedFormat => ErrorCategory::ParseError,
            Self::Network(_) => ErrorCategory::Network,
            Self::Config(_) => ErrorCategory::Config,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Io(_) | Self::Json(_) => ErrorCategory::Config,
        }
    }

    /// Check if another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<reqwest::Error> for ReverieError {
    fn from(err: reqwest::Error) -> Self {
        ReverieError::Network(err.to_string())
    }
}

impl From<figment::Error> for ReverieError {
    fn from(err: figment::Error) -> Self {
        ReverieError::Config(format!("Configuration error: {}", err))
    }
}

// =============================================================================
// Tests
// =============================================================================
