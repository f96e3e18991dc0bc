pub mod error;

pub use error::{ErrorCategory, ErrorClassifier, ReverieError, Result};

// =============================================================================
// Domain Types
// =============================================================================

use std::fmt;

/// Generation operations, each backed by one prompt template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Reflection questions from an entry excerpt
    QuestionGeneration,
    /// Rewrite an entry for coherence
    EntryEnhancement,
    /// Work a question/answer pair into an entry
    QuestionInsertion,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Operation::QuestionGeneration,
        Operation::EntryEnhancement,
        Operation::QuestionInsertion,
    ];

    /// Key of this operation's template in the configuration store
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::QuestionGeneration => "question_generation",
            Operation::EntryEnhancement => "entry_enhancement",
            Operation::QuestionInsertion => "question_insertion",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown operation: {}. Valid values: question_generation, entry_enhancement, question_insertion",
                    s
                )
            })
    }
}
