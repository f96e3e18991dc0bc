//! CLI Common Utilities
//!
//! Input reading, boundary validation and assistant construction shared by
//! the AI commands.

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ai::{GeminiTransport, JournalAssistant};
use crate::config::{Config, ConfigProvider, FileConfigProvider};
use crate::constants::input as input_constants;
use crate::types::{ReverieError, Result};

/// Command execution context
///
/// Holds the configuration snapshot used to build the transport and the
/// assistant itself, which re-reads configuration on every operation.
pub struct AssistantContext {
    pub config: Config,
    pub assistant: JournalAssistant,
}

impl AssistantContext {
    /// Load configuration (explicit file or the layered chain) and build the assistant
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let provider: Arc<dyn ConfigProvider> = Arc::new(config_provider(config_path));
        let config = provider.current()?;
        let transport = GeminiTransport::new(config.provider.clone())?;
        let assistant = JournalAssistant::new(Arc::new(transport), provider);

        Ok(Self { config, assistant })
    }
}

/// File provider for an explicit path, or the global → project → env chain
pub fn config_provider(config_path: Option<&Path>) -> FileConfigProvider {
    match config_path {
        Some(path) => FileConfigProvider::from_file(path),
        None => FileConfigProvider::new(),
    }
}

/// Entry text from the positional argument, `--file`, or piped stdin
pub fn read_input(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    if let Some(path) = file {
        return std::fs::read_to_string(&path).map_err(|e| {
            ReverieError::Validation(format!("Cannot read {}: {}", path.display(), e))
        });
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(ReverieError::Validation(
            "No entry text given. Pass TEXT, --file PATH, or pipe it on stdin".to_string(),
        ));
    }

    let mut buffer = String::new();
    stdin.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Reject text whose trimmed length is under the minimum
pub fn require_min_chars(text: &str, message: &str) -> Result<()> {
    if text.trim().chars().count() < input_constants::MIN_INPUT_CHARS {
        return Err(ReverieError::Validation(format!(
            "{} (at least {} characters)",
            message,
            input_constants::MIN_INPUT_CHARS
        )));
    }
    Ok(())
}

pub fn require_non_blank(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ReverieError::Validation(format!("{} must not be blank", name)));
    }
    Ok(())
}
