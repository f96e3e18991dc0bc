//! Configuration capability handed to the assistant.
//!
//! The assistant asks for the current configuration once per operation, so
//! edits to custom instructions or templates apply to the next call without
//! a restart. Whether a provider caches is its own business.

use std::path::PathBuf;

use tracing::debug;

use super::loader::ConfigLoader;
use super::types::Config;
use crate::types::Result;

/// Source of the configuration snapshot used by one operation.
///
/// `current` is synchronous and may block on file reads. The assistant calls
/// it once per operation, before the first `.await`, which is fine for a CLI
/// driving a single request at a time.
pub trait ConfigProvider: Send + Sync {
    fn current(&self) -> Result<Config>;
}

/// Re-reads configuration files on every call, with blocking `std::fs` reads
#[derive(Debug, Clone, Default)]
pub struct FileConfigProvider {
    /// Explicit file; `None` uses the global → project → env chain
    path: Option<PathBuf>,
}

impl FileConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

impl ConfigProvider for FileConfigProvider {
    fn current(&self) -> Result<Config> {
        match &self.path {
            Some(path) => {
                debug!("Reloading config from {}", path.display());
                ConfigLoader::load_from_file(path)
            }
            None => ConfigLoader::load(),
        }
    }
}

/// Fixed snapshot, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: Config,
}

impl StaticConfigProvider {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn current(&self) -> Result<Config> {
        Ok(self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_provider_sees_edits_between_calls() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        let provider = FileConfigProvider::from_file(&path);
        assert!(!provider.current().unwrap().prompts.custom_instructions.is_set());

        ConfigLoader::set_custom_instructions(&path, "Keep it gentle.").unwrap();
        let config = provider.current().unwrap();
        assert_eq!(config.prompts.custom_instructions.text, "Keep it gentle.");
    }

    #[test]
    fn test_static_provider_returns_snapshot() {
        let mut config = Config::default();
        config.prompts.default_writing_style = "poetic".to_string();

        let provider = StaticConfigProvider::new(config);
        assert_eq!(
            provider.current().unwrap().prompts.default_writing_style,
            "poetic"
        );
    }
}
