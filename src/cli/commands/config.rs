//! Config Command
//!
//! Manage Reverie configuration.
//!
//! Usage:
//!   reverie config show [-f json]
//!   reverie config path
//!   reverie config init [-g] [--force]
//!   reverie config instructions <TEXT> [-g]

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::config_provider;
use crate::config::{ConfigLoader, ConfigProvider};
use crate::types::{ReverieError, Result};

/// Show the effective configuration (merged from all sources)
pub fn show(format: &str, config_path: Option<&Path>) -> Result<()> {
    let config = config_provider(config_path).current()?;
    ConfigLoader::show_config(&config, format == "json")
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Initialize global configuration
pub fn init_global(force: bool) -> Result<()> {
    let dir = ConfigLoader::init_global(force)?;
    let output = Output::new();
    output.success("Initialized global configuration");
    output.info(&format!("Directory: {}", dir.display()));
    if let Some(config_path) = ConfigLoader::global_config_path() {
        output.info(&format!("Config:    {}", config_path.display()));
    }
    Ok(())
}

/// Initialize project configuration
pub fn init_project(force: bool) -> Result<()> {
    let dir = ConfigLoader::init_project(force)?;
    let output = Output::new();
    output.success("Initialized project configuration");
    output.info(&format!("Directory: {}", dir.display()));
    output.info(&format!(
        "Config:    {}",
        ConfigLoader::project_config_path().display()
    ));
    Ok(())
}

/// Replace the custom instructions prepended to every prompt.
/// An empty text clears them.
pub fn instructions(text: &str, global: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::global_config_path().ok_or_else(|| {
            ReverieError::Config("Cannot determine global config directory".to_string())
        })?
    } else {
        ConfigLoader::project_config_path()
    };

    ConfigLoader::set_custom_instructions(&path, text)?;

    let output = Output::new();
    if text.trim().is_empty() {
        output.success("Cleared custom instructions");
    } else {
        output.success("Saved custom instructions");
    }
    output.info(&format!("Config: {}", path.display()));
    Ok(())
}
