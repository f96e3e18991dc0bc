//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/reverie/config.toml)
//! 3. Project config (.reverie/config.toml)
//! 4. Environment variables (REVERIE_* prefix, `__` between levels)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{ReverieError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_layered(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Load configuration from explicit global and project files.
    /// Files that do not exist are skipped.
    pub fn load_layered(global: Option<&Path>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // REVERIE_PROVIDER__MODEL -> provider.model
        figment = figment.merge(Env::prefixed("REVERIE_").split("__").lowercase(true));

        let config: Config = figment.extract()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/reverie/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("reverie"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".reverie")
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Print an effective configuration (the API key is never serialized)
    pub fn show_config(config: &Config, as_json: bool) -> Result<()> {
        if as_json {
            println!("{}", serde_json::to_string_pretty(config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(config).map_err(|e| ReverieError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    /// Store the writer's custom instructions in a config file.
    ///
    /// Other keys already present in the file are kept as they are.
    pub fn set_custom_instructions(path: &Path, text: &str) -> Result<()> {
        let mut table = if path.exists() {
            let content = fs::read_to_string(path)?;
            content.parse::<toml::Table>().map_err(|e| {
                ReverieError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            toml::Table::new()
        };

        let prompts = child_table(&mut table, "prompts", path)?;
        let custom = child_table(prompts, "custom_instructions", path)?;
        custom.insert(
            "text".to_string(),
            toml::Value::String(text.trim().to_string()),
        );

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let rendered =
            toml::to_string_pretty(&table).map_err(|e| ReverieError::Config(e.to_string()))?;
        fs::write(path, rendered)?;
        info!("Updated custom instructions in {}", path.display());

        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            ReverieError::Config("Cannot determine global config directory".to_string())
        })?;

        Self::write_default_config(&global_dir.join("config.toml"), force)?;
        Ok(global_dir)
    }

    /// Initialize project configuration
    pub fn init_project(force: bool) -> Result<PathBuf> {
        let project_dir = Self::project_dir();
        Self::write_default_config(&project_dir.join("config.toml"), force)?;
        Ok(project_dir)
    }

    /// Write the full default configuration, so templates can be edited in place
    pub fn write_default_config(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let body = toml::to_string_pretty(&Config::default())
            .map_err(|e| ReverieError::Config(e.to_string()))?;
        fs::write(
            path,
            format!(
                "# Reverie Configuration\n# The API key is read from GEMINI_API_KEY unless provider.api_key is set.\n\n{}",
                body
            ),
        )?;
        info!("Created config: {}", path.display());

        Ok(true)
    }
}

/// Get or create a nested table, failing if the key holds a non-table value
fn child_table<'a>(
    table: &'a mut toml::Table,
    key: &str,
    path: &Path,
) -> Result<&'a mut toml::Table> {
    table
        .entry(key.to_string())
        .or_insert_with(|| toml::Value::Table(toml::Table::new()))
        .as_table_mut()
        .ok_or_else(|| {
            ReverieError::Config(format!(
                "'{}' in {} is not a table",
                key,
                path.display()
            ))
        })
}
