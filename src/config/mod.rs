//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/reverie/config.toml)
//! 3. Project config (.reverie/config.toml)
//! 4. Environment variables (REVERIE_*)

mod loader;
mod provider;
mod types;

pub use loader::ConfigLoader;
pub use provider::{ConfigProvider, FileConfigProvider, StaticConfigProvider};
pub use types::*;
