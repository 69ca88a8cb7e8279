//! # Configuration Loader
//!
//! ## Responsibilities
//!
//! - Read the TOML configuration file
//! - Parse TOML into the AppConfig DTO
//! - Report I/O and parsing errors with context
//!
//! ## Prohibited
//!
//! No validation, no default values, no business rules. Those live in
//! [`RuntimeSettings::resolve`](super::settings::RuntimeSettings::resolve).

use std::path::Path;

use anyhow::Context;
use fw_core::config::AppConfig;

/// Load configuration from a TOML file.
///
/// Pure data loading: empty strings and zeros are accepted as they are.
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML.
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}
