//! Configuration management for `embed.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [svg], [video], [date]
//! ├── error.rs       # ConfigError
//! └── mod.rs         # EmbedConfig (this file)
//! ```
//!
//! A missing config file is not an error: every section has defaults.
//! Unknown keys are reported and otherwise ignored.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{DateConfig, SvgConfig, VideoConfig};

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{debug, log};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "embed.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing embed.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Sanitizer edits
    pub svg: SvgConfig,

    /// Video embeds
    pub video: VideoConfig,

    /// Date range formatting
    pub date: DateConfig,
}

impl EmbedConfig {
    /// Load `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("config"; "{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let config = Self::from_path(path)?;
        config
            .validate()
            .with_context(|| format!("invalid config `{}`", path.display()))?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Validate semantic constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.date.validate()
    }
}
