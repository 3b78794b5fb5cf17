//! Provider tables loaded from TOML or JSON.
//!
//! The default location is `~/.config/media-embed/providers.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ProviderConfig, ProviderTable};
use crate::error::{ConfigError, Result};

/// Top-level provider table file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersFile {
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl ProviderTable {
    /// Parse a `[[providers]]` TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ProvidersFile = toml::from_str(content)?;
        Self::new(file.providers)
    }

    /// Parse a JSON provider list: a bare array or `{"providers": [...]}`.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let configs = if content.trim_start().starts_with('[') {
            serde_json::from_str::<Vec<ProviderConfig>>(content)?
        } else {
            serde_json::from_str::<ProvidersFile>(content)?.providers
        };
        Self::new(configs)
    }

    /// Load a table from disk. Files ending in `.json` are read as JSON,
    /// everything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("Loading providers from {}", path.display());
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Load the table from [`config_path`].
    ///
    /// Returns an empty table if the file doesn't exist.
    pub fn load_default() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::debug!("No provider table at {}", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

/// Return the path to the default provider table.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("media-embed")
        .join("providers.toml")
}
