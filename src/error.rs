//! Error types.
//!
//! Configuration defects are reported when a provider table is built, never
//! lazily while rendering. Failing to resolve a URL is an expected outcome and
//! has its own type, [`Unresolved`].

use std::path::PathBuf;

use thiserror::Error;

/// A defect in a single provider definition.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("no URL patterns declared")]
    NoPatterns,

    #[error("invalid URL pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("render.{0} must be a map")]
    NotAMap(&'static str),

    #[error("render.sizeRatio is required when an iframe or object is rendered")]
    MissingSizeRatio,

    #[error("render.sizeRatio must be a positive number, got {0}")]
    InvalidSizeRatio(String),
}

/// Provider table construction and loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("provider #{index}: {source}")]
    Provider {
        index: usize,
        #[source]
        source: ProviderError,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Why [`EmbedSession::parse_url`](crate::EmbedSession::parse_url) produced
/// no resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    #[error("no URL set")]
    NoUrlSet,

    #[error("no provider matches {0}")]
    NoProviderMatch(String),
}
