// crates/podcast-feed/src/error.rs
//! Error types for feed generation

use std::path::PathBuf;
use thiserror::Error;

/// Result type for feed generator operations
pub type FeedResult<T> = Result<T, FeedError>;

/// Errors that can occur while building a podcast feed
#[derive(Debug, Error)]
pub enum FeedError {
    /// A publish date could not be parsed
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// A required field is absent after defaults were applied
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A field holds a value of the wrong shape
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// Serializing the document failed
    #[error("XML writing error: {0}")]
    XmlWrite(String),

    /// Failed to read a package config file
    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse package config
    #[error("Failed to parse config{}: {}", path_suffix(.path), .source)]
    ConfigParse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at {}", p.display()))
        .unwrap_or_default()
}

impl FeedError {
    /// Builds an [`FeedError::InvalidField`]
    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        FeedError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
