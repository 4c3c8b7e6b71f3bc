//! Error types for config loading and binding.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by a load call. Every variant aborts the whole load.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read or parsed.
    #[error("config file load error: {}: {source}", .path.display())]
    FileLoad {
        path: PathBuf,
        #[source]
        source: FileLoadError,
    },
    /// The environment snapshot could not be applied.
    #[error("config env load error: {0}")]
    EnvLoad(#[from] EnvLoadError),
    /// The merged config could not be bound into the destination.
    #[error("config unmarshal error: {0}")]
    Unmarshal(#[from] UnmarshalError),
}

impl ConfigError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: impl Into<FileLoadError>) -> Self {
        Self::FileLoad {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Causes of a failed file load.
#[derive(Debug, Error)]
pub enum FileLoadError {
    /// The file extension does not map to a known parser.
    #[error("unknown file type: {0}")]
    UnsupportedFormat(String),
    /// Reading the file failed.
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    /// JSON content failed to parse.
    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    /// YAML content failed to parse.
    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The document root is not a mapping.
    #[error("config root must be a mapping, found {0}")]
    NotAMapping(&'static str),
    /// A YAML mapping key that cannot be used as a key segment.
    #[error("unsupported mapping key: {0}")]
    UnsupportedKey(String),
}

impl FileLoadError {
    /// True when the file was read but its content could not be decoded.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            Self::Json(_) | Self::Yaml(_) | Self::NotAMapping(_) | Self::UnsupportedKey(_)
        )
    }
}

/// Causes of a failed environment load.
#[derive(Debug, Error)]
pub enum EnvLoadError {
    /// A variable matching the prefix has a non-Unicode name or value.
    #[error("environment variable is not valid unicode: {name}")]
    NotUnicode { name: String },
}

/// Errors raised while binding merged values into a destination.
#[derive(Debug, Error)]
pub enum UnmarshalError {
    /// The value kind cannot be bound into the destination type.
    #[error("expected {expected} at '{path}', found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A scalar failed to parse into the destination type.
    #[error("invalid {expected} at '{path}': {source}")]
    InvalidScalar {
        path: String,
        expected: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A number does not fit the destination type.
    #[error("value at '{path}' is out of range for {expected}")]
    OutOfRange { path: String, expected: &'static str },
    /// Serde deserialization of the subtree failed.
    #[error("failed to decode config: {0}")]
    Deserialize(#[from] serde_json::Error),
}
