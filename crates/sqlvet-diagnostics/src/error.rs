//! Operational error type
//!
//! Semantic findings are never errors; they are reported as
//! [`ValidationProblem`](crate::ValidationProblem)s. `SqlvetError` covers the
//! failures around a validation pass: unreadable or malformed inputs.

use std::path::PathBuf;
use thiserror::Error;

/// Main sqlvet error type
#[derive(Debug, Error)]
pub enum SqlvetError {
    /// A file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be decoded
    #[error("invalid {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Catalog contents are inconsistent
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Validation configuration is inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    /// A diagnostic code name could not be parsed
    #[error("unknown problem code '{0}'")]
    UnknownProblemCode(String),
}

impl SqlvetError {
    /// Create an I/O error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a JSON decoding error
    pub fn json(what: &'static str, source: serde_json::Error) -> Self {
        Self::Json { what, source }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
