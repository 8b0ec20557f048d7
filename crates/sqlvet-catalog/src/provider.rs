//! Catalog provider trait

use crate::{AccessPolicy, StructuralLimits, TableMetadata};
use sqlvet_diagnostics::SqlvetError;
use sqlvet_types::FunctionSignature;
use std::path::PathBuf;

/// Source of table, function and policy metadata
///
/// Lookups are synchronous and case-insensitive. Implementations are shared
/// across validation passes and threads.
pub trait Catalog: Send + Sync {
    /// Look up a table by name, possibly schema-qualified (`sales.orders`)
    fn table(&self, name: &str) -> Option<&TableMetadata>;

    /// Look up a function signature by unqualified name
    fn function(&self, name: &str) -> Option<&FunctionSignature>;

    /// Column and function access policy
    fn access_policy(&self) -> &AccessPolicy;

    /// Structural limits on query size
    fn limits(&self) -> &StructuralLimits;
}

/// Catalog loading error
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("table '{0}' is defined more than once")]
    DuplicateTable(String),

    #[error("column '{column}' is defined more than once in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    #[error("invalid denied column '{0}', expected 'table.column'")]
    InvalidDeniedColumn(String),
}

impl From<CatalogError> for SqlvetError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Io { path, source } => SqlvetError::io(path, source),
            CatalogError::Json(source) => SqlvetError::json("catalog document", source),
            other => SqlvetError::catalog(other.to_string()),
        }
    }
}
