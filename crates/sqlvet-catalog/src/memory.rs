//! In-memory catalog

use crate::{
    AccessPolicy, Catalog, CatalogError, StructuralLimits, TableMetadata, standard_functions,
};
use indexmap::IndexMap;
use serde::Deserialize;
use sqlvet_types::{DbType, FunctionSignature};
use std::collections::HashMap;
use std::path::Path;

/// Catalog held entirely in memory
///
/// Tables are registered under their full case-folded name. A schema-qualified
/// table is also reachable by its unqualified name while that name is unique.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    tables: IndexMap<String, TableMetadata>,
    short_names: HashMap<String, Option<String>>,
    functions: HashMap<String, FunctionSignature>,
    access_policy: AccessPolicy,
    limits: StructuralLimits,
}

impl InMemoryCatalog {
    /// Create an empty catalog with no functions
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty catalog preloaded with the standard functions
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for f in standard_functions() {
            catalog.add_function(f);
        }
        catalog
    }

    /// Add a table (builder form); a table with the same name is replaced
    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.add_table(table);
        self
    }

    pub fn with_function(mut self, function: FunctionSignature) -> Self {
        self.add_function(function);
        self
    }

    pub fn with_access_policy(mut self, policy: AccessPolicy) -> Self {
        self.access_policy = policy;
        self
    }

    pub fn with_limits(mut self, limits: StructuralLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Register a table; returns false if it replaced an existing one
    pub fn add_table(&mut self, table: TableMetadata) -> bool {
        let full = table.normalized_name();
        let short = table.short_name();
        if short != full {
            self.short_names
                .entry(short)
                .and_modify(|existing| {
                    if existing.as_deref() != Some(full.as_str()) {
                        *existing = None;
                    }
                })
                .or_insert_with(|| Some(full.clone()));
        }
        self.tables.insert(full, table).is_none()
    }

    /// Register a function under its case-folded name
    pub fn add_function(&mut self, mut function: FunctionSignature) {
        function.name = function.name.to_lowercase();
        self.functions.insert(function.name.clone(), function);
    }

    /// Number of registered tables
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Load a catalog from a JSON document
    ///
    /// ```json
    /// {
    ///   "tables": [{"name": "sales.orders", "columns": [{"name": "id", "type": "bigint"}]}],
    ///   "functions": [],
    ///   "standard_functions": true,
    ///   "access_policy": {"denied_columns": ["users.ssn"]},
    ///   "limits": {"max_joins": 8}
    /// }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        let catalog = document.into_catalog()?;
        log::info!(
            "loaded catalog: {} tables, {} functions",
            catalog.tables.len(),
            catalog.functions.len()
        );
        Ok(catalog)
    }

    /// Load a catalog from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("reading catalog from {}", path.display());
        Self::from_json(&json)
    }
}

impl Catalog for InMemoryCatalog {
    fn table(&self, name: &str) -> Option<&TableMetadata> {
        let key = name.to_lowercase();
        if let Some(table) = self.tables.get(&key) {
            return Some(table);
        }
        let short = key.rsplit('.').next().unwrap_or(&key);
        if let Some(Some(full)) = self.short_names.get(short) {
            return self.tables.get(full);
        }
        if short != key {
            return self.tables.get(short);
        }
        None
    }

    fn function(&self, name: &str) -> Option<&FunctionSignature> {
        let key = name.to_lowercase();
        let short = key.rsplit('.').next().unwrap_or(&key);
        self.functions.get(short)
    }

    fn access_policy(&self) -> &AccessPolicy {
        &self.access_policy
    }

    fn limits(&self) -> &StructuralLimits {
        &self.limits
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    #[serde(default)]
    tables: Vec<TableDocument>,
    #[serde(default)]
    functions: Vec<FunctionSignature>,
    #[serde(default = "default_true")]
    standard_functions: bool,
    #[serde(default)]
    access_policy: AccessPolicy,
    #[serde(default)]
    limits: StructuralLimits,
}

#[derive(Debug, Deserialize)]
struct TableDocument {
    name: String,
    columns: Vec<ColumnDocument>,
}

#[derive(Debug, Deserialize)]
struct ColumnDocument {
    name: String,
    #[serde(rename = "type", default)]
    data_type: Option<String>,
}

fn default_true() -> bool {
    true
}

impl CatalogDocument {
    fn into_catalog(self) -> Result<InMemoryCatalog, CatalogError> {
        let mut catalog = if self.standard_functions {
            InMemoryCatalog::standard()
        } else {
            InMemoryCatalog::new()
        };

        for table_doc in self.tables {
            let mut table = TableMetadata::new(&table_doc.name);
            for column in table_doc.columns {
                let data_type = column
                    .data_type
                    .as_deref()
                    .map(DbType::from_sql_name)
                    .unwrap_or(DbType::Unknown);
                if !table.add_column(&column.name, data_type) {
                    return Err(CatalogError::DuplicateColumn {
                        table: table_doc.name,
                        column: column.name,
                    });
                }
            }
            if !catalog.add_table(table) {
                return Err(CatalogError::DuplicateTable(table_doc.name));
            }
        }

        for function in self.functions {
            catalog.add_function(function);
        }

        let mut policy = self.access_policy;
        policy.normalize();
        if let Some(bad) = policy.denied_columns.iter().find(|entry| !entry.contains('.')) {
            return Err(CatalogError::InvalidDeniedColumn(bad.clone()));
        }

        Ok(catalog.with_access_policy(policy).with_limits(self.limits))
    }
}
