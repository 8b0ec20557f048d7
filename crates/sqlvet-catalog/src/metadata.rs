//! Table and column metadata

use indexmap::IndexMap;
use sqlvet_types::DbType;

/// A column of a catalog table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    /// Column name as declared
    pub name: String,
    pub data_type: DbType,
}

/// A catalog table with its columns in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    /// Table name as declared, possibly schema-qualified
    pub name: String,
    columns: IndexMap<String, ColumnMetadata>,
}

impl TableMetadata {
    /// Create a table with no columns
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
        }
    }

    /// Add a column (builder form)
    pub fn with_column(mut self, name: impl Into<String>, data_type: DbType) -> Self {
        self.add_column(name, data_type);
        self
    }

    /// Add a column; returns false if a column with the same name exists
    pub fn add_column(&mut self, name: impl Into<String>, data_type: DbType) -> bool {
        let name = name.into();
        let key = name.to_lowercase();
        if self.columns.contains_key(&key) {
            return false;
        }
        self.columns.insert(key, ColumnMetadata { name, data_type });
        true
    }

    /// Case-folded table name
    pub fn normalized_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Case-folded unqualified table name
    pub fn short_name(&self) -> String {
        self.name
            .rsplit('.')
            .next()
            .unwrap_or(&self.name)
            .to_lowercase()
    }

    /// Look up a column case-insensitively
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.get(&name.to_lowercase())
    }

    /// Type of a column, if it exists
    pub fn column_type(&self, name: &str) -> Option<DbType> {
        self.column(name).map(|c| c.data_type)
    }

    /// Columns in declaration order
    pub fn columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.values()
    }
}
