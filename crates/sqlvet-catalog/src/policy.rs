//! Access policy and structural limits

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Column denylist and function allowlist
///
/// Denied columns are keyed by the catalog table's unqualified name and the
/// column name, both case-folded. An absent allowlist permits every function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// Entries of the form `table.column`
    #[serde(default)]
    pub denied_columns: IndexSet<String>,
    #[serde(default)]
    pub allowed_functions: Option<IndexSet<String>>,
}

impl AccessPolicy {
    /// A policy that denies nothing
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Deny a column of a table
    pub fn deny_column(mut self, table: &str, column: &str) -> Self {
        self.denied_columns.insert(column_key(table, column));
        self
    }

    /// Restrict callable functions to the given names
    pub fn allow_functions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_functions = Some(
            names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        );
        self
    }

    /// Check if a column is denied
    pub fn is_column_denied(&self, table: &str, column: &str) -> bool {
        !self.denied_columns.is_empty() && self.denied_columns.contains(&column_key(table, column))
    }

    /// Check if a function may be called
    pub fn is_function_allowed(&self, name: &str) -> bool {
        match &self.allowed_functions {
            Some(allowed) => allowed.contains(&name.to_lowercase()),
            None => true,
        }
    }

    /// Case-fold every entry; used after deserialization
    pub(crate) fn normalize(&mut self) {
        self.denied_columns = self
            .denied_columns
            .iter()
            .map(|entry| entry.to_lowercase())
            .collect();
        if let Some(allowed) = &mut self.allowed_functions {
            *allowed = allowed.iter().map(|n| n.to_lowercase()).collect();
        }
    }
}

fn column_key(table: &str, column: &str) -> String {
    let table = table.rsplit('.').next().unwrap_or(table);
    format!("{}.{}", table.to_lowercase(), column.to_lowercase())
}

/// Configurable limits on query size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralLimits {
    /// Maximum number of joins in one FROM clause
    #[serde(default)]
    pub max_joins: Option<usize>,
    /// Maximum number of items in one select list
    #[serde(default)]
    pub max_select_columns: Option<usize>,
}

impl StructuralLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_joins(mut self, max: usize) -> Self {
        self.max_joins = Some(max);
        self
    }

    pub fn with_max_select_columns(mut self, max: usize) -> Self {
        self.max_select_columns = Some(max);
        self
    }
}
