//! Validation configuration

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use sqlvet_catalog::StructuralLimits;
use sqlvet_diagnostics::{ProblemCode, Result, Severity, SqlvetError};
use std::path::Path;

/// Options for a validation pass
///
/// ```json
/// {
///   "disabled_rules": ["window-inheritance"],
///   "severity_overrides": {"COLUMN_ACCESS_DENIED": "warning"},
///   "limits": {"max_joins": 4}
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Names of rules that are not run
    pub disabled_rules: IndexSet<String>,
    /// Severity to report instead of `error` for a code
    pub severity_overrides: IndexMap<ProblemCode, Severity>,
    /// Structural limits replacing the catalog's
    pub limits: Option<StructuralLimits>,
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip a rule by name
    pub fn disable_rule(mut self, name: impl Into<String>) -> Self {
        self.disabled_rules.insert(name.into());
        self
    }

    /// Report a code with a different severity
    pub fn with_severity(mut self, code: ProblemCode, severity: Severity) -> Self {
        self.severity_overrides.insert(code, severity);
        self
    }

    pub fn with_limits(mut self, limits: StructuralLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Check if a rule runs under this configuration
    pub fn is_rule_enabled(&self, name: &str) -> bool {
        !self.disabled_rules.contains(name)
    }

    /// Severity reported for a code
    pub fn severity_for(&self, code: ProblemCode) -> Severity {
        self.severity_overrides
            .get(&code)
            .copied()
            .unwrap_or(Severity::Error)
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SqlvetError::json("validation config", e))
    }

    /// Read a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| SqlvetError::io(path, e))?;
        log::debug!("reading validation config from {}", path.display());
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ValidationConfig::new();
        assert!(config.is_rule_enabled("column-reference"));
        assert_eq!(config.severity_for(ProblemCode::TypeMismatch), Severity::Error);
        assert_eq!(config.limits, None);
    }

    #[test]
    fn test_from_json() {
        let config = ValidationConfig::from_json(
            r#"{
                "disabled_rules": ["window-frame"],
                "severity_overrides": {"COLUMN_ACCESS_DENIED": "warning"},
                "limits": {"max_select_columns": 10}
            }"#,
        )
        .unwrap();

        assert!(!config.is_rule_enabled("window-frame"));
        assert_eq!(
            config.severity_for(ProblemCode::ColumnAccessDenied),
            Severity::Warning
        );
        assert_eq!(
            config.limits,
            Some(StructuralLimits::unlimited().with_max_select_columns(10))
        );
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let err = ValidationConfig::from_json(r#"{"severity_overrides": {"NOPE": "hint"}}"#)
            .unwrap_err();
        assert!(matches!(err, SqlvetError::Json { .. }));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(ValidationConfig::from_json(r#"{"disabled": []}"#).is_err());
    }
}
