//! Validation problems produced by semantic rules

use crate::ProblemCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Problem severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Hint - suggestion for improvement
    Hint,
    /// Information - informational message
    Info,
    /// Warning - suspicious but executable
    Warning,
    /// Error - the query is not semantically valid
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// A single semantic finding
///
/// Problems are immutable records. They accumulate during a validation pass and
/// never abort it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationProblem {
    /// Diagnostic code
    pub code: ProblemCode,
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Short description of the offending node
    pub node: String,
    /// Dotted clause path used for grouping, e.g. `predicate.in` or `window.frame`
    pub clause_path: String,
}

impl ValidationProblem {
    /// Create a new error-severity problem
    pub fn error(code: ProblemCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            node: String::new(),
            clause_path: String::new(),
        }
    }

    /// Set the node description
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = node.into();
        self
    }

    /// Set the clause path
    pub fn with_clause(mut self, clause_path: impl Into<String>) -> Self {
        self.clause_path = clause_path.into();
        self
    }

    /// Set the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Check if this problem is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Render for a terminal, colored by severity
    #[cfg(feature = "colored")]
    pub fn render(&self) -> String {
        use colored::Colorize;

        let severity = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
            Severity::Info => self.severity.to_string().blue().bold(),
            Severity::Hint => self.severity.to_string().cyan(),
        };
        let mut out = format!("{}[{}]: {}", severity, self.code.id(), self.message.bold());
        if !self.clause_path.is_empty() {
            out.push_str(&format!("\n  {} {}", "-->".blue(), self.clause_path));
        }
        if !self.node.is_empty() {
            out.push_str(&format!("\n  {} {}", "|".blue(), self.node.dimmed()));
        }
        if let Some(help) = self.code.info().help {
            out.push_str(&format!("\n  {} {}", "= help:".green(), help));
        }
        out
    }
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if !self.clause_path.is_empty() {
            write!(f, " [{}]", self.clause_path)?;
        }
        if !self.node.is_empty() {
            write!(f, " at `{}`", self.node)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_problem_display() {
        let problem = ValidationProblem::error(ProblemCode::ColumnNotFound, "Column 'x' not found")
            .with_node("x")
            .with_clause("select.item");
        assert_eq!(
            problem.to_string(),
            "error: COLUMN_NOT_FOUND - Column 'x' not found [select.item] at `x`"
        );
        assert!(problem.is_error());
    }

    #[test]
    fn test_problem_json_shape() {
        let problem = ValidationProblem::error(ProblemCode::TypeMismatch, "boom")
            .with_severity(Severity::Warning);
        let value = serde_json::to_value(&problem).unwrap();
        assert_eq!(value["code"], "TYPE_MISMATCH");
        assert_eq!(value["severity"], "warning");
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }
}
