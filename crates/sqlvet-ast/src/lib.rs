//! SQL query tree definitions
//!
//! This crate defines the immutable, already-parsed query tree that sqlvet
//! validates. It is a closed set of enums: queries, select items, table
//! references and joins, expressions, predicates, windows and common table
//! expressions. Trees are usually built by a parser elsewhere and handed over
//! as JSON (every type derives `serde`), or built directly with the helper
//! constructors for tests.
//!
//! [`Node`] is a borrowed view over any element of the tree, and [`NodeKind`]
//! is its fieldless tag.

mod display;
mod expression;
mod literal;
mod node;
mod operator;
mod predicate;
mod query;
mod window;

pub use expression::*;
pub use literal::*;
pub use node::*;
pub use operator::*;
pub use predicate::*;
pub use query::*;
pub use window::*;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// An identifier (table, alias, column, window or CTE name)
///
/// Identifiers compare case-sensitively as written; use [`Identifier::normalized`]
/// for name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(pub String);

impl Identifier {
    /// Create a new identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The identifier text as written
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-folded form used for resolution
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// Case-insensitive comparison
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A possibly schema-qualified object name (e.g. `sales.orders`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectName(pub SmallVec<[Identifier; 2]>);

impl ObjectName {
    /// Create a single-part name
    pub fn simple(name: impl Into<Identifier>) -> Self {
        let mut parts = SmallVec::new();
        parts.push(name.into());
        Self(parts)
    }

    /// Create a name from dotted parts
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Identifier>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Last segment, the unqualified object name
    pub fn last(&self) -> Option<&Identifier> {
        self.0.last()
    }

    /// Whether the name has a single segment
    pub fn is_simple(&self) -> bool {
        self.0.len() == 1
    }

    /// Dotted, case-folded form
    pub fn normalized(&self) -> String {
        self.0
            .iter()
            .map(Identifier::normalized)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Case-folded last segment
    pub fn normalized_last(&self) -> String {
        self.last().map(Identifier::normalized).unwrap_or_default()
    }
}

impl From<&str> for ObjectName {
    fn from(s: &str) -> Self {
        Self::from_parts(s.split('.'))
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_from_dotted() {
        let name = ObjectName::from("Sales.Orders");
        assert_eq!(name.0.len(), 2);
        assert_eq!(name.normalized(), "sales.orders");
        assert_eq!(name.normalized_last(), "orders");
        assert!(!name.is_simple());
    }

    #[test]
    fn test_identifier_matching() {
        let id = Identifier::new("CustomerId");
        assert!(id.matches("customerid"));
        assert_eq!(id.normalized(), "customerid");
        assert_eq!(id.to_string(), "CustomerId");
    }
}
