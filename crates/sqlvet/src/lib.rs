//! sqlvet - semantic validation for parsed SQL
//!
//! sqlvet takes a query tree produced by an external SQL parser and checks it
//! against catalog metadata: name resolution, type compatibility, aggregation,
//! window and CTE structure, join conditions and access policy. Every problem is
//! reported; validation never stops at the first one.
//!
//! # Example
//!
//! ```ignore
//! use sqlvet::ast::{Expr, Predicate, SelectItem, SelectQuery, TableRef};
//! use sqlvet::{InMemoryCatalog, ProblemCode, Query, TableMetadata, ValidationConfig};
//! use sqlvet::types::DbType;
//!
//! let catalog = InMemoryCatalog::standard().with_table(
//!     TableMetadata::new("users").with_column("id", DbType::Integer),
//! );
//!
//! let query: Query = SelectQuery::new(vec![SelectItem::expr(Expr::col("nickname"))])
//!     .from(TableRef::table("users"))
//!     .filter(Predicate::eq(Expr::col("id"), Expr::int(1)))
//!     .into();
//!
//! let problems = sqlvet::validate(&query, &catalog, &ValidationConfig::default());
//! assert_eq!(problems[0].code, ProblemCode::ColumnNotFound);
//! ```

// Re-export all public APIs from internal crates
pub use sqlvet_ast as ast;
pub use sqlvet_catalog as catalog;
pub use sqlvet_diagnostics as diagnostics;
pub use sqlvet_types as types;
pub use sqlvet_validate as validation;

// Convenience re-exports
pub use sqlvet_ast::Query;
pub use sqlvet_catalog::{AccessPolicy, Catalog, CatalogError, InMemoryCatalog, StructuralLimits, TableMetadata};
pub use sqlvet_diagnostics::{ProblemCode, Result, Severity, SqlvetError, ValidationProblem};
pub use sqlvet_validate::{RuleRegistry, ValidationConfig, Validator, validate};

