//! SQL semantic validation
//!
//! This crate checks an already-parsed SQL query tree against catalog
//! metadata and reports every semantic problem it finds:
//!
//! - **Names**: column and table resolution across nested and correlated
//!   queries, ambiguity, duplicate source aliases
//! - **Types**: comparability of predicate operands, arithmetic, CASE
//!   branches, set-operation columns, USING columns
//! - **Aggregation**: GROUP BY / HAVING legality, misplaced aggregates
//! - **Windows**: WINDOW definitions, inheritance cycles, frame bounds
//! - **CTEs**: duplicate names, self reference, recursive structure
//! - **Policy**: denied columns, function allowlist and signatures,
//!   structural limits
//!
//! # Example
//!
//! ```ignore
//! use sqlvet_ast::{Expr, Predicate, Query, SelectItem, SelectQuery, TableRef};
//! use sqlvet_catalog::{InMemoryCatalog, TableMetadata};
//! use sqlvet_types::DbType;
//!
//! let catalog = InMemoryCatalog::standard().with_table(
//!     TableMetadata::new("users").with_column("id", DbType::Integer),
//! );
//! let query: Query = SelectQuery::new(vec![SelectItem::expr(Expr::col("id"))])
//!     .from(TableRef::table("users"))
//!     .filter(Predicate::eq(Expr::col("id"), Expr::int(1)))
//!     .into();
//!
//! let problems = sqlvet_validate::validate(&query, &catalog, &Default::default());
//! assert!(problems.is_empty());
//! ```
//!
//! # Architecture
//!
//! - [`Walker`] visits the tree once, pre-order, keeping the scope stack of
//!   the [`ValidationContext`] in step with the position in the tree
//! - [`RuleRegistry`] maps node kinds to [`Rule`]s; every visited node is
//!   handed to the rules registered for its kind
//! - Rules read the context (resolution, inference, projections) and append
//!   [`ValidationProblem`]s; they never stop the traversal

pub mod aggregation;
pub mod config;
pub mod context;
pub mod inference;
pub mod projection;
pub mod references;
pub mod registry;
pub mod rules;
pub mod scope;
pub mod shape;
pub mod walker;

pub use config::ValidationConfig;
pub use context::{ColumnMatches, Resolution, ValidationContext};
pub use registry::{Rule, RuleRef, RuleRegistry};
pub use scope::{Clause, ScopeId, ScopeKind};
pub use walker::Walker;

use sqlvet_ast::Query;
use sqlvet_catalog::Catalog;
use sqlvet_diagnostics::{Result, SqlvetError, ValidationProblem};

/// Validate a query with the standard rules
///
/// Rules named in `config.disabled_rules` are skipped; unknown names are
/// ignored here and rejected by [`Validator::with_config`].
pub fn validate(
    query: &Query,
    catalog: &dyn Catalog,
    config: &ValidationConfig,
) -> Vec<ValidationProblem> {
    let registry = RuleRegistry::standard().without(&config.disabled_rules);
    run(&registry, query, catalog, config)
}

fn run(
    registry: &RuleRegistry,
    query: &Query,
    catalog: &dyn Catalog,
    config: &ValidationConfig,
) -> Vec<ValidationProblem> {
    let mut ctx = ValidationContext::new(catalog, config);
    Walker::new(registry).walk(query, &mut ctx);
    let problems = ctx.into_problems();
    log::debug!(
        "validated query with {} rules: {} problem(s)",
        registry.len(),
        problems.len()
    );
    problems
}

/// Reusable validator: a rule registry together with its configuration
///
/// The validator is `Send + Sync` and can validate many queries, from
/// several threads, against any catalog.
#[derive(Clone)]
pub struct Validator {
    registry: RuleRegistry,
    config: ValidationConfig,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Validator with every standard rule and the default configuration
    pub fn new() -> Self {
        Self {
            registry: RuleRegistry::standard(),
            config: ValidationConfig::default(),
        }
    }

    /// Validator with the standard rules minus the configuration's disabled
    /// ones
    ///
    /// Fails if a disabled rule does not exist.
    pub fn with_config(config: ValidationConfig) -> Result<Self> {
        let standard = RuleRegistry::standard();
        for name in &config.disabled_rules {
            if standard.rule(name).is_none() {
                return Err(SqlvetError::config(format!("unknown rule '{}'", name)));
            }
        }
        Ok(Self {
            registry: standard.without(&config.disabled_rules),
            config,
        })
    }

    /// Validator with a custom rule set
    pub fn with_registry(registry: RuleRegistry, config: ValidationConfig) -> Self {
        Self {
            registry: registry.without(&config.disabled_rules),
            config,
        }
    }

    /// Validate one query
    pub fn validate(&self, query: &Query, catalog: &dyn Catalog) -> Vec<ValidationProblem> {
        run(&self.registry, query, catalog, &self.config)
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_disabled_rule_is_rejected() {
        let config = ValidationConfig::new().disable_rule("no-such-rule");
        let err = Validator::with_config(config).err();
        assert!(matches!(err, Some(SqlvetError::Config(_))));
    }

    #[test]
    fn test_disabled_rule_is_removed() {
        let config = ValidationConfig::new().disable_rule("window-frame");
        let validator = Validator::with_config(config).unwrap();
        assert!(validator.registry().rule("window-frame").is_none());
        assert_eq!(
            validator.registry().len(),
            RuleRegistry::standard().len() - 1
        );
    }

    #[test]
    fn test_validator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
    }
}
