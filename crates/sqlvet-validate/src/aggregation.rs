//! Aggregation analysis
//!
//! Finds aggregate calls and the column references that sit outside any
//! aggregate ("depth zero"). None of these helpers descend into subqueries:
//! a subquery is its own aggregation context.

use crate::context::ValidationContext;
use sqlvet_ast::{ColumnRef, Expr, FunctionCall, Node, Predicate, SelectItem, SelectQuery};
use std::fmt;

/// Aggregates recognized even when the catalog carries no signature for them
const CORE_AGGREGATES: &[&str] = &["count", "sum", "avg", "min", "max", "every"];

/// A normalized column reference used for grouping comparisons
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnKey {
    pub qualifier: Option<String>,
    pub name: String,
}

impl ColumnKey {
    pub fn from_column(column: &ColumnRef) -> Self {
        Self {
            qualifier: column.table.as_ref().map(|t| t.normalized()),
            name: column.name.normalized(),
        }
    }

    /// Whether one of `keys` names the same column
    ///
    /// An unqualified key on either side matches any qualifier.
    pub fn covered_by(&self, keys: &[ColumnKey]) -> bool {
        keys.iter().any(|k| {
            k.name == self.name
                && (k.qualifier.is_none()
                    || self.qualifier.is_none()
                    || k.qualifier == self.qualifier)
        })
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}.{}", q, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Whether a call aggregates rows
///
/// A call with OVER is a window function, not an aggregate. FILTER or
/// WITHIN GROUP make a call an aggregate whatever its signature says.
pub fn is_aggregate_call(ctx: &ValidationContext<'_>, call: &FunctionCall) -> bool {
    if call.over.is_some() {
        return false;
    }
    if call.filter.is_some() || !call.within_group.is_empty() {
        return true;
    }
    let name = call.normalized_name();
    match ctx.function_signature(&name) {
        Some(signature) => signature.aggregate,
        None => CORE_AGGREGATES.contains(&name.as_str()),
    }
}

fn node_contains_aggregate(ctx: &ValidationContext<'_>, node: Node<'_>) -> bool {
    if node.is_query() {
        return false;
    }
    if let Node::Expr(Expr::Function(call)) = node {
        if is_aggregate_call(ctx, call) {
            return true;
        }
    }
    node.children()
        .into_iter()
        .any(|child| node_contains_aggregate(ctx, child))
}

/// Whether an expression contains an aggregate call
pub fn contains_aggregate(ctx: &ValidationContext<'_>, expr: &Expr) -> bool {
    node_contains_aggregate(ctx, Node::Expr(expr))
}

pub fn contains_aggregate_in_predicate(ctx: &ValidationContext<'_>, predicate: &Predicate) -> bool {
    node_contains_aggregate(ctx, Node::Predicate(predicate))
}

fn collect_keys(ctx: &ValidationContext<'_>, node: Node<'_>, depth: usize, out: &mut Vec<ColumnKey>) {
    if node.is_query() {
        return;
    }
    let depth = match node {
        Node::Expr(Expr::Column(column)) => {
            if depth == 0 {
                out.push(ColumnKey::from_column(column));
            }
            return;
        }
        Node::Expr(Expr::Function(call)) if is_aggregate_call(ctx, call) => depth + 1,
        _ => depth,
    };
    for child in node.children() {
        collect_keys(ctx, child, depth, out);
    }
}

/// Column references outside any aggregate
pub fn non_aggregate_column_keys(ctx: &ValidationContext<'_>, expr: &Expr) -> Vec<ColumnKey> {
    let mut out = Vec::new();
    collect_keys(ctx, Node::Expr(expr), 0, &mut out);
    out
}

pub fn non_aggregate_column_keys_in_predicate(
    ctx: &ValidationContext<'_>,
    predicate: &Predicate,
) -> Vec<ColumnKey> {
    let mut out = Vec::new();
    collect_keys(ctx, Node::Predicate(predicate), 0, &mut out);
    out
}

fn ordinal_item(select: &SelectQuery, ordinal: i64) -> Option<&Expr> {
    let index = usize::try_from(ordinal).ok()?.checked_sub(1)?;
    select.items.get(index)?.as_expr()
}

/// Expression of the first select item named `alias`; output aliases take
/// precedence over source columns in GROUP BY
fn aliased_item<'q>(select: &'q SelectQuery, alias: &str) -> Option<&'q Expr> {
    select.items.iter().find_map(|item| match item {
        SelectItem::Expr { expr, alias: Some(a) } if a.normalized() == alias => Some(expr),
        _ => None,
    })
}

/// The grouped expressions of a SELECT and the column keys they mention
#[derive(Debug, Clone, Default)]
pub struct GroupedSet<'q> {
    pub exprs: Vec<&'q Expr>,
    pub keys: Vec<ColumnKey>,
}

impl<'q> GroupedSet<'q> {
    /// Collect GROUP BY expressions; an ordinal or an output alias stands for
    /// the select item it references
    pub fn of(ctx: &ValidationContext<'_>, select: &'q SelectQuery) -> Self {
        let mut set = Self::default();
        for expr in select.grouping_exprs() {
            let grouped = if let Some(n) = expr.as_integer() {
                match ordinal_item(select, n) {
                    Some(item) => item,
                    None => continue,
                }
            } else if let Expr::Column(ColumnRef { table: None, name }) = expr {
                aliased_item(select, &name.normalized()).unwrap_or(expr)
            } else {
                expr
            };
            set.keys.extend(non_aggregate_column_keys(ctx, grouped));
            set.exprs.push(grouped);
        }
        set
    }

    pub fn contains(&self, expr: &Expr) -> bool {
        self.exprs.iter().any(|g| *g == expr)
    }

    /// Keys not covered by the grouped columns
    pub fn uncovered(&self, keys: Vec<ColumnKey>) -> Vec<ColumnKey> {
        let mut missing: Vec<ColumnKey> = Vec::new();
        for key in keys {
            if !key.covered_by(&self.keys) && !missing.contains(&key) {
                missing.push(key);
            }
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use pretty_assertions::assert_eq;
    use sqlvet_ast::{BinaryOp, GroupingElement, OverClause, WindowSpec};
    use sqlvet_catalog::InMemoryCatalog;

    fn key(qualifier: Option<&str>, name: &str) -> ColumnKey {
        ColumnKey {
            qualifier: qualifier.map(str::to_string),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_unqualified_key_covers_any_qualifier() {
        let grouped = vec![key(None, "a"), key(Some("t"), "b")];
        assert!(key(Some("x"), "a").covered_by(&grouped));
        assert!(key(None, "b").covered_by(&grouped));
        assert!(key(Some("t"), "b").covered_by(&grouped));
        assert!(!key(Some("u"), "b").covered_by(&grouped));
        assert!(!key(None, "c").covered_by(&grouped));
    }

    #[test]
    fn test_aggregate_detection() {
        let catalog = InMemoryCatalog::standard();
        let config = ValidationConfig::default();
        let ctx = ValidationContext::new(&catalog, &config);

        let sum = Expr::func("SUM", vec![Expr::col("b")]);
        let windowed = Expr::Function(
            FunctionCall::new("sum", vec![sqlvet_ast::FunctionArg::Expr(Expr::col("b"))])
                .over(OverClause::Spec(WindowSpec::new())),
        );
        let nested = Expr::binary(Expr::col("a"), BinaryOp::Add, sum.clone());
        let in_subquery = Expr::subquery(sqlvet_ast::SelectQuery::new(vec![
            sqlvet_ast::SelectItem::expr(Expr::count_star()),
        ]));

        assert!(contains_aggregate(&ctx, &sum));
        assert!(contains_aggregate(&ctx, &nested));
        assert!(!contains_aggregate(&ctx, &windowed));
        assert!(!contains_aggregate(&ctx, &in_subquery));
        assert!(!contains_aggregate(&ctx, &Expr::func("upper", vec![Expr::col("a")])));
    }

    #[test]
    fn test_depth_zero_keys() {
        let catalog = InMemoryCatalog::standard();
        let config = ValidationConfig::default();
        let ctx = ValidationContext::new(&catalog, &config);

        let expr = Expr::binary(
            Expr::qcol("T", "A"),
            BinaryOp::Add,
            Expr::func("max", vec![Expr::col("b")]),
        );
        assert_eq!(non_aggregate_column_keys(&ctx, &expr), vec![key(Some("t"), "a")]);
    }

    #[test]
    fn test_grouped_set_resolves_ordinals() {
        let catalog = InMemoryCatalog::standard();
        let config = ValidationConfig::default();
        let ctx = ValidationContext::new(&catalog, &config);

        let select = SelectQuery::new(vec![
            SelectItem::expr(Expr::col("a")),
            SelectItem::expr(Expr::col("b")),
        ])
        .group_by(vec![
            GroupingElement::Expr(Expr::int(2)),
            GroupingElement::Rollup(vec![GroupingElement::Expr(Expr::col("c"))]),
        ]);

        let grouped = GroupedSet::of(&ctx, &select);
        assert!(grouped.contains(&Expr::col("b")));
        assert!(grouped.contains(&Expr::col("c")));
        assert_eq!(grouped.uncovered(vec![key(None, "a"), key(None, "b")]), vec![key(None, "a")]);
    }
}
