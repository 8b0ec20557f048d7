//! Projection shape inspection
//!
//! Helpers that look at what a query outputs: how many columns, their types,
//! their names. WITH is looked through to its body and a set operation to its
//! first term.

use crate::context::ValidationContext;
use sqlvet_ast::{Expr, Query, SelectItem, SelectQuery};
use sqlvet_types::{DbType, Inferred};

/// Whether a query outputs exactly one plain expression (no star)
pub fn is_single_expression_projection(query: &Query) -> bool {
    query
        .leading_select()
        .is_some_and(|select| matches!(select.items.as_slice(), [SelectItem::Expr { .. }]))
}

/// Number of output columns, expanding stars when their sources are known
pub fn projection_arity<'a>(ctx: &mut ValidationContext<'a>, query: &'a Query) -> Inferred<usize> {
    match query.leading_select() {
        Some(select) if !select.items.iter().any(SelectItem::is_star) => {
            Inferred::Known(select.items.len())
        }
        Some(_) => ctx.output_columns(query).width(),
        None => Inferred::Unknown,
    }
}

/// Projected expressions, when every output item is a plain expression
pub fn expression_projection_expressions(query: &Query) -> Option<Vec<&Expr>> {
    query
        .leading_select()?
        .items
        .iter()
        .map(SelectItem::as_expr)
        .collect()
}

/// Types of the projected expressions, when every item is a plain expression
pub fn expression_projection_types<'a>(
    ctx: &mut ValidationContext<'a>,
    query: &'a Query,
) -> Inferred<Vec<Inferred<DbType>>> {
    if expression_projection_expressions(query).is_none() {
        return Inferred::Unknown;
    }
    ctx.infer_projection_types(query)
}

/// Output names of a SELECT's plain items: the alias, else the column name
///
/// Star items contribute nothing here; they are expanded against the bound
/// sources when a derived table or CTE is bound.
pub fn projection_column_names(select: &SelectQuery) -> Vec<Option<String>> {
    select
        .items
        .iter()
        .filter_map(|item| match item {
            SelectItem::Expr { expr, alias } => Some(
                alias
                    .as_ref()
                    .map(|a| a.normalized())
                    .or_else(|| expr.as_column().map(|c| c.name.normalized())),
            ),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use pretty_assertions::assert_eq;
    use sqlvet_ast::{CompositeQuery, TableRef};
    use sqlvet_catalog::{InMemoryCatalog, TableMetadata};

    fn select(items: Vec<SelectItem>) -> SelectQuery {
        SelectQuery::new(items).from(TableRef::table("t"))
    }

    #[test]
    fn test_single_expression_projection() {
        let one: Query = select(vec![SelectItem::expr(Expr::col("a"))]).into();
        let two: Query = select(vec![
            SelectItem::expr(Expr::col("a")),
            SelectItem::expr(Expr::col("b")),
        ])
        .into();
        let star: Query = select(vec![SelectItem::Star]).into();

        assert!(is_single_expression_projection(&one));
        assert!(!is_single_expression_projection(&two));
        assert!(!is_single_expression_projection(&star));

        let union: Query = CompositeQuery::union(one.clone(), two).into();
        assert!(is_single_expression_projection(&union));
    }

    #[test]
    fn test_arity_expands_known_stars() {
        let catalog = InMemoryCatalog::new().with_table(
            TableMetadata::new("t")
                .with_column("a", DbType::Integer)
                .with_column("b", DbType::Integer)
                .with_column("c", DbType::Integer),
        );
        let config = ValidationConfig::default();
        let star: Query = select(vec![SelectItem::Star, SelectItem::expr(Expr::int(1))]).into();
        let opaque: Query = SelectQuery::new(vec![SelectItem::Star])
            .from(TableRef::table("missing"))
            .into();

        let mut ctx = ValidationContext::new(&catalog, &config);
        assert_eq!(projection_arity(&mut ctx, &star), Inferred::Known(4));
        assert_eq!(projection_arity(&mut ctx, &opaque), Inferred::Unknown);
        assert_eq!(expression_projection_types(&mut ctx, &star), Inferred::Unknown);
    }

    #[test]
    fn test_column_names() {
        let s = select(vec![
            SelectItem::aliased(Expr::col("a"), "Total"),
            SelectItem::expr(Expr::qcol("t", "B")),
            SelectItem::expr(Expr::int(1)),
            SelectItem::Star,
        ]);
        assert_eq!(
            projection_column_names(&s),
            vec![Some("total".to_string()), Some("b".to_string()), None]
        );
    }
}
