//! Aggregation rules: GROUP BY legality, HAVING, aggregates in the wrong
//! clause, GROUP BY ordinals

use super::ordering::{OrdinalTarget, ordinal_target};
use crate::aggregation::{
    ColumnKey, GroupedSet, contains_aggregate, contains_aggregate_in_predicate, is_aggregate_call,
    non_aggregate_column_keys, non_aggregate_column_keys_in_predicate,
};
use crate::context::ValidationContext;
use crate::registry::Rule;
use crate::scope::Clause;
use sqlvet_ast::{Expr, Node, NodeKind, SelectItem};
use sqlvet_diagnostics::ProblemCode;

fn key_list(keys: &[ColumnKey]) -> String {
    keys.iter()
        .map(|k| format!("'{}'", k))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Select items of a grouped query must be grouped or aggregated
///
/// A query is grouped when it has GROUP BY, or implicitly when any select
/// item contains an aggregate.
pub struct Aggregation;

impl Rule for Aggregation {
    fn name(&self) -> &'static str {
        "aggregation"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Select]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Select(select) = node else {
            return;
        };
        let explicit = !select.group_by.is_empty();
        let implicit = !explicit
            && select
                .items
                .iter()
                .filter_map(SelectItem::as_expr)
                .any(|e| contains_aggregate(ctx, e));
        if !explicit && !implicit {
            return;
        }
        let grouped = GroupedSet::of(ctx, select);

        for item in &select.items {
            let expr = match item {
                SelectItem::Expr { expr, .. } => expr,
                _ => {
                    let message = if explicit {
                        format!("{} is not allowed with GROUP BY", item)
                    } else {
                        format!("{} is not allowed next to an aggregate without GROUP BY", item)
                    };
                    ctx.add_problem(ProblemCode::AggregationMisuse, message, Node::SelectItem(item), "select");
                    continue;
                }
            };
            if grouped.contains(expr) || contains_aggregate(ctx, expr) {
                continue;
            }
            let missing = grouped.uncovered(non_aggregate_column_keys(ctx, expr));
            if missing.is_empty() {
                continue;
            }
            let message = if explicit {
                format!(
                    "Column {} must appear in GROUP BY or be used in an aggregate",
                    key_list(&missing)
                )
            } else {
                format!(
                    "Column {} must be used in an aggregate: the query aggregates without GROUP BY",
                    key_list(&missing)
                )
            };
            ctx.add_problem(ProblemCode::AggregationMisuse, message, Node::SelectItem(item), "select");
        }
    }
}

/// HAVING needs GROUP BY or an aggregate, and may only use grouped columns
/// outside aggregates
pub struct Having;

impl Rule for Having {
    fn name(&self) -> &'static str {
        "having"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Select]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Select(select) = node else {
            return;
        };
        let Some(having) = &select.having else {
            return;
        };
        if select.group_by.is_empty() && !contains_aggregate_in_predicate(ctx, having) {
            ctx.add_problem(
                ProblemCode::AggregationMisuse,
                "HAVING requires GROUP BY or an aggregate",
                Node::Predicate(having),
                "having",
            );
            return;
        }
        let grouped = GroupedSet::of(ctx, select);
        let missing = grouped.uncovered(non_aggregate_column_keys_in_predicate(ctx, having));
        if !missing.is_empty() {
            ctx.add_problem(
                ProblemCode::AggregationMisuse,
                format!(
                    "Column {} in HAVING must appear in GROUP BY or be used in an aggregate",
                    key_list(&missing)
                ),
                Node::Predicate(having),
                "having",
            );
        }
    }
}

/// Aggregates are not allowed in WHERE, JOIN ON or GROUP BY
pub struct MisplacedAggregate;

impl Rule for MisplacedAggregate {
    fn name(&self) -> &'static str {
        "misplaced-aggregate"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Function]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Expr(Expr::Function(call)) = node else {
            return;
        };
        let place = match ctx.current_clause() {
            Some(Clause::Where) => "WHERE",
            Some(Clause::GroupBy) => "GROUP BY",
            Some(Clause::From) => "JOIN ON",
            _ => return,
        };
        if is_aggregate_call(ctx, call) {
            let path = ctx.clause_path("aggregate");
            ctx.add_problem(
                ProblemCode::AggregationMisuse,
                format!("Aggregate function {} is not allowed in {}", call.name, place),
                node,
                &path,
            );
        }
    }
}

/// GROUP BY ordinals must name a plain select item, also inside grouping sets
pub struct GroupByOrdinal;

impl Rule for GroupByOrdinal {
    fn name(&self) -> &'static str {
        "group-by-ordinal"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Select]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Select(select) = node else {
            return;
        };
        for expr in select.grouping_exprs() {
            let Some(ordinal) = expr.as_integer() else {
                continue;
            };
            let message = match ordinal_target(ctx, select, ordinal) {
                OrdinalTarget::Expr(_) | OrdinalTarget::Unknown => continue,
                OrdinalTarget::Star => {
                    format!("GROUP BY position {} refers to a * item", ordinal)
                }
                OrdinalTarget::OutOfRange(width) => format!(
                    "GROUP BY position {} is not in the select list ({} columns)",
                    ordinal, width
                ),
            };
            ctx.add_problem(ProblemCode::GroupByInvalidOrdinal, message, Node::Expr(expr), "group_by");
        }
    }
}
