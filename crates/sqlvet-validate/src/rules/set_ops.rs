//! UNION / INTERSECT / EXCEPT rules

use super::check_positional_types;
use crate::context::ValidationContext;
use crate::projection::{expression_projection_expressions, projection_arity, projection_column_names};
use crate::registry::Rule;
use sqlvet_ast::{Node, NodeKind};
use sqlvet_diagnostics::ProblemCode;
use sqlvet_types::Inferred;

/// Adjacent terms must have the same number of columns with comparable types
pub struct SetOperation;

impl Rule for SetOperation {
    fn name(&self) -> &'static str {
        "set-operation"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Composite]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Composite(composite) = node else {
            return;
        };
        for (i, pair) in composite.terms.windows(2).enumerate() {
            let [left, right] = pair else {
                continue;
            };
            let operator = composite
                .operators
                .get(i)
                .map_or_else(|| "set operation".to_string(), ToString::to_string);

            let left_arity = projection_arity(ctx, left);
            let right_arity = projection_arity(ctx, right);
            if let Inferred::Known((l, r)) = left_arity.zip(right_arity) {
                if l != r {
                    ctx.add_problem(
                        ProblemCode::SetOperationColumnCountMismatch,
                        format!(
                            "{} operands have different column counts: {} and {}",
                            operator, l, r
                        ),
                        node,
                        "set_operation",
                    );
                    continue;
                }
            }

            let left_types = ctx.infer_projection_types(left);
            let right_types = ctx.infer_projection_types(right);
            if let Inferred::Known((l, r)) = left_types.zip(right_types) {
                check_positional_types(ctx, &l, &r, node, "set_operation");
            }
        }
    }
}

/// ORDER BY of a set operation may only name the first term's output
///
/// An item is accepted when it is a position, when it repeats one of the
/// first term's projected expressions, or when it names one of its output
/// columns.
pub struct CompositeOrderBy;

impl Rule for CompositeOrderBy {
    fn name(&self) -> &'static str {
        "composite-order-by"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Composite]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Composite(composite) = node else {
            return;
        };
        let Some(first) = composite.terms.first() else {
            return;
        };
        let Some(projected) = expression_projection_expressions(first) else {
            return;
        };
        let names = first
            .leading_select()
            .map(projection_column_names)
            .unwrap_or_default();

        for item in &composite.order_by {
            if item.expr.as_integer().is_some() || projected.contains(&&item.expr) {
                continue;
            }
            let names_output = item.expr.as_column().is_some_and(|c| {
                c.table.is_none() && names.iter().flatten().any(|n| *n == c.name.normalized())
            });
            if names_output {
                continue;
            }
            ctx.add_problem(
                ProblemCode::OrderByInvalidExpression,
                format!(
                    "ORDER BY expression {} of a set operation must name a column of its first query",
                    item.expr
                ),
                Node::Expr(&item.expr),
                "order_by",
            );
        }
    }
}
