//! Scalar-subquery shape validation

use crate::context::ValidationContext;
use crate::projection::is_single_expression_projection;
use sqlvet_ast::{Expr, Node};
use sqlvet_diagnostics::ProblemCode;

/// Check an operand used as a single value
///
/// A subquery in scalar position must project exactly one plain expression.
/// Otherwise `SUBQUERY_SHAPE_MISMATCH` is reported and `false` tells the
/// caller to skip its type checks for this operand.
pub fn check_scalar_operand(ctx: &mut ValidationContext<'_>, expr: &Expr, clause: &str) -> bool {
    match expr {
        Expr::Subquery(query) if !is_single_expression_projection(query) => {
            ctx.add_problem(
                ProblemCode::SubqueryShapeMismatch,
                "Subquery used as a single value must return exactly one column",
                Node::Expr(expr),
                clause,
            );
            false
        }
        _ => true,
    }
}

/// Check every operand; all are checked even after a failure
pub fn check_scalar_operands(ctx: &mut ValidationContext<'_>, exprs: &[&Expr], clause: &str) -> bool {
    exprs
        .iter()
        .fold(true, |ok, expr| check_scalar_operand(ctx, expr, clause) && ok)
}
