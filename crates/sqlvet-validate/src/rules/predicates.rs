//! Predicate type rules
//!
//! Each rule guards its scalar operands first: a subquery operand with the
//! wrong shape is reported once and the type check for that predicate is
//! skipped.

use super::{check_comparable, check_expr_pair, check_positional_types};
use crate::context::ValidationContext;
use crate::projection::{is_single_expression_projection, projection_arity};
use crate::registry::Rule;
use crate::shape::{check_scalar_operand, check_scalar_operands};
use sqlvet_ast::{Expr, InValues, Node, NodeKind, Predicate, Query};
use sqlvet_diagnostics::ProblemCode;
use sqlvet_types::{DbType, Inferred};

fn report_row_arity(ctx: &mut ValidationContext<'_>, expected: usize, found: usize, node: Node<'_>, path: &str) {
    ctx.add_problem(
        ProblemCode::RowArityMismatch,
        format!("Row has {} columns, expected {}", found, expected),
        node,
        path,
    );
}

/// Compare a row constructor with a subquery's output columns
fn check_row_against_query<'a>(
    ctx: &mut ValidationContext<'a>,
    row: &'a [Expr],
    query: &'a Query,
    node: Node<'_>,
    path: &str,
) {
    if let Inferred::Known(width) = projection_arity(ctx, query) {
        if width != row.len() {
            report_row_arity(ctx, row.len(), width, node, path);
            return;
        }
    }
    let left: Vec<_> = row.iter().map(|e| ctx.infer_type(e)).collect();
    if let Inferred::Known(right) = ctx.infer_projection_types(query) {
        check_positional_types(ctx, &left, &right, node, path);
    }
}

/// Compare two row constructors
fn check_rows<'a>(
    ctx: &mut ValidationContext<'a>,
    left: &'a [Expr],
    right: &'a [Expr],
    node: Node<'_>,
    path: &str,
) {
    if left.len() != right.len() {
        report_row_arity(ctx, left.len(), right.len(), node, path);
        return;
    }
    for (l, r) in left.iter().zip(right) {
        check_expr_pair(ctx, l, r, node, path);
    }
}

/// Comparison operands must have comparable types
pub struct ComparisonTypes;

impl Rule for ComparisonTypes {
    fn name(&self) -> &'static str {
        "comparison-types"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Comparison]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Predicate(Predicate::Comparison(comparison)) = node else {
            return;
        };
        let path = ctx.clause_path("comparison");
        match (&comparison.left, &comparison.right) {
            (Expr::Row(left), Expr::Row(right)) => check_rows(ctx, left, right, node, &path),
            (Expr::Row(row), Expr::Subquery(query)) | (Expr::Subquery(query), Expr::Row(row)) => {
                check_row_against_query(ctx, row, query, node, &path);
            }
            (left, right) => {
                if check_scalar_operands(ctx, &[left, right], &path) {
                    check_expr_pair(ctx, left, right, node, &path);
                }
            }
        }
    }
}

/// BETWEEN bounds must be comparable with the tested value
pub struct BetweenTypes;

impl Rule for BetweenTypes {
    fn name(&self) -> &'static str {
        "between-types"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Between]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Predicate(Predicate::Between(between)) = node else {
            return;
        };
        let path = ctx.clause_path("between");
        if !check_scalar_operands(ctx, &[&between.expr, &between.low, &between.high], &path) {
            return;
        }
        let value = ctx.infer_type(&between.expr);
        for bound in [&between.low, &between.high] {
            let ty = ctx.infer_type(bound);
            check_comparable(ctx, value, ty, node, &path);
        }
    }
}

/// LIKE, ILIKE and SIMILAR TO work on strings only
pub struct LikeTypes;

impl Rule for LikeTypes {
    fn name(&self) -> &'static str {
        "like-types"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Like]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Predicate(Predicate::Like(like)) = node else {
            return;
        };
        let path = ctx.clause_path("like");
        let operands: Vec<&Expr> = [&like.expr, &like.pattern]
            .into_iter()
            .chain(like.escape.as_ref())
            .collect();
        if !check_scalar_operands(ctx, &operands, &path) {
            return;
        }
        for operand in operands {
            if let Inferred::Known(ty) = ctx.infer_type(operand) {
                if ty != DbType::String {
                    ctx.add_problem(
                        ProblemCode::TypeMismatch,
                        format!("{} requires string operands, found {}", like.kind.keyword(), ty),
                        node,
                        &path,
                    );
                }
            }
        }
    }
}

/// IN lists and subqueries must match the tested value's shape and type
pub struct InTypes;

impl InTypes {
    fn check_tuple<'a>(
        ctx: &mut ValidationContext<'a>,
        row: &'a [Expr],
        values: &'a InValues,
        node: Node<'_>,
        path: &str,
    ) {
        match values {
            InValues::List(entries) => {
                for entry in entries {
                    match entry {
                        Expr::Row(other) => check_rows(ctx, row, other, node, path),
                        Expr::Subquery(query) => check_row_against_query(ctx, row, query, node, path),
                        _ => report_row_arity(ctx, row.len(), 1, node, path),
                    }
                }
            }
            InValues::Subquery(query) => check_row_against_query(ctx, row, query, node, path),
        }
    }

    fn check_scalar<'a>(
        ctx: &mut ValidationContext<'a>,
        expr: &'a Expr,
        values: &'a InValues,
        node: Node<'_>,
        path: &str,
    ) {
        if !check_scalar_operand(ctx, expr, path) {
            return;
        }
        let value = ctx.infer_type(expr);
        match values {
            InValues::List(entries) => {
                for entry in entries {
                    if let Expr::Row(items) = entry {
                        if items.len() != 1 {
                            report_row_arity(ctx, 1, items.len(), node, path);
                        }
                        continue;
                    }
                    if check_scalar_operand(ctx, entry, path) {
                        let ty = ctx.infer_type(entry);
                        check_comparable(ctx, value, ty, node, path);
                    }
                }
            }
            InValues::Subquery(query) => {
                if !is_single_expression_projection(query) {
                    ctx.add_problem(
                        ProblemCode::SubqueryShapeMismatch,
                        "Subquery in IN must return exactly one column",
                        node,
                        path,
                    );
                    return;
                }
                let ty = ctx.infer_single_column_type(query);
                check_comparable(ctx, value, ty, node, path);
            }
        }
    }
}

impl Rule for InTypes {
    fn name(&self) -> &'static str {
        "in-types"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::In]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Predicate(Predicate::In(predicate)) = node else {
            return;
        };
        let path = ctx.clause_path("in");
        match &predicate.expr {
            Expr::Row(row) => Self::check_tuple(ctx, row, &predicate.values, node, &path),
            expr => Self::check_scalar(ctx, expr, &predicate.values, node, &path),
        }
    }
}

/// `x op ANY | ALL (subquery)` needs a one-column subquery of comparable type
pub struct QuantifiedTypes;

impl Rule for QuantifiedTypes {
    fn name(&self) -> &'static str {
        "quantified-types"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Quantified]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Predicate(Predicate::Quantified(quantified)) = node else {
            return;
        };
        let path = ctx.clause_path("quantified");
        if !is_single_expression_projection(&quantified.subquery) {
            ctx.add_problem(
                ProblemCode::SubqueryShapeMismatch,
                "Subquery of ANY/ALL must return exactly one column",
                node,
                &path,
            );
            return;
        }
        if !check_scalar_operand(ctx, &quantified.left, &path) {
            return;
        }
        let left = ctx.infer_type(&quantified.left);
        let right = ctx.infer_single_column_type(&quantified.subquery);
        check_comparable(ctx, left, right, node, &path);
    }
}

/// IS [NOT] DISTINCT FROM operands must have comparable types
pub struct DistinctFromTypes;

impl Rule for DistinctFromTypes {
    fn name(&self) -> &'static str {
        "distinct-from-types"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::DistinctFrom]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Predicate(Predicate::DistinctFrom(predicate)) = node else {
            return;
        };
        let path = ctx.clause_path("distinct_from");
        if check_scalar_operands(ctx, &[&predicate.left, &predicate.right], &path) {
            check_expr_pair(ctx, &predicate.left, &predicate.right, node, &path);
        }
    }
}

/// Bare boolean expressions and truth tests need a BOOLEAN operand
pub struct BooleanPredicate;

impl Rule for BooleanPredicate {
    fn name(&self) -> &'static str {
        "boolean-predicate"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::UnaryPredicate, NodeKind::IsTruth]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let expr = match node {
            Node::Predicate(Predicate::Unary(expr)) => expr,
            Node::Predicate(Predicate::IsTruth(truth)) => &truth.expr,
            _ => return,
        };
        let path = ctx.clause_path("boolean");
        if !check_scalar_operand(ctx, expr, &path) {
            return;
        }
        if let Inferred::Known(ty) = ctx.infer_type(expr) {
            if ty != DbType::Boolean {
                ctx.add_problem(
                    ProblemCode::TypeMismatch,
                    format!("Expected a BOOLEAN condition, found {}", ty),
                    node,
                    &path,
                );
            }
        }
    }
}
