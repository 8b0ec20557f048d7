//! Expression type rules

use super::check_comparable;
use crate::context::ValidationContext;
use crate::inference::arithmetic_result;
use crate::registry::Rule;
use crate::shape::check_scalar_operands;
use sqlvet_ast::{BinaryOp, Expr, Node, NodeKind};
use sqlvet_diagnostics::ProblemCode;
use sqlvet_types::{DbType, Inferred};

/// Arithmetic operands must be numeric, except for date/interval arithmetic
/// and string concatenation
pub struct ArithmeticTypes;

impl Rule for ArithmeticTypes {
    fn name(&self) -> &'static str {
        "arithmetic-types"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Binary, NodeKind::Unary]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let path = ctx.clause_path("arithmetic");
        match node {
            Node::Expr(Expr::Binary(binary)) => {
                if !check_scalar_operands(ctx, &[binary.left.as_ref(), binary.right.as_ref()], &path) {
                    return;
                }
                if binary.op == BinaryOp::Concat {
                    return;
                }
                let left = ctx.infer_type(&binary.left);
                let right = ctx.infer_type(&binary.right);
                if let Inferred::Known((l, r)) = left.zip(right) {
                    if arithmetic_result(binary.op, l, r).is_none() {
                        ctx.add_problem(
                            ProblemCode::TypeMismatch,
                            format!(
                                "Operator {} cannot be applied to {} and {}",
                                binary.op.symbol(),
                                l,
                                r
                            ),
                            node,
                            &path,
                        );
                    }
                }
            }
            Node::Expr(Expr::Unary(unary)) => {
                if !check_scalar_operands(ctx, &[unary.operand.as_ref()], &path) {
                    return;
                }
                if let Inferred::Known(ty) = ctx.infer_type(&unary.operand) {
                    if !ty.is_numeric() && ty != DbType::Interval {
                        ctx.add_problem(
                            ProblemCode::TypeMismatch,
                            format!("Unary {} cannot be applied to {}", unary.op.symbol(), ty),
                            node,
                            &path,
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

/// CASE branches must agree on a type; a simple CASE's WHEN values must be
/// comparable with its operand, and a searched CASE's conditions must be
/// BOOLEAN
pub struct CaseTypes;

impl Rule for CaseTypes {
    fn name(&self) -> &'static str {
        "case-types"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Case]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Expr(Expr::Case(case)) = node else {
            return;
        };
        let path = ctx.clause_path("case");

        match case.operand.as_deref() {
            Some(operand) => {
                let operand_ty = ctx.infer_type(operand);
                for when in &case.whens {
                    let ty = ctx.infer_type(&when.condition);
                    check_comparable(ctx, operand_ty, ty, node, &path);
                }
            }
            None => {
                for when in &case.whens {
                    if let Inferred::Known(ty) = ctx.infer_type(&when.condition) {
                        if ty != DbType::Boolean {
                            ctx.add_problem(
                                ProblemCode::TypeMismatch,
                                format!("CASE WHEN condition must be BOOLEAN, found {}", ty),
                                node,
                                &path,
                            );
                        }
                    }
                }
            }
        }

        let mut first: Option<DbType> = None;
        for result in case.results() {
            let Inferred::Known(ty) = ctx.infer_type(result) else {
                continue;
            };
            match first {
                None => first = Some(ty),
                Some(expected) if !DbType::comparable(expected, ty) => {
                    ctx.add_problem(
                        ProblemCode::TypeMismatch,
                        format!("CASE branches have incompatible types {} and {}", expected, ty),
                        node,
                        &path,
                    );
                }
                Some(_) => {}
            }
        }
    }
}
