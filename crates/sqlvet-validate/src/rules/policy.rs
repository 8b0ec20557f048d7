//! Policy rules: function allowlist, function signatures, structural limits

use crate::context::ValidationContext;
use crate::registry::Rule;
use sqlvet_ast::{Expr, FunctionArg, Node, NodeKind, SelectItem};
use sqlvet_diagnostics::ProblemCode;
use sqlvet_types::{ArgKind, DbType, Inferred};

/// Only allowlisted functions may be called
pub struct FunctionAllowlist;

impl Rule for FunctionAllowlist {
    fn name(&self) -> &'static str {
        "function-allowlist"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Function]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Expr(Expr::Function(call)) = node else {
            return;
        };
        if !ctx.is_function_allowed(&call.normalized_name()) {
            let path = ctx.clause_path("function");
            ctx.add_problem(
                ProblemCode::FunctionNotAllowed,
                format!("Function '{}' is not allowed", call.name),
                node,
                &path,
            );
        }
    }
}

/// Calls match the catalog signature: argument count and argument kinds
pub struct FunctionSignatureCheck;

impl Rule for FunctionSignatureCheck {
    fn name(&self) -> &'static str {
        "function-signature"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Function]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Expr(Expr::Function(call)) = node else {
            return;
        };
        let Some(signature) = ctx.function_signature(&call.normalized_name()) else {
            return;
        };
        let path = ctx.clause_path("function");

        if !signature.accepts_arity(call.args.len()) {
            ctx.add_problem(
                ProblemCode::FunctionArityMismatch,
                format!(
                    "Function '{}' expects {} arguments, got {}",
                    call.name,
                    signature.arity_description(),
                    call.args.len()
                ),
                node,
                &path,
            );
            return;
        }

        for (position, arg) in call.args.iter().enumerate() {
            let Some(kind) = signature.arg_kind(position) else {
                continue;
            };
            let problem = match (kind, arg) {
                (ArgKind::StarOrExpr, _) => None,
                (_, FunctionArg::Star) => Some("*".to_string()),
                (ArgKind::AnyExpr, FunctionArg::Expr(_)) => None,
                (ArgKind::String, FunctionArg::Expr(expr)) => match ctx.infer_type(expr) {
                    Inferred::Known(ty) if ty != DbType::String => Some(ty.to_string()),
                    _ => None,
                },
                (ArgKind::Numeric, FunctionArg::Expr(expr)) => match ctx.infer_type(expr) {
                    Inferred::Known(ty) if !ty.is_numeric() => Some(ty.to_string()),
                    _ => None,
                },
            };
            if let Some(found) = problem {
                ctx.add_problem(
                    ProblemCode::FunctionArgumentInvalid,
                    format!(
                        "Argument {} of '{}' must be a {}, found {}",
                        position + 1,
                        call.name,
                        kind,
                        found
                    ),
                    node,
                    &path,
                );
            }
        }
    }
}

/// Configured limits on joins and select-list width
pub struct StructuralLimit;

impl Rule for StructuralLimit {
    fn name(&self) -> &'static str {
        "structural-limits"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Select]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Select(select) = node else {
            return;
        };
        let limits = ctx.limits();

        if let Some(max) = limits.max_joins {
            let joins = select.joins().len();
            if joins > max {
                ctx.add_problem(
                    ProblemCode::MaxJoinsExceeded,
                    format!("Query has {} joins; at most {} are allowed", joins, max),
                    node,
                    "from",
                );
            }
        }

        if let Some(max) = limits.max_select_columns {
            let mut width = 0;
            for item in &select.items {
                width += match item {
                    SelectItem::Expr { .. } => 1,
                    SelectItem::Star => ctx.star_width(None).known().unwrap_or(1),
                    SelectItem::QualifiedStar(q) => ctx
                        .star_width(Some(q.normalized().as_str()))
                        .known()
                        .unwrap_or(1),
                };
            }
            if width > max {
                ctx.add_problem(
                    ProblemCode::MaxSelectColumnsExceeded,
                    format!("Query selects {} columns; at most {} are allowed", width, max),
                    node,
                    "select",
                );
            }
        }
    }
}
