//! Built-in validation rules
//!
//! Rules are grouped by the part of a query they look at:
//! - Names (column and table resolution, access policy on columns)
//! - Predicates (comparison, BETWEEN, LIKE, IN, ANY/ALL, DISTINCT FROM, boolean tests)
//! - Expressions (arithmetic, CASE)
//! - Grouping (aggregation legality, HAVING, GROUP BY ordinals)
//! - Ordering (ORDER BY ordinals, LIMIT/OFFSET)
//! - Set operations
//! - CTEs
//! - Windows (definitions, references, inheritance, frames)
//! - Joins (ON, USING)
//! - Policy (function allowlist and signatures, structural limits)

pub mod cte;
pub mod expressions;
pub mod grouping;
pub mod joins;
pub mod names;
pub mod ordering;
pub mod policy;
pub mod predicates;
pub mod set_ops;
pub mod windows;

use crate::context::ValidationContext;
use crate::registry::RuleRef;
use sqlvet_ast::{Expr, Node};
use sqlvet_diagnostics::ProblemCode;
use sqlvet_types::{DbType, Inferred, comparable};
use std::sync::Arc;

/// Every built-in rule, in registration order
pub fn standard_rules() -> Vec<RuleRef> {
    vec![
        // Names
        Arc::new(names::ColumnReference),
        Arc::new(names::ColumnAccess),
        Arc::new(names::TableReference),
        Arc::new(names::DuplicateSourceAlias),
        // Predicates
        Arc::new(predicates::ComparisonTypes),
        Arc::new(predicates::BetweenTypes),
        Arc::new(predicates::LikeTypes),
        Arc::new(predicates::InTypes),
        Arc::new(predicates::QuantifiedTypes),
        Arc::new(predicates::DistinctFromTypes),
        Arc::new(predicates::BooleanPredicate),
        // Expressions
        Arc::new(expressions::ArithmeticTypes),
        Arc::new(expressions::CaseTypes),
        // Grouping
        Arc::new(grouping::Aggregation),
        Arc::new(grouping::Having),
        Arc::new(grouping::MisplacedAggregate),
        Arc::new(grouping::GroupByOrdinal),
        // Ordering
        Arc::new(ordering::OrderByOrdinal),
        Arc::new(ordering::LimitOffset),
        // Set operations
        Arc::new(set_ops::SetOperation),
        Arc::new(set_ops::CompositeOrderBy),
        // CTEs
        Arc::new(cte::CteName),
        Arc::new(cte::CteSelfReference),
        Arc::new(cte::RecursiveCte),
        Arc::new(cte::CteColumnList),
        // Windows
        Arc::new(windows::WindowDefinition),
        Arc::new(windows::WindowReference),
        Arc::new(windows::WindowInheritance),
        Arc::new(windows::WindowFrame),
        // Joins
        Arc::new(joins::JoinOn),
        Arc::new(joins::JoinUsing),
        // Policy
        Arc::new(policy::FunctionAllowlist),
        Arc::new(policy::FunctionSignatureCheck),
        Arc::new(policy::StructuralLimit),
    ]
}

/// Report `TYPE_MISMATCH` if both types are known and incomparable
///
/// Returns whether the pair passed.
pub(crate) fn check_comparable(
    ctx: &mut ValidationContext<'_>,
    left: Inferred<DbType>,
    right: Inferred<DbType>,
    node: Node<'_>,
    clause_path: &str,
) -> bool {
    if comparable(left, right) {
        return true;
    }
    if let Inferred::Known((l, r)) = left.zip(right) {
        ctx.add_problem(
            ProblemCode::TypeMismatch,
            format!("Cannot compare {} with {}", l, r),
            node,
            clause_path,
        );
    }
    false
}

/// Infer both expressions and compare their types
pub(crate) fn check_expr_pair<'a>(
    ctx: &mut ValidationContext<'a>,
    left: &'a Expr,
    right: &'a Expr,
    node: Node<'_>,
    clause_path: &str,
) -> bool {
    let l = ctx.infer_type(left);
    let r = ctx.infer_type(right);
    check_comparable(ctx, l, r, node, clause_path)
}

/// Compare two type lists position by position
pub(crate) fn check_positional_types(
    ctx: &mut ValidationContext<'_>,
    left: &[Inferred<DbType>],
    right: &[Inferred<DbType>],
    node: Node<'_>,
    clause_path: &str,
) {
    for (position, (l, r)) in left.iter().zip(right).enumerate() {
        if let Inferred::Known((lt, rt)) = l.zip(*r) {
            if !DbType::comparable(lt, rt) {
                ctx.add_problem(
                    ProblemCode::TypeMismatch,
                    format!(
                        "Column {} has incompatible types {} and {}",
                        position + 1,
                        lt,
                        rt
                    ),
                    node,
                    clause_path,
                );
            }
        }
    }
}

/// Whether an expression is a negative numeric literal
pub(crate) fn is_negative_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(literal) => literal.is_negative(),
        Expr::Unary(unary) if unary.op == sqlvet_ast::UnaryOp::Minus => match unary.operand.as_ref() {
            Expr::Literal(literal) => literal.is_numeric() && !literal.is_negative() && !is_zero(literal),
            _ => false,
        },
        _ => false,
    }
}

fn is_zero(literal: &sqlvet_ast::Literal) -> bool {
    use sqlvet_ast::Literal;
    match literal {
        Literal::Integer(i) => *i == 0,
        Literal::Decimal(d) => d.is_zero(),
        Literal::Float(f) => *f == 0.0,
        _ => false,
    }
}
