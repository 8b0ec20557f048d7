//! ORDER BY ordinals and LIMIT / OFFSET

use super::is_negative_literal;
use crate::context::ValidationContext;
use crate::projection::projection_arity;
use crate::registry::Rule;
use crate::shape::check_scalar_operand;
use sqlvet_ast::{Expr, Node, NodeKind, OrderItem, SelectItem, SelectQuery};
use sqlvet_diagnostics::ProblemCode;
use sqlvet_types::Inferred;

/// What a 1-based select-list position refers to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrdinalTarget<'q> {
    Expr(&'q Expr),
    /// A column produced by `*` or `t.*`
    Star,
    /// Past the end; carries the select-list width
    OutOfRange(usize),
    /// A star before the position expands to an unknown number of columns
    Unknown,
}

/// Locate a select-list position, expanding stars in the current scope
pub fn ordinal_target<'q>(
    ctx: &mut ValidationContext<'_>,
    select: &'q SelectQuery,
    ordinal: i64,
) -> OrdinalTarget<'q> {
    let position = usize::try_from(ordinal).unwrap_or(0);
    let mut end = 0usize;
    for item in &select.items {
        let width = match item {
            SelectItem::Expr { .. } => Inferred::Known(1),
            SelectItem::Star => ctx.star_width(None),
            SelectItem::QualifiedStar(q) => ctx.star_width(Some(q.normalized().as_str())),
        };
        let Inferred::Known(width) = width else {
            return OrdinalTarget::Unknown;
        };
        let start = end + 1;
        end += width;
        if (start..=end).contains(&position) {
            return match item {
                SelectItem::Expr { expr, .. } => OrdinalTarget::Expr(expr),
                _ => OrdinalTarget::Star,
            };
        }
    }
    OrdinalTarget::OutOfRange(end)
}

/// ORDER BY positions must name a select-list column
pub struct OrderByOrdinal;

impl OrderByOrdinal {
    fn report(ctx: &mut ValidationContext<'_>, item: &OrderItem, message: String) {
        ctx.add_problem(
            ProblemCode::OrderByInvalidOrdinal,
            message,
            Node::Expr(&item.expr),
            "order_by",
        );
    }
}

impl Rule for OrderByOrdinal {
    fn name(&self) -> &'static str {
        "order-by-ordinal"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Select, NodeKind::Composite]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        match node {
            Node::Select(select) => {
                for item in &select.order_by {
                    let Some(ordinal) = item.expr.as_integer() else {
                        continue;
                    };
                    match ordinal_target(ctx, select, ordinal) {
                        OrdinalTarget::Expr(_) | OrdinalTarget::Unknown => {}
                        OrdinalTarget::Star => Self::report(
                            ctx,
                            item,
                            format!("ORDER BY position {} refers to a * item", ordinal),
                        ),
                        OrdinalTarget::OutOfRange(width) => Self::report(
                            ctx,
                            item,
                            format!(
                                "ORDER BY position {} is not in the select list ({} columns)",
                                ordinal, width
                            ),
                        ),
                    }
                }
            }
            Node::Composite(composite) => {
                let Some(first) = composite.terms.first() else {
                    return;
                };
                for item in &composite.order_by {
                    let Some(ordinal) = item.expr.as_integer() else {
                        continue;
                    };
                    if let Inferred::Known(width) = projection_arity(ctx, first) {
                        let position = usize::try_from(ordinal).unwrap_or(0);
                        if position == 0 || position > width {
                            Self::report(
                                ctx,
                                item,
                                format!(
                                    "ORDER BY position {} is not in the select list ({} columns)",
                                    ordinal, width
                                ),
                            );
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// LIMIT and OFFSET take a non-negative number
pub struct LimitOffset;

impl LimitOffset {
    fn check_value<'a>(ctx: &mut ValidationContext<'a>, keyword: &str, expr: &'a Expr) {
        let path = format!("limit.{}", keyword.to_lowercase());
        if !check_scalar_operand(ctx, expr, &path) {
            return;
        }
        if let Inferred::Known(ty) = ctx.infer_type(expr) {
            if !ty.is_numeric() {
                ctx.add_problem(
                    ProblemCode::LimitOffsetInvalid,
                    format!("{} must be numeric, found {}", keyword, ty),
                    Node::Expr(expr),
                    &path,
                );
                return;
            }
        }
        if is_negative_literal(expr) {
            ctx.add_problem(
                ProblemCode::LimitOffsetInvalid,
                format!("{} must not be negative", keyword),
                Node::Expr(expr),
                &path,
            );
        }
    }
}

impl Rule for LimitOffset {
    fn name(&self) -> &'static str {
        "limit-offset"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Select, NodeKind::Composite]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let (limit, offset) = match node {
            Node::Select(select) => (&select.limit, &select.offset),
            Node::Composite(composite) => (&composite.limit, &composite.offset),
            _ => return,
        };
        if let Some(limit) = limit {
            Self::check_value(ctx, "LIMIT", limit);
        }
        if let Some(offset) = offset {
            Self::check_value(ctx, "OFFSET", offset);
        }
    }
}
