//! Join rules

use super::check_comparable;
use crate::context::ValidationContext;
use crate::references::qualified_columns;
use crate::registry::Rule;
use indexmap::IndexSet;
use sqlvet_ast::{JoinConstraint, JoinKind, Node, NodeKind};
use sqlvet_diagnostics::ProblemCode;
use sqlvet_types::Inferred;

/// Joins other than CROSS need a condition, and an ON condition may only
/// use sources joined so far
pub struct JoinOn;

impl Rule for JoinOn {
    fn name(&self) -> &'static str {
        "join-on"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Join]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Join(join) = node else {
            return;
        };
        let predicate = match &join.constraint {
            JoinConstraint::None if join.kind != JoinKind::Cross => {
                ctx.add_problem(
                    ProblemCode::JoinOnMissingPredicate,
                    format!("{} requires an ON or USING condition", join.kind.keyword()),
                    node,
                    "from.join",
                );
                return;
            }
            JoinConstraint::On(predicate) => predicate,
            _ => return,
        };

        let visible = ctx.on_join_visible_aliases(join);
        let bound = ctx.current_scope_source_keys();
        let mut reported = IndexSet::new();
        for column in qualified_columns(Node::Predicate(predicate)) {
            let Some(qualifier) = &column.table else {
                continue;
            };
            let key = qualifier.normalized();
            if bound.contains(&key) && !visible.contains(&key) && reported.insert(key.clone()) {
                ctx.add_problem(
                    ProblemCode::JoinOnInvalidReference,
                    format!(
                        "ON condition references '{}', which is joined later",
                        qualifier
                    ),
                    Node::Predicate(predicate),
                    "from.join",
                );
            }
        }
    }
}

/// USING columns exist exactly once on each side, with comparable types
pub struct JoinUsing;

impl Rule for JoinUsing {
    fn name(&self) -> &'static str {
        "join-using"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Join]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Join(join) = node else {
            return;
        };
        let JoinConstraint::Using(columns) = &join.constraint else {
            return;
        };
        for column in columns {
            let name = column.normalized();

            let left = ctx.left_sources_with_column(join, &name);
            let left_type = match left.sources.as_slice() {
                [(_, ty)] => Some(*ty),
                [] if left.open => Some(Inferred::Unknown),
                found => {
                    let message = if found.is_empty() {
                        format!("USING column '{}' does not exist on the left side of the join", column)
                    } else {
                        format!(
                            "USING column '{}' is ambiguous on the left side of the join ({} sources)",
                            column,
                            found.len()
                        )
                    };
                    ctx.add_problem(ProblemCode::JoinUsingInvalidColumn, message, node, "from.join");
                    None
                }
            };

            let right_type = match ctx.join_relation_exposes(join, &name) {
                (Inferred::Known(false), _) => {
                    ctx.add_problem(
                        ProblemCode::JoinUsingInvalidColumn,
                        format!("USING column '{}' does not exist on the right side of the join", column),
                        node,
                        "from.join",
                    );
                    None
                }
                (_, ty) => Some(ty),
            };

            if let (Some(l), Some(r)) = (left_type, right_type) {
                check_comparable(ctx, l, r, node, "from.join");
            }
        }
    }
}
