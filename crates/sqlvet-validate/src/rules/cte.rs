//! WITH and common table expression rules

use crate::context::ValidationContext;
use crate::projection::projection_arity;
use crate::references::query_references_table;
use crate::registry::Rule;
use indexmap::IndexSet;
use sqlvet_ast::{Cte, Node, NodeKind, Query};
use sqlvet_diagnostics::ProblemCode;
use sqlvet_types::{DbType, Inferred};

/// CTE names are unique within one WITH
pub struct CteName;

impl Rule for CteName {
    fn name(&self) -> &'static str {
        "cte-name"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::With]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::With(with) = node else {
            return;
        };
        let mut seen = IndexSet::new();
        for cte in &with.ctes {
            if !seen.insert(cte.name.normalized()) {
                ctx.add_problem(
                    ProblemCode::CteDuplicateName,
                    format!("CTE '{}' is defined more than once", cte.name),
                    Node::Cte(cte),
                    "with",
                );
            }
        }
    }
}

/// A CTE of a non-recursive WITH may not read itself
pub struct CteSelfReference;

impl Rule for CteSelfReference {
    fn name(&self) -> &'static str {
        "cte-self-reference"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Cte]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Cte(cte) = node else {
            return;
        };
        if ctx.in_recursive_with() {
            return;
        }
        if query_references_table(&cte.query, &cte.name.normalized()) {
            ctx.add_problem(
                ProblemCode::CteSelfReference,
                format!("CTE '{}' references itself; use WITH RECURSIVE", cte.name),
                node,
                "with",
            );
        }
    }
}

/// Structure of a recursive CTE
///
/// In a `WITH RECURSIVE`, a CTE that references itself or whose body is a
/// UNION is checked as recursive: the body is `anchor UNION [ALL] recursive
/// ...`, the anchor does not reference the CTE, some later term does, and
/// every term matches the anchor's columns.
pub struct RecursiveCte;

impl RecursiveCte {
    fn report(ctx: &mut ValidationContext<'_>, cte: &Cte, message: String) {
        ctx.add_problem(
            ProblemCode::CteRecursiveStructureInvalid,
            message,
            Node::Cte(cte),
            "with.recursive",
        );
    }
}

impl Rule for RecursiveCte {
    fn name(&self) -> &'static str {
        "recursive-cte"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Cte]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Cte(cte) = node else {
            return;
        };
        if !ctx.in_recursive_with() {
            return;
        }
        let name = cte.name.normalized();
        let union = match &cte.query {
            Query::Composite(composite) if composite.is_union() => Some(composite),
            _ => None,
        };
        let self_referencing = query_references_table(&cte.query, &name);
        let Some(union) = union else {
            if self_referencing {
                Self::report(
                    ctx,
                    cte,
                    format!(
                        "Recursive CTE '{}' must be a UNION or UNION ALL of an anchor and a recursive term",
                        cte.name
                    ),
                );
            }
            return;
        };

        let Some((anchor, rest)) = union.terms.split_first() else {
            return;
        };
        if query_references_table(anchor, &name) {
            Self::report(
                ctx,
                cte,
                format!("Anchor term of recursive CTE '{}' must not reference it", cte.name),
            );
        }
        if !rest.iter().any(|term| query_references_table(term, &name)) {
            Self::report(
                ctx,
                cte,
                format!("Recursive CTE '{}' has no term that references it", cte.name),
            );
        }

        let anchor_arity = projection_arity(ctx, anchor);
        let anchor_types = ctx.infer_projection_types(anchor);
        for term in rest {
            if let Inferred::Known((a, t)) = anchor_arity.zip(projection_arity(ctx, term)) {
                if a != t {
                    Self::report(
                        ctx,
                        cte,
                        format!(
                            "Recursive term of CTE '{}' has {} columns, the anchor has {}",
                            cte.name, t, a
                        ),
                    );
                    continue;
                }
            }
            let Inferred::Known(anchor_types) = &anchor_types else {
                continue;
            };
            let Inferred::Known(term_types) = ctx.infer_projection_types(term) else {
                continue;
            };
            for (position, (a, t)) in anchor_types.iter().zip(&term_types).enumerate() {
                if let Inferred::Known((at, tt)) = a.zip(*t) {
                    if !DbType::comparable(at, tt) {
                        Self::report(
                            ctx,
                            cte,
                            format!(
                                "Column {} of recursive CTE '{}' is {} in the anchor but {} in a recursive term",
                                position + 1,
                                cte.name,
                                at,
                                tt
                            ),
                        );
                    }
                }
            }
        }
    }
}

/// A CTE column list names every output column of the body
pub struct CteColumnList;

impl Rule for CteColumnList {
    fn name(&self) -> &'static str {
        "cte-column-list"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Cte]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Cte(cte) = node else {
            return;
        };
        if cte.columns.is_empty() {
            return;
        }
        if let Inferred::Known(arity) = projection_arity(ctx, &cte.query) {
            if arity != cte.columns.len() {
                ctx.add_problem(
                    ProblemCode::CteColumnCountMismatch,
                    format!(
                        "CTE '{}' names {} columns but its query returns {}",
                        cte.name,
                        cte.columns.len(),
                        arity
                    ),
                    node,
                    "with",
                );
            }
        }
    }
}
