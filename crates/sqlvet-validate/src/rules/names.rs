//! Name rules: columns, tables, source aliases and column access

use crate::context::ValidationContext;
use crate::registry::Rule;
use indexmap::IndexSet;
use sqlvet_ast::{Expr, Node, NodeKind, SelectItem, TableRef};
use sqlvet_diagnostics::ProblemCode;

/// Every column reference must resolve to exactly one visible source
pub struct ColumnReference;

impl Rule for ColumnReference {
    fn name(&self) -> &'static str {
        "column-reference"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Column]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        if let Node::Expr(Expr::Column(column)) = node {
            ctx.resolve_column(column, true);
        }
    }
}

/// Denied columns may not be read, directly or through a star
pub struct ColumnAccess;

impl Rule for ColumnAccess {
    fn name(&self) -> &'static str {
        "column-access"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Column, NodeKind::SelectItem]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let policy = ctx.access_policy();
        if policy.denied_columns.is_empty() {
            return;
        }
        let path = ctx.clause_path("column_access");
        match node {
            Node::Expr(Expr::Column(column)) => {
                let Some(table) = ctx.column_origin(column) else {
                    return;
                };
                let name = column.name.normalized();
                if policy.is_column_denied(&table.short_name(), &name) {
                    ctx.add_problem(
                        ProblemCode::ColumnAccessDenied,
                        format!("Access to column '{}.{}' is denied", table.short_name(), name),
                        node,
                        &path,
                    );
                }
            }
            Node::SelectItem(item @ (SelectItem::Star | SelectItem::QualifiedStar(_))) => {
                let qualifier = match item {
                    SelectItem::QualifiedStar(q) => Some(q.normalized()),
                    _ => None,
                };
                for table in ctx.star_tables(qualifier.as_deref()) {
                    let short = table.short_name();
                    for column in table.columns() {
                        if policy.is_column_denied(&short, &column.name) {
                            ctx.add_problem(
                                ProblemCode::ColumnAccessDenied,
                                format!(
                                    "Access to column '{}.{}' is denied; it is expanded by {}",
                                    short,
                                    column.name.to_lowercase(),
                                    item
                                ),
                                node,
                                &path,
                            );
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// FROM references must name a CTE in scope or a catalog table
pub struct TableReference;

impl Rule for TableReference {
    fn name(&self) -> &'static str {
        "table-reference"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::TableRef]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::TableRef(TableRef::Table { name, .. }) = node else {
            return;
        };
        let normalized = name.normalized();
        if name.is_simple() && (ctx.is_cte_visible(&normalized) || ctx.is_defining_cte(&normalized)) {
            return;
        }
        if ctx.catalog().table(&normalized).is_none() {
            ctx.add_problem(
                ProblemCode::TableNotFound,
                format!("Table '{}' not found", name),
                node,
                "from",
            );
        }
    }
}

/// Two FROM sources of one SELECT may not share a name
pub struct DuplicateSourceAlias;

impl Rule for DuplicateSourceAlias {
    fn name(&self) -> &'static str {
        "duplicate-source-alias"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Select]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Select(select) = node else {
            return;
        };
        let mut seen = IndexSet::new();
        let mut reported = IndexSet::new();
        for relation in select.relations() {
            let Some(key) = relation.source_key() else {
                continue;
            };
            if !seen.insert(key.clone()) && reported.insert(key.clone()) {
                ctx.add_problem(
                    ProblemCode::SourceAliasDuplicate,
                    format!("Source name '{}' is used more than once in FROM", key),
                    Node::TableRef(relation),
                    "from",
                );
            }
        }
    }
}
