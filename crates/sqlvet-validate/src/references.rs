//! Syntactic reference searches over query trees

use sqlvet_ast::{ColumnRef, Expr, Node, Query, TableRef};

/// Whether a query mentions `name` as an unqualified FROM table
///
/// A nested WITH that declares a CTE of the same name shadows it, so its
/// subtree is skipped.
pub fn query_references_table(query: &Query, name: &str) -> bool {
    node_references_table(Node::query(query), name)
}

fn node_references_table(node: Node<'_>, name: &str) -> bool {
    match node {
        Node::TableRef(TableRef::Table { name: table, .. })
            if table.is_simple() && table.normalized() == name =>
        {
            return true;
        }
        Node::With(with) if with.ctes.iter().any(|c| c.name.normalized() == name) => {
            return false;
        }
        _ => {}
    }
    node.children()
        .into_iter()
        .any(|child| node_references_table(child, name))
}

/// Qualified column references of a node, not looking into subqueries
pub fn qualified_columns<'a>(node: Node<'a>) -> Vec<&'a ColumnRef> {
    let mut out = Vec::new();
    collect_qualified(node, &mut out);
    out
}

fn collect_qualified<'a>(node: Node<'a>, out: &mut Vec<&'a ColumnRef>) {
    if node.is_query() {
        return;
    }
    if let Node::Expr(Expr::Column(column)) = node {
        if column.table.is_some() {
            out.push(column);
        }
        return;
    }
    for child in node.children() {
        collect_qualified(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlvet_ast::{CompositeQuery, Cte, Predicate, SelectItem, SelectQuery, WithQuery};

    fn from(table: &str) -> SelectQuery {
        SelectQuery::new(vec![SelectItem::Star]).from(TableRef::table(table))
    }

    #[test]
    fn test_finds_reference_in_nested_terms() {
        let query: Query = CompositeQuery::union_all(from("base"), from("Tree")).into();
        assert!(query_references_table(&query, "tree"));
        assert!(!query_references_table(&query, "leaf"));
    }

    #[test]
    fn test_finds_reference_in_subquery_predicate() {
        let query: Query = from("a")
            .filter(Predicate::exists(from("tree")))
            .into();
        assert!(query_references_table(&query, "tree"));
    }

    #[test]
    fn test_shadowing_cte_hides_reference() {
        let inner = WithQuery::new(vec![Cte::new("tree", from("base"))], from("tree"));
        let query: Query = SelectQuery::new(vec![SelectItem::Star])
            .from(TableRef::derived(inner, "x"))
            .into();
        assert!(!query_references_table(&query, "tree"));
    }

    #[test]
    fn test_qualified_columns_skip_subqueries() {
        let predicate = Predicate::and(vec![
            Predicate::eq(Expr::qcol("a", "id"), Expr::col("id")),
            Predicate::exists(
                SelectQuery::new(vec![SelectItem::expr(Expr::qcol("b", "id"))])
                    .from(TableRef::table("b")),
            ),
        ]);
        let found: Vec<_> = qualified_columns(Node::Predicate(&predicate))
            .into_iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(found, vec!["a.id"]);
    }
}
