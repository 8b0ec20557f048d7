//! Common table expressions: visibility, names, column lists, recursion

mod common;

use common::{check, codes, items, select_from};
use pretty_assertions::assert_eq;
use sqlvet_ast::{
    BinaryOp, ComparisonOp, CompositeQuery, Cte, Expr, Join, Predicate, SelectItem, SelectQuery,
    TableRef, WithQuery,
};
use sqlvet_diagnostics::ProblemCode;

fn totals() -> Cte {
    Cte::new(
        "totals",
        SelectQuery::new(vec![
            SelectItem::expr(Expr::col("user_id")),
            SelectItem::aliased(Expr::func("sum", vec![Expr::col("amount")]), "total"),
        ])
        .from(TableRef::table("orders"))
        .group_by(vec![Expr::col("user_id").into()]),
    )
}

// ============================================================================
// Visibility
// ============================================================================

#[test]
fn test_cte_columns_are_visible_to_the_body() {
    let body = SelectQuery::new(items(vec![Expr::col("name"), Expr::qcol("t", "total")]))
        .from(TableRef::aliased("users", "u"))
        .join(Join::inner(
            TableRef::aliased("totals", "t"),
            Predicate::eq(Expr::qcol("t", "user_id"), Expr::qcol("u", "id")),
        ));
    assert_eq!(codes(WithQuery::new(vec![totals()], body)), vec![]);
}

#[test]
fn test_cte_column_types_are_inferred() {
    let body = select_from("totals", vec![Expr::col("user_id")])
        .filter(Predicate::eq(Expr::col("total"), Expr::string("big")));
    assert_eq!(codes(WithQuery::new(vec![totals()], body)), vec![ProblemCode::TypeMismatch]);
}

#[test]
fn test_unknown_cte_column() {
    let body = select_from("totals", vec![Expr::col("amount")]);
    assert_eq!(codes(WithQuery::new(vec![totals()], body)), vec![ProblemCode::ColumnNotFound]);
}

#[test]
fn test_later_cte_sees_earlier_one() {
    let first = Cte::new("a", select_from("users", vec![Expr::col("id")]));
    let second = Cte::new("b", select_from("a", vec![Expr::col("id")]));
    let query = WithQuery::new(vec![first, second], select_from("b", vec![Expr::col("id")]));
    assert_eq!(codes(query), vec![]);
}

#[test]
fn test_earlier_cte_does_not_see_later_one() {
    let first = Cte::new("a", select_from("b", vec![Expr::col("id")]));
    let second = Cte::new("b", select_from("users", vec![Expr::col("id")]));
    let query = WithQuery::new(vec![first, second], select_from("a", vec![Expr::int(1)]));
    assert_eq!(codes(query), vec![ProblemCode::TableNotFound]);
}

#[test]
fn test_cte_is_visible_in_nested_queries() {
    let inner = select_from("totals", vec![Expr::col("user_id")]);
    let body = SelectQuery::new(items(vec![Expr::qcol("x", "user_id")]))
        .from(TableRef::derived(inner, "x"));
    assert_eq!(codes(WithQuery::new(vec![totals()], body)), vec![]);
}

#[test]
fn test_cte_shadows_catalog_table() {
    // `users` here is the CTE with a single column
    let cte = Cte::new("users", select_from("orders", vec![Expr::col("status")]));
    let body = select_from("users", vec![Expr::col("name")]);
    assert_eq!(codes(WithQuery::new(vec![cte], body)), vec![ProblemCode::ColumnNotFound]);
}

// ============================================================================
// Names and column lists
// ============================================================================

#[test]
fn test_duplicate_cte_name() {
    let first = Cte::new("c", select_from("users", vec![Expr::col("id")]));
    let second = Cte::new("C", select_from("orders", vec![Expr::col("id")]));
    let problems = check(WithQuery::new(vec![first, second], select_from("c", vec![Expr::col("id")])));
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code, ProblemCode::CteDuplicateName);
    assert_eq!(problems[0].clause_path, "with");
}

#[test]
fn test_column_list_renames() {
    let cte = Cte::new("c", select_from("users", vec![Expr::col("id")])).columns(&["user_key"]);
    let body = select_from("c", vec![Expr::col("user_key")]);
    assert_eq!(codes(WithQuery::new(vec![cte], body)), vec![]);
}

#[test]
fn test_column_list_length() {
    let cte = Cte::new("c", select_from("users", vec![Expr::col("id")])).columns(&["a", "b"]);
    let body = select_from("c", vec![Expr::int(1)]);
    assert_eq!(codes(WithQuery::new(vec![cte], body)), vec![ProblemCode::CteColumnCountMismatch]);
}

#[test]
fn test_self_reference_needs_recursive() {
    let cte = Cte::new("c", select_from("c", vec![Expr::col("id")]));
    let query = WithQuery::new(vec![cte], select_from("c", vec![Expr::col("id")]));
    assert_eq!(codes(query), vec![ProblemCode::CteSelfReference]);
}

// ============================================================================
// Recursion
// ============================================================================

fn counter(anchor: SelectQuery, step: SelectQuery) -> Cte {
    Cte::new("nums", CompositeQuery::union_all(anchor, step)).columns(&["n"])
}

fn step() -> SelectQuery {
    select_from("nums", vec![Expr::binary(Expr::col("n"), BinaryOp::Add, Expr::int(1))]).filter(
        Predicate::compare(Expr::col("n"), ComparisonOp::Lt, Expr::int(10)),
    )
}

fn anchor() -> SelectQuery {
    SelectQuery::new(items(vec![Expr::int(1)]))
}

#[test]
fn test_recursive_counter() {
    let query = WithQuery::recursive(
        vec![counter(anchor(), step())],
        select_from("nums", vec![Expr::col("n")]),
    );
    assert_eq!(codes(query), vec![]);
}

#[test]
fn test_recursive_without_union() {
    let cte = Cte::new("c", select_from("c", vec![Expr::col("id")]));
    let query = WithQuery::recursive(vec![cte], select_from("c", vec![Expr::int(1)]));
    let problems = check(query);
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code, ProblemCode::CteRecursiveStructureInvalid);
    assert_eq!(problems[0].clause_path, "with.recursive");
}

#[test]
fn test_recursive_anchor_must_not_self_reference() {
    let query = WithQuery::recursive(
        vec![counter(step(), step())],
        select_from("nums", vec![Expr::col("n")]),
    );
    assert_eq!(codes(query), vec![ProblemCode::CteRecursiveStructureInvalid]);
}

#[test]
fn test_recursive_union_without_recursive_term() {
    let cte = Cte::new("c", CompositeQuery::union(anchor(), anchor()));
    let query = WithQuery::recursive(vec![cte], select_from("c", vec![Expr::int(1)]));
    assert_eq!(codes(query), vec![ProblemCode::CteRecursiveStructureInvalid]);
}

#[test]
fn test_recursive_term_width() {
    let wide_anchor = SelectQuery::new(items(vec![Expr::int(1), Expr::int(2)]));
    let cte = Cte::new(
        "nums",
        CompositeQuery::union_all(wide_anchor, select_from("nums", vec![Expr::col("n")])),
    )
    .columns(&["n", "m"]);
    let query = WithQuery::recursive(vec![cte], select_from("nums", vec![Expr::col("m")]));
    assert_eq!(
        codes(query),
        vec![
            ProblemCode::CteRecursiveStructureInvalid,
            ProblemCode::SetOperationColumnCountMismatch,
        ]
    );
}

#[test]
fn test_recursive_term_types() {
    let typed_step = select_from("nums", vec![Expr::string("x")]);
    let query = WithQuery::recursive(
        vec![counter(anchor(), typed_step)],
        select_from("nums", vec![Expr::col("n")]),
    );
    // Reported by the CTE structure check and by the UNION itself
    assert_eq!(
        codes(query),
        vec![ProblemCode::CteRecursiveStructureInvalid, ProblemCode::TypeMismatch]
    );
}
