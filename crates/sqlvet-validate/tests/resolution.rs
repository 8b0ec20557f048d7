//! Name resolution: columns, tables, aliases, correlation and column access

mod common;

use common::{catalog, check, check_in, codes, codes_in, items, select_from, star_from};
use pretty_assertions::assert_eq;
use sqlvet_ast::{Expr, Join, Predicate, SelectItem, SelectQuery, TableRef};
use sqlvet_catalog::AccessPolicy;
use sqlvet_diagnostics::ProblemCode;

// ============================================================================
// Columns
// ============================================================================

#[test]
fn test_valid_query_has_no_problems() {
    let query = select_from("users", vec![Expr::col("id"), Expr::col("name")])
        .filter(Predicate::Unary(Expr::col("active")));
    assert_eq!(check(query), vec![]);
}

#[test]
fn test_unknown_column() {
    let problems = check(select_from("users", vec![Expr::col("nickname")]));
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code, ProblemCode::ColumnNotFound);
    assert_eq!(problems[0].clause_path, "select");
    assert_eq!(problems[0].node, "nickname");
    assert!(problems[0].message.contains("nickname"));
}

#[test]
fn test_ambiguous_unqualified_column() {
    let query = SelectQuery::new(items(vec![Expr::col("id")]))
        .from(TableRef::table("users"))
        .join(Join::inner(
            TableRef::table("orders"),
            Predicate::eq(Expr::qcol("users", "id"), Expr::qcol("orders", "user_id")),
        ));
    assert_eq!(codes(query), vec![ProblemCode::ColumnAmbiguous]);
}

#[test]
fn test_resolution_is_case_insensitive() {
    let query = select_from("USERS", vec![Expr::qcol("Users", "ID"), Expr::col("Email")]);
    assert_eq!(codes(query), vec![]);
}

#[test]
fn test_alias_hides_table_name() {
    let query = SelectQuery::new(items(vec![Expr::qcol("users", "id")]))
        .from(TableRef::aliased("users", "u"));
    assert_eq!(codes(query), vec![ProblemCode::ColumnNotFound]);

    let query = SelectQuery::new(items(vec![Expr::qcol("u", "id")]))
        .from(TableRef::aliased("users", "u"));
    assert_eq!(codes(query), vec![]);
}

#[test]
fn test_where_does_not_see_output_aliases() {
    let query = SelectQuery::new(vec![SelectItem::aliased(Expr::col("name"), "n")])
        .from(TableRef::table("users"))
        .filter(Predicate::eq(Expr::col("n"), Expr::string("x")));
    assert_eq!(codes(query), vec![ProblemCode::ColumnNotFound]);
}

#[test]
fn test_order_by_sees_output_aliases() {
    let query = SelectQuery::new(vec![SelectItem::aliased(Expr::col("name"), "n")])
        .from(TableRef::table("users"))
        .order_by(vec![sqlvet_ast::OrderItem::asc(Expr::col("n"))]);
    assert_eq!(codes(query), vec![]);
}

// ============================================================================
// Tables and sources
// ============================================================================

#[test]
fn test_unknown_table_is_reported_once() {
    // Columns of an unknown table are not reported on top
    let query = select_from("customers", vec![Expr::col("id"), Expr::col("whatever")]);
    assert_eq!(codes(query), vec![ProblemCode::TableNotFound]);
}

#[test]
fn test_duplicate_source_alias() {
    let query = SelectQuery::new(items(vec![Expr::int(1)]))
        .from(TableRef::aliased("users", "u"))
        .join(Join::cross(TableRef::aliased("orders", "u")));
    let problems = check(query);
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code, ProblemCode::SourceAliasDuplicate);
    assert_eq!(problems[0].clause_path, "from");
}

#[test]
fn test_derived_table_columns() {
    let inner = SelectQuery::new(vec![
        SelectItem::expr(Expr::col("user_id")),
        SelectItem::aliased(Expr::func("sum", vec![Expr::col("amount")]), "total"),
    ])
    .from(TableRef::table("orders"))
    .group_by(vec![Expr::col("user_id").into()]);

    let query = SelectQuery::new(items(vec![Expr::qcol("d", "total"), Expr::qcol("d", "user_id")]))
        .from(TableRef::derived(inner.clone(), "d"));
    assert_eq!(codes(query), vec![]);

    let query = SelectQuery::new(items(vec![Expr::qcol("d", "amount")]))
        .from(TableRef::derived(inner, "d"));
    assert_eq!(codes(query), vec![ProblemCode::ColumnNotFound]);
}

#[test]
fn test_derived_table_does_not_see_siblings_unless_lateral() {
    let inner = select_from("orders", vec![Expr::qcol("u", "id")]);

    let plain = SelectQuery::new(items(vec![Expr::int(1)]))
        .from(TableRef::aliased("users", "u"))
        .join(Join::cross(TableRef::derived(inner.clone(), "d")));
    assert_eq!(codes(plain), vec![ProblemCode::ColumnNotFound]);

    let lateral = SelectQuery::new(items(vec![Expr::int(1)]))
        .from(TableRef::aliased("users", "u"))
        .join(Join::cross(TableRef::lateral(inner, "d")));
    assert_eq!(codes(lateral), vec![]);
}

// ============================================================================
// Correlation
// ============================================================================

#[test]
fn test_correlated_exists() {
    let inner = SelectQuery::new(items(vec![Expr::int(1)]))
        .from(TableRef::aliased("orders", "o"))
        .filter(Predicate::eq(Expr::qcol("o", "user_id"), Expr::qcol("u", "id")));
    let query = SelectQuery::new(items(vec![Expr::col("name")]))
        .from(TableRef::aliased("users", "u"))
        .filter(Predicate::exists(inner));
    assert_eq!(codes(query), vec![]);
}

#[test]
fn test_unqualified_column_resolves_outward() {
    // `email` is not a column of orders; it comes from the enclosing users
    let inner = select_from("orders", vec![Expr::int(1)])
        .filter(Predicate::eq(Expr::col("email"), Expr::col("status")));
    let query = select_from("users", vec![Expr::col("name")]).filter(Predicate::exists(inner));
    assert_eq!(codes(query), vec![]);
}

#[test]
fn test_nearest_scope_wins() {
    // Both scopes expose `id`; the inner one shadows the outer one
    let inner = select_from("orders", vec![Expr::col("id")]);
    let query = select_from("users", vec![Expr::col("name")])
        .filter(Predicate::in_subquery(Expr::col("id"), inner));
    assert_eq!(codes(query), vec![]);
}

#[test]
fn test_join_on_cannot_see_later_sources() {
    let query = SelectQuery::new(items(vec![Expr::int(1)]))
        .from(TableRef::aliased("users", "u"))
        .join(Join::inner(
            TableRef::aliased("orders", "o"),
            Predicate::eq(Expr::qcol("o", "user_id"), Expr::qcol("p", "id")),
        ))
        .join(Join::inner(
            TableRef::aliased("products", "p"),
            Predicate::eq(Expr::qcol("p", "id"), Expr::qcol("o", "id")),
        ));
    let problems = check(query);
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code, ProblemCode::JoinOnInvalidReference);
    assert!(problems[0].message.contains("'p'"));
}

// ============================================================================
// Column access
// ============================================================================

fn restricted() -> sqlvet_catalog::InMemoryCatalog {
    catalog().with_access_policy(AccessPolicy::unrestricted().deny_column("users", "ssn"))
}

#[test]
fn test_denied_column() {
    let problems = check_in(&restricted(), select_from("users", vec![Expr::col("ssn")]));
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code, ProblemCode::ColumnAccessDenied);
    assert_eq!(problems[0].clause_path, "select.column_access");
}

#[test]
fn test_denied_column_through_star() {
    assert_eq!(
        codes_in(&restricted(), star_from("users")),
        vec![ProblemCode::ColumnAccessDenied]
    );
    // A star over another table does not touch users.ssn
    assert_eq!(codes_in(&restricted(), star_from("orders")), vec![]);
}

#[test]
fn test_denied_column_in_where_through_alias() {
    let query = SelectQuery::new(items(vec![Expr::qcol("u", "name")]))
        .from(TableRef::aliased("users", "u"))
        .filter(Predicate::is_null(Expr::qcol("u", "SSN")));
    assert_eq!(codes_in(&restricted(), query), vec![ProblemCode::ColumnAccessDenied]);
}

#[test]
fn test_denied_column_through_qualified_star() {
    let star_of = |qualifier: &str| {
        SelectQuery::new(vec![SelectItem::qualified_star(qualifier)])
            .from(TableRef::aliased("users", "u"))
            .join(Join::cross(TableRef::aliased("orders", "o")))
    };
    assert_eq!(codes_in(&restricted(), star_of("o")), vec![]);
    assert_eq!(codes_in(&restricted(), star_of("u")), vec![ProblemCode::ColumnAccessDenied]);
}
