//! Type rules: predicates, arithmetic, CASE and subquery shapes

mod common;

use common::{check, codes, items, select_from};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sqlvet_ast::{
    BinaryOp, ComparisonOp, Expr, FunctionArg, FunctionCall, Predicate, Quantifier, SelectItem,
    SelectQuery,
};
use sqlvet_diagnostics::ProblemCode;

fn where_users(predicate: Predicate) -> SelectQuery {
    select_from("users", vec![Expr::col("id")]).filter(predicate)
}

// ============================================================================
// Comparisons
// ============================================================================

#[rstest]
#[case::int_int(Expr::col("id"), Expr::int(1), vec![])]
#[case::int_float(Expr::col("id"), Expr::Literal(sqlvet_ast::Literal::Float(1.5)), vec![])]
#[case::int_string(Expr::col("id"), Expr::string("1"), vec![ProblemCode::TypeMismatch])]
#[case::timestamp_string(Expr::col("created_at"), Expr::string("2024-01-01"), vec![])]
#[case::bool_int(Expr::col("active"), Expr::int(1), vec![ProblemCode::TypeMismatch])]
#[case::null_anything(Expr::col("name"), Expr::null(), vec![])]
#[case::parameter(Expr::col("created_at"), Expr::Parameter("$1".into()), vec![])]
fn test_comparison_types(#[case] left: Expr, #[case] right: Expr, #[case] expected: Vec<ProblemCode>) {
    assert_eq!(codes(where_users(Predicate::eq(left, right))), expected);
}

#[test]
fn test_type_mismatch_location() {
    let problems = check(where_users(Predicate::eq(Expr::col("name"), Expr::col("active"))));
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code, ProblemCode::TypeMismatch);
    assert_eq!(problems[0].clause_path, "where.comparison");
    assert_eq!(problems[0].node, "name = active");
}

#[test]
fn test_between_checks_both_bounds() {
    let ok = Predicate::between(Expr::col("id"), Expr::int(1), Expr::int(10));
    assert_eq!(codes(where_users(ok)), vec![]);

    let bad = Predicate::between(Expr::col("id"), Expr::string("a"), Expr::boolean(true));
    assert_eq!(
        codes(where_users(bad)),
        vec![ProblemCode::TypeMismatch, ProblemCode::TypeMismatch]
    );
}

#[test]
fn test_like_requires_strings() {
    let ok = Predicate::like(Expr::col("email"), Expr::string("%@example.com"));
    assert_eq!(codes(where_users(ok)), vec![]);

    let bad = Predicate::like(Expr::col("id"), Expr::string("1%"));
    assert_eq!(codes(where_users(bad)), vec![ProblemCode::TypeMismatch]);
}

#[test]
fn test_in_list_types() {
    let ok = Predicate::in_list(Expr::col("id"), vec![Expr::int(1), Expr::int(2)]);
    assert_eq!(codes(where_users(ok)), vec![]);

    let bad = Predicate::in_list(Expr::col("id"), vec![Expr::int(1), Expr::string("two")]);
    assert_eq!(codes(where_users(bad)), vec![ProblemCode::TypeMismatch]);
}

#[test]
fn test_in_subquery_must_have_one_column() {
    let inner = select_from("orders", vec![Expr::col("user_id"), Expr::col("status")]);
    let problems = check(where_users(Predicate::in_subquery(Expr::col("id"), inner)));
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code, ProblemCode::SubqueryShapeMismatch);
    assert_eq!(problems[0].clause_path, "where.in");
}

#[test]
fn test_in_subquery_types() {
    let inner = select_from("orders", vec![Expr::col("status")]);
    assert_eq!(
        codes(where_users(Predicate::in_subquery(Expr::col("id"), inner))),
        vec![ProblemCode::TypeMismatch]
    );
}

#[test]
fn test_row_in_subquery_arity() {
    let inner = select_from("orders", vec![Expr::col("user_id"), Expr::col("status")]);
    let ok = Predicate::in_subquery(Expr::row(vec![Expr::col("id"), Expr::col("name")]), inner.clone());
    assert_eq!(codes(where_users(ok)), vec![]);

    let bad = Predicate::in_subquery(
        Expr::row(vec![Expr::col("id"), Expr::col("name"), Expr::col("email")]),
        inner,
    );
    assert_eq!(codes(where_users(bad)), vec![ProblemCode::RowArityMismatch]);
}

#[test]
fn test_row_comparison() {
    let ok = Predicate::eq(
        Expr::row(vec![Expr::col("id"), Expr::col("name")]),
        Expr::row(vec![Expr::int(1), Expr::string("a")]),
    );
    assert_eq!(codes(where_users(ok)), vec![]);

    let short = Predicate::eq(
        Expr::row(vec![Expr::col("id"), Expr::col("name")]),
        Expr::row(vec![Expr::int(1)]),
    );
    assert_eq!(codes(where_users(short)), vec![ProblemCode::RowArityMismatch]);
}

#[test]
fn test_scalar_subquery_shape() {
    let wide = select_from("orders", vec![Expr::col("user_id"), Expr::col("status")]);
    let predicate = Predicate::eq(Expr::col("id"), Expr::subquery(wide));
    assert_eq!(codes(where_users(predicate)), vec![ProblemCode::SubqueryShapeMismatch]);

    let narrow = select_from("orders", vec![Expr::col("user_id")]);
    let predicate = Predicate::eq(Expr::col("id"), Expr::subquery(narrow));
    assert_eq!(codes(where_users(predicate)), vec![]);
}

#[test]
fn test_quantified_subquery() {
    let amounts = select_from("orders", vec![Expr::col("amount")]);
    let ok = Predicate::quantified(Expr::col("id"), ComparisonOp::Gt, Quantifier::All, amounts);
    assert_eq!(codes(where_users(ok)), vec![]);

    let statuses = select_from("orders", vec![Expr::col("status")]);
    let bad = Predicate::quantified(Expr::col("id"), ComparisonOp::Eq, Quantifier::Any, statuses);
    assert_eq!(codes(where_users(bad)), vec![ProblemCode::TypeMismatch]);

    let wide = select_from("orders", vec![Expr::col("id"), Expr::col("status")]);
    let bad = Predicate::quantified(Expr::col("id"), ComparisonOp::Eq, Quantifier::Any, wide);
    assert_eq!(codes(where_users(bad)), vec![ProblemCode::SubqueryShapeMismatch]);
}

#[test]
fn test_distinct_from() {
    let ok = Predicate::distinct_from(Expr::col("email"), Expr::col("name"));
    assert_eq!(codes(where_users(ok)), vec![]);

    let bad = Predicate::distinct_from(Expr::col("email"), Expr::col("id"));
    assert_eq!(codes(where_users(bad)), vec![ProblemCode::TypeMismatch]);
}

#[test]
fn test_bare_condition_must_be_boolean() {
    assert_eq!(codes(where_users(Predicate::Unary(Expr::col("active")))), vec![]);
    assert_eq!(
        codes(where_users(Predicate::Unary(Expr::col("name")))),
        vec![ProblemCode::TypeMismatch]
    );
}

// ============================================================================
// Expressions
// ============================================================================

#[rstest]
#[case::numeric(Expr::binary(Expr::col("id"), BinaryOp::Multiply, Expr::int(2)), vec![])]
#[case::date_interval(
    Expr::binary(Expr::col("created_at"), BinaryOp::Add, Expr::interval("1 day")),
    vec![]
)]
#[case::concat(Expr::binary(Expr::col("name"), BinaryOp::Concat, Expr::col("id")), vec![])]
#[case::string_plus_int(
    Expr::binary(Expr::col("name"), BinaryOp::Add, Expr::int(1)),
    vec![ProblemCode::TypeMismatch]
)]
#[case::negated_string(Expr::neg(Expr::col("email")), vec![ProblemCode::TypeMismatch])]
fn test_arithmetic(#[case] expr: Expr, #[case] expected: Vec<ProblemCode>) {
    assert_eq!(codes(select_from("users", vec![expr])), expected);
}

#[test]
fn test_arithmetic_mismatch_is_reported_at_the_innermost_node() {
    // (name + 1) * 2: the outer product sees an unknown left operand
    let expr = Expr::binary(
        Expr::binary(Expr::col("name"), BinaryOp::Add, Expr::int(1)),
        BinaryOp::Multiply,
        Expr::int(2),
    );
    let problems = check(select_from("users", vec![expr]));
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].node, "name + 1");
    assert_eq!(problems[0].clause_path, "select.arithmetic");
}

#[test]
fn test_case_branches_must_agree() {
    let ok = Expr::case(
        vec![(Expr::predicate(Predicate::Unary(Expr::col("active"))), Expr::col("name"))],
        Some(Expr::string("inactive")),
    );
    assert_eq!(codes(select_from("users", vec![ok])), vec![]);

    let bad = Expr::case(
        vec![(Expr::predicate(Predicate::Unary(Expr::col("active"))), Expr::col("name"))],
        Some(Expr::col("id")),
    );
    assert_eq!(codes(select_from("users", vec![bad])), vec![ProblemCode::TypeMismatch]);
}

#[test]
fn test_searched_case_conditions_must_be_boolean() {
    let bad = Expr::case(vec![(Expr::col("id"), Expr::int(1))], None);
    assert_eq!(codes(select_from("users", vec![bad])), vec![ProblemCode::TypeMismatch]);
}

#[test]
fn test_cast_result_type_is_used() {
    let predicate = Predicate::eq(Expr::cast(Expr::col("name"), "integer"), Expr::col("id"));
    assert_eq!(codes(where_users(predicate)), vec![]);

    let predicate = Predicate::eq(Expr::cast(Expr::col("id"), "boolean"), Expr::col("id"));
    assert_eq!(codes(where_users(predicate)), vec![ProblemCode::TypeMismatch]);
}

#[test]
fn test_derived_column_types_flow_outward() {
    let inner = SelectQuery::new(vec![SelectItem::aliased(Expr::col("status"), "s")])
        .from(sqlvet_ast::TableRef::table("orders"));
    let query = SelectQuery::new(items(vec![Expr::int(1)]))
        .from(sqlvet_ast::TableRef::derived(inner, "d"))
        .filter(Predicate::eq(Expr::qcol("d", "s"), Expr::int(1)));
    assert_eq!(codes(query), vec![ProblemCode::TypeMismatch]);
}

#[test]
fn test_aggregate_filter_is_checked() {
    let call = FunctionCall::new("count", vec![FunctionArg::Star])
        .with_filter(Predicate::eq(Expr::col("status"), Expr::int(1)));
    let query = select_from("orders", vec![Expr::Function(call)]);
    assert_eq!(codes(query), vec![ProblemCode::TypeMismatch]);
}
