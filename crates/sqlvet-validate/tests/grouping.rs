//! Aggregation legality, GROUP BY / ORDER BY ordinals, LIMIT and OFFSET

mod common;

use common::{check, codes, items, select_from, star_from};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sqlvet_ast::{
    BinaryOp, ComparisonOp, Expr, GroupingElement, OrderItem, OverClause, Predicate, SelectItem, SelectQuery,
    TableRef, WindowSpec,
};
use sqlvet_diagnostics::ProblemCode;

fn orders_by_status(exprs: Vec<Expr>) -> SelectQuery {
    select_from("orders", exprs).group_by(vec![Expr::col("status").into()])
}

fn gt(left: Expr, right: Expr) -> Predicate {
    Predicate::compare(left, ComparisonOp::Gt, right)
}

// ============================================================================
// GROUP BY
// ============================================================================

#[test]
fn test_grouped_column_and_aggregate() {
    let query = orders_by_status(vec![Expr::col("status"), Expr::count_star()]);
    assert_eq!(codes(query), vec![]);
}

#[test]
fn test_ungrouped_column() {
    let problems = check(orders_by_status(vec![Expr::col("status"), Expr::col("amount")]));
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code, ProblemCode::AggregationMisuse);
    assert_eq!(problems[0].clause_path, "select");
    assert!(problems[0].message.contains("'amount'"));
}

#[test]
fn test_star_under_group_by() {
    let query = star_from("orders").group_by(vec![Expr::col("status").into()]);
    assert_eq!(codes(query), vec![ProblemCode::AggregationMisuse]);
}

#[test]
fn test_grouped_expression_is_accepted_whole() {
    let upper = Expr::func("upper", vec![Expr::col("status")]);
    let query = select_from("orders", vec![upper.clone()]).group_by(vec![upper.into()]);
    assert_eq!(codes(query), vec![]);
}

#[test]
fn test_expression_over_grouped_columns() {
    let query = orders_by_status(vec![Expr::func("lower", vec![Expr::col("status")])]);
    assert_eq!(codes(query), vec![]);
}

#[test]
fn test_unqualified_grouping_key_covers_qualified_reference() {
    let query = SelectQuery::new(items(vec![Expr::qcol("o", "status"), Expr::count_star()]))
        .from(TableRef::aliased("orders", "o"))
        .group_by(vec![Expr::col("status").into()]);
    assert_eq!(codes(query), vec![]);
}

#[test]
fn test_group_by_ordinal_stands_for_the_item() {
    let query = select_from("orders", vec![Expr::col("status"), Expr::count_star()])
        .group_by(vec![Expr::int(1).into()]);
    assert_eq!(codes(query), vec![]);
}

fn doubled_amount() -> Expr {
    Expr::binary(Expr::col("amount"), BinaryOp::Multiply, Expr::int(2))
}

// GROUP BY doubled, where `doubled` is the output alias of `amount * 2`
#[rstest]
#[case::alias_only(vec![], None, vec![])]
#[case::with_aggregate(vec![Expr::count_star()], None, vec![])]
#[case::having_repeats_the_expression(vec![Expr::count_star()], Some(gt(doubled_amount(), Expr::int(10))), vec![])]
#[case::having_on_aliased_column(vec![], Some(gt(Expr::col("amount"), Expr::int(10))), vec![])]
#[case::ungrouped_item(vec![Expr::col("status")], None, vec![ProblemCode::AggregationMisuse])]
#[case::ungrouped_in_having(
    vec![],
    Some(gt(Expr::func("length", vec![Expr::col("status")]), Expr::int(3))),
    vec![ProblemCode::AggregationMisuse]
)]
fn test_group_by_output_alias(
    #[case] extra: Vec<Expr>,
    #[case] having: Option<Predicate>,
    #[case] expected: Vec<ProblemCode>,
) {
    let mut select_items = vec![SelectItem::aliased(doubled_amount(), "doubled")];
    select_items.extend(items(extra));
    let mut query = SelectQuery::new(select_items)
        .from(TableRef::table("orders"))
        .group_by(vec![Expr::col("DOUBLED").into()]);
    if let Some(having) = having {
        query = query.having(having);
    }
    assert_eq!(codes(query), expected);
}

#[test]
fn test_implicit_grouping() {
    assert_eq!(codes(select_from("orders", vec![Expr::count_star()])), vec![]);
    assert_eq!(
        codes(select_from("orders", vec![Expr::col("user_id"), Expr::count_star()])),
        vec![ProblemCode::AggregationMisuse]
    );
}

#[test]
fn test_window_functions_do_not_group() {
    let numbered = Expr::Function(
        sqlvet_ast::FunctionCall::new("row_number", vec![]).over(OverClause::Spec(WindowSpec::new())),
    );
    let total = Expr::Function(
        sqlvet_ast::FunctionCall::new("count", vec![sqlvet_ast::FunctionArg::Star])
            .over(OverClause::Spec(WindowSpec::new())),
    );
    let query = select_from("users", vec![Expr::col("id"), numbered, total]);
    assert_eq!(codes(query), vec![]);
}

#[test]
fn test_subquery_is_its_own_aggregation_context() {
    let latest = select_from("orders", vec![Expr::func("max", vec![Expr::col("placed_at")])]);
    let query = select_from("users", vec![Expr::col("name"), Expr::subquery(latest)]);
    assert_eq!(codes(query), vec![]);
}

// ============================================================================
// HAVING and misplaced aggregates
// ============================================================================

#[test]
fn test_having_with_aggregate() {
    let query = orders_by_status(vec![Expr::col("status")]).having(gt(Expr::count_star(), Expr::int(1)));
    assert_eq!(codes(query), vec![]);
}

#[test]
fn test_having_on_ungrouped_column() {
    let query = orders_by_status(vec![Expr::col("status")]).having(gt(Expr::col("amount"), Expr::int(10)));
    let problems = check(query);
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code, ProblemCode::AggregationMisuse);
    assert_eq!(problems[0].clause_path, "having");
}

#[test]
fn test_having_without_grouping() {
    let query = select_from("orders", vec![Expr::col("status")])
        .having(Predicate::eq(Expr::col("status"), Expr::string("paid")));
    assert_eq!(codes(query), vec![ProblemCode::AggregationMisuse]);
}

#[test]
fn test_aggregate_in_where() {
    let query = select_from("orders", vec![Expr::col("status")])
        .filter(gt(Expr::func("sum", vec![Expr::col("amount")]), Expr::int(10)));
    let problems = check(query);
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code, ProblemCode::AggregationMisuse);
    assert_eq!(problems[0].clause_path, "where.aggregate");
}

#[test]
fn test_aggregate_in_subquery_of_where_is_fine() {
    let average = select_from("orders", vec![Expr::func("avg", vec![Expr::col("amount")])]);
    let query = select_from("orders", vec![Expr::col("id")])
        .filter(gt(Expr::col("amount"), Expr::subquery(average)));
    assert_eq!(codes(query), vec![]);
}

// ============================================================================
// Ordinals
// ============================================================================

#[rstest]
#[case::first(1, vec![])]
#[case::last(2, vec![])]
#[case::past_end(3, vec![ProblemCode::OrderByInvalidOrdinal])]
#[case::zero(0, vec![ProblemCode::OrderByInvalidOrdinal])]
fn test_order_by_ordinal(#[case] ordinal: i64, #[case] expected: Vec<ProblemCode>) {
    let query = select_from("users", vec![Expr::col("id"), Expr::col("name")])
        .order_by(vec![OrderItem::ordinal(ordinal)]);
    assert_eq!(codes(query), expected);
}

#[test]
fn test_order_by_ordinal_expands_stars() {
    // users has six columns, so `id` after the star is position 7
    let query = SelectQuery::new(vec![SelectItem::Star, SelectItem::expr(Expr::col("id"))])
        .from(TableRef::table("users"))
        .order_by(vec![OrderItem::ordinal(7)]);
    assert_eq!(codes(query), vec![]);

    let query = star_from("users").order_by(vec![OrderItem::ordinal(1)]);
    assert_eq!(codes(query), vec![ProblemCode::OrderByInvalidOrdinal]);
}

#[test]
fn test_ordinal_after_unknown_star_is_not_reported() {
    let query = star_from("customers").order_by(vec![OrderItem::ordinal(9)]);
    assert_eq!(codes(query), vec![ProblemCode::TableNotFound]);
}

#[test]
fn test_group_by_ordinal_inside_rollup() {
    let query = select_from("orders", vec![Expr::col("status"), Expr::count_star()]).group_by(vec![
        GroupingElement::Rollup(vec![Expr::col("status").into(), Expr::int(3).into()]),
    ]);
    let problems = check(query);
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].code, ProblemCode::GroupByInvalidOrdinal);
    assert_eq!(problems[0].clause_path, "group_by");
}

// ============================================================================
// LIMIT / OFFSET
// ============================================================================

#[rstest]
#[case::literal(Expr::int(10), vec![])]
#[case::parameter(Expr::Parameter("?".into()), vec![])]
#[case::negative(Expr::int(-1), vec![ProblemCode::LimitOffsetInvalid])]
#[case::negated(Expr::neg(Expr::int(5)), vec![ProblemCode::LimitOffsetInvalid])]
#[case::string(Expr::string("ten"), vec![ProblemCode::LimitOffsetInvalid])]
fn test_limit(#[case] limit: Expr, #[case] expected: Vec<ProblemCode>) {
    assert_eq!(codes(star_from("orders").limit(limit)), expected);
}

#[test]
fn test_offset_path() {
    let problems = check(star_from("orders").limit(Expr::int(1)).offset(Expr::int(-2)));
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].clause_path, "limit.offset");
}
