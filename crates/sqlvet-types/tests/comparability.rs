//! Comparability relation tests
//!
//! The table below is the full contract for pairs of distinct known types.

use proptest::prelude::*;
use rstest::rstest;
use sqlvet_types::DbType;

fn any_db_type() -> impl Strategy<Value = DbType> {
    proptest::sample::select(DbType::ALL.to_vec())
}

proptest! {
    #[test]
    fn comparable_is_symmetric(a in any_db_type(), b in any_db_type()) {
        prop_assert_eq!(DbType::comparable(a, b), DbType::comparable(b, a));
    }

    #[test]
    fn comparable_is_reflexive(a in any_db_type()) {
        prop_assert!(DbType::comparable(a, a));
    }

    #[test]
    fn unknown_is_comparable_with_everything(a in any_db_type()) {
        prop_assert!(DbType::comparable(DbType::Unknown, a));
        prop_assert!(DbType::comparable(a, DbType::Unknown));
    }

    #[test]
    fn numerics_are_mutually_comparable(a in any_db_type(), b in any_db_type()) {
        if a.is_numeric() && b.is_numeric() {
            prop_assert!(DbType::comparable(a, b));
        }
    }

    #[test]
    fn promote_is_commutative(a in any_db_type(), b in any_db_type()) {
        prop_assert_eq!(DbType::promote(a, b), DbType::promote(b, a));
    }
}

#[rstest]
#[case(DbType::Integer, DbType::Long, true)]
#[case(DbType::SmallInt, DbType::Double, true)]
#[case(DbType::Decimal, DbType::Integer, true)]
#[case(DbType::Date, DbType::Timestamp, true)]
#[case(DbType::String, DbType::Date, true)]
#[case(DbType::String, DbType::Time, true)]
#[case(DbType::String, DbType::Timestamp, true)]
#[case(DbType::String, DbType::Uuid, true)]
#[case(DbType::Integer, DbType::String, false)]
#[case(DbType::Double, DbType::String, false)]
#[case(DbType::Boolean, DbType::Integer, false)]
#[case(DbType::Boolean, DbType::String, false)]
#[case(DbType::Date, DbType::Integer, false)]
#[case(DbType::Date, DbType::Time, false)]
#[case(DbType::Time, DbType::Timestamp, false)]
#[case(DbType::Interval, DbType::Date, false)]
#[case(DbType::Interval, DbType::String, false)]
#[case(DbType::Json, DbType::String, false)]
#[case(DbType::Binary, DbType::String, false)]
#[case(DbType::Uuid, DbType::Integer, false)]
fn test_comparability_table(#[case] a: DbType, #[case] b: DbType, #[case] expected: bool) {
    assert_eq!(DbType::comparable(a, b), expected, "{a} vs {b}");
    assert_eq!(DbType::comparable(b, a), expected, "{b} vs {a}");
}

#[test]
fn test_every_known_pair_is_classified() {
    // Each distinct known pair is comparable only through one of the documented routes.
    for &a in DbType::ALL {
        for &b in DbType::ALL {
            if a == b || !a.is_known() || !b.is_known() {
                continue;
            }
            let numeric = a.is_numeric() && b.is_numeric();
            let dates = matches!((a, b), (DbType::Date, DbType::Timestamp) | (DbType::Timestamp, DbType::Date));
            let string_literal = (a == DbType::String && (b.is_temporal() || b == DbType::Uuid))
                || (b == DbType::String && (a.is_temporal() || a == DbType::Uuid));
            assert_eq!(
                DbType::comparable(a, b),
                numeric || dates || string_literal,
                "{a} vs {b}"
            );
        }
    }
}
