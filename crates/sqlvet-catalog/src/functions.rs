//! Standard SQL function signatures

use sqlvet_types::{ArgKind, DbType, FunctionSignature, ReturnType};

/// Signatures of the common aggregate, window and scalar functions
pub fn standard_functions() -> Vec<FunctionSignature> {
    use ArgKind::{AnyExpr, Numeric, StarOrExpr, String};

    let same_as_first = ReturnType::Argument(0);

    vec![
        // Aggregates
        FunctionSignature::aggregate("count", 1, Some(1), vec![StarOrExpr]).returning(DbType::Long),
        FunctionSignature::aggregate("sum", 1, Some(1), vec![Numeric]).returns(same_as_first),
        FunctionSignature::aggregate("avg", 1, Some(1), vec![Numeric]).returning(DbType::Decimal),
        FunctionSignature::aggregate("min", 1, Some(1), vec![AnyExpr]).returns(same_as_first),
        FunctionSignature::aggregate("max", 1, Some(1), vec![AnyExpr]).returns(same_as_first),
        FunctionSignature::aggregate("string_agg", 2, Some(2), vec![AnyExpr, String])
            .returning(DbType::String),
        FunctionSignature::aggregate("array_agg", 1, Some(1), vec![AnyExpr]),
        FunctionSignature::aggregate("bool_and", 1, Some(1), vec![AnyExpr]).returning(DbType::Boolean),
        FunctionSignature::aggregate("bool_or", 1, Some(1), vec![AnyExpr]).returning(DbType::Boolean),
        FunctionSignature::aggregate("stddev", 1, Some(1), vec![Numeric]).returning(DbType::Double),
        FunctionSignature::aggregate("variance", 1, Some(1), vec![Numeric]).returning(DbType::Double),
        FunctionSignature::aggregate("percentile_cont", 1, Some(1), vec![Numeric])
            .returning(DbType::Double),
        FunctionSignature::aggregate("percentile_disc", 1, Some(1), vec![Numeric]),
        FunctionSignature::aggregate("mode", 0, Some(0), vec![]),
        // Window functions
        FunctionSignature::scalar("row_number", 0, Some(0), vec![]).returning(DbType::Long),
        FunctionSignature::scalar("rank", 0, Some(0), vec![]).returning(DbType::Long),
        FunctionSignature::scalar("dense_rank", 0, Some(0), vec![]).returning(DbType::Long),
        FunctionSignature::scalar("percent_rank", 0, Some(0), vec![]).returning(DbType::Double),
        FunctionSignature::scalar("cume_dist", 0, Some(0), vec![]).returning(DbType::Double),
        FunctionSignature::scalar("ntile", 1, Some(1), vec![Numeric]).returning(DbType::Integer),
        FunctionSignature::scalar("lag", 1, Some(3), vec![AnyExpr, Numeric, AnyExpr])
            .returns(same_as_first),
        FunctionSignature::scalar("lead", 1, Some(3), vec![AnyExpr, Numeric, AnyExpr])
            .returns(same_as_first),
        FunctionSignature::scalar("first_value", 1, Some(1), vec![AnyExpr]).returns(same_as_first),
        FunctionSignature::scalar("last_value", 1, Some(1), vec![AnyExpr]).returns(same_as_first),
        FunctionSignature::scalar("nth_value", 2, Some(2), vec![AnyExpr, Numeric])
            .returns(same_as_first),
        // Scalar functions
        FunctionSignature::scalar("upper", 1, Some(1), vec![String]).returning(DbType::String),
        FunctionSignature::scalar("lower", 1, Some(1), vec![String]).returning(DbType::String),
        FunctionSignature::scalar("trim", 1, Some(1), vec![String]).returning(DbType::String),
        FunctionSignature::scalar("length", 1, Some(1), vec![String]).returning(DbType::Integer),
        FunctionSignature::scalar("char_length", 1, Some(1), vec![String]).returning(DbType::Integer),
        FunctionSignature::scalar("substring", 2, Some(3), vec![String, Numeric, Numeric])
            .returning(DbType::String),
        FunctionSignature::scalar("replace", 3, Some(3), vec![String, String, String])
            .returning(DbType::String),
        FunctionSignature::scalar("concat", 1, None, vec![AnyExpr]).returning(DbType::String),
        FunctionSignature::scalar("coalesce", 1, None, vec![AnyExpr]).returns(same_as_first),
        FunctionSignature::scalar("nullif", 2, Some(2), vec![AnyExpr, AnyExpr]).returns(same_as_first),
        FunctionSignature::scalar("greatest", 1, None, vec![AnyExpr]).returns(same_as_first),
        FunctionSignature::scalar("least", 1, None, vec![AnyExpr]).returns(same_as_first),
        FunctionSignature::scalar("abs", 1, Some(1), vec![Numeric]).returns(same_as_first),
        FunctionSignature::scalar("round", 1, Some(2), vec![Numeric, Numeric]).returns(same_as_first),
        FunctionSignature::scalar("floor", 1, Some(1), vec![Numeric]).returns(same_as_first),
        FunctionSignature::scalar("ceil", 1, Some(1), vec![Numeric]).returns(same_as_first),
        FunctionSignature::scalar("mod", 2, Some(2), vec![Numeric, Numeric]).returns(same_as_first),
        FunctionSignature::scalar("now", 0, Some(0), vec![]).returning(DbType::Timestamp),
        FunctionSignature::scalar("current_timestamp", 0, Some(0), vec![]).returning(DbType::Timestamp),
        FunctionSignature::scalar("current_date", 0, Some(0), vec![]).returning(DbType::Date),
        FunctionSignature::scalar("date_trunc", 2, Some(2), vec![String, AnyExpr])
            .returning(DbType::Timestamp),
    ]
}
