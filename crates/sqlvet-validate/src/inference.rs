//! Type inference for expressions and projections
//!
//! Inference never reports problems. It answers `Unknown` whenever the type
//! cannot be decided, and checks that need a type skip themselves then.

use crate::context::ValidationContext;
use sqlvet_ast::{BinaryOp, Expr, FunctionArg, Literal, Query, UnaryOp};
use sqlvet_types::{DbType, Inferred, ReturnType};

/// Type of a literal; NULL has no type
pub fn literal_type(literal: &Literal) -> Inferred<DbType> {
    let ty = match literal {
        Literal::Null => return Inferred::Unknown,
        Literal::Boolean(_) => DbType::Boolean,
        Literal::Integer(i) if i32::try_from(*i).is_ok() => DbType::Integer,
        Literal::Integer(_) => DbType::Long,
        Literal::Decimal(_) => DbType::Decimal,
        Literal::Float(_) => DbType::Double,
        Literal::String(_) => DbType::String,
        Literal::Date(_) => DbType::Date,
        Literal::Time(_) => DbType::Time,
        Literal::Timestamp(_) => DbType::Timestamp,
        Literal::Interval(_) => DbType::Interval,
    };
    Inferred::Known(ty)
}

/// Result type of an arithmetic operator, if the operand types allow it
pub fn arithmetic_result(op: BinaryOp, left: DbType, right: DbType) -> Option<DbType> {
    use DbType::{Date, Interval, Time, Timestamp};

    if op == BinaryOp::Concat {
        return Some(DbType::String);
    }
    if left.is_numeric() && right.is_numeric() {
        return Some(DbType::promote(left, right));
    }
    match (op, left, right) {
        (BinaryOp::Add | BinaryOp::Subtract, Date | Timestamp | Time, Interval) => Some(left),
        (BinaryOp::Add, Interval, Date | Timestamp | Time) => Some(right),
        (BinaryOp::Add | BinaryOp::Subtract, Interval, Interval) => Some(Interval),
        (BinaryOp::Subtract, Date, Date) => Some(DbType::Integer),
        (BinaryOp::Subtract, Timestamp, Timestamp | Date) | (BinaryOp::Subtract, Date, Timestamp) => {
            Some(Interval)
        }
        (BinaryOp::Add, Date, DbType::Integer) | (BinaryOp::Subtract, Date, DbType::Integer) => {
            Some(Date)
        }
        (BinaryOp::Multiply, Interval, n) | (BinaryOp::Multiply, n, Interval) if n.is_numeric() => {
            Some(Interval)
        }
        (BinaryOp::Divide, Interval, n) if n.is_numeric() => Some(Interval),
        _ => None,
    }
}

impl<'a> ValidationContext<'a> {
    /// Infer the type of an expression in the current scope
    pub fn infer_type(&mut self, expr: &'a Expr) -> Inferred<DbType> {
        match expr {
            Expr::Literal(literal) => literal_type(literal),
            Expr::Column(column) => self.resolve_column(column, false),
            Expr::Parameter(_) | Expr::Row(_) => Inferred::Unknown,
            Expr::Binary(binary) => {
                if binary.op == BinaryOp::Concat {
                    return Inferred::Known(DbType::String);
                }
                let left = self.infer_type(&binary.left);
                let right = self.infer_type(&binary.right);
                match left.zip(right) {
                    Inferred::Known((l, r)) => arithmetic_result(binary.op, l, r).into(),
                    Inferred::Unknown => Inferred::Unknown,
                }
            }
            Expr::Unary(unary) => {
                let operand = self.infer_type(&unary.operand);
                match (unary.op, operand) {
                    (UnaryOp::Plus | UnaryOp::Minus, Inferred::Known(ty))
                        if ty.is_numeric() || ty == DbType::Interval =>
                    {
                        operand
                    }
                    _ => Inferred::Unknown,
                }
            }
            Expr::Function(call) => {
                let Some(signature) = self.function_signature(&call.normalized_name()) else {
                    return Inferred::Unknown;
                };
                match signature.returns {
                    ReturnType::Fixed(ty) => Inferred::from_type(ty),
                    ReturnType::Argument(position) => match call.args.get(position) {
                        Some(FunctionArg::Expr(arg)) => self.infer_type(arg),
                        _ => Inferred::Unknown,
                    },
                    ReturnType::Unknown => Inferred::Unknown,
                }
            }
            Expr::Cast(cast) => Inferred::from_type(DbType::from_sql_name(&cast.data_type)),
            Expr::Case(case) => {
                for result in case.results() {
                    let ty = self.infer_type(result);
                    if ty.is_known() {
                        return ty;
                    }
                }
                Inferred::Unknown
            }
            Expr::Subquery(query) => self.infer_single_column_type(query),
            Expr::Predicate(_) => Inferred::Known(DbType::Boolean),
        }
    }

    /// Type of the single output column of a query; `Unknown` unless the query
    /// projects exactly one column
    pub fn infer_single_column_type(&mut self, query: &'a Query) -> Inferred<DbType> {
        match self.infer_projection_types(query) {
            Inferred::Known(types) if types.len() == 1 => types[0],
            _ => Inferred::Unknown,
        }
    }

    /// Types of every output column of a query, in order
    pub fn infer_projection_types(&mut self, query: &'a Query) -> Inferred<Vec<Inferred<DbType>>> {
        self.output_columns(query).types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::scope::ScopeKind;
    use rstest::rstest;
    use sqlvet_ast::{SelectItem, SelectQuery, TableRef};
    use sqlvet_catalog::{InMemoryCatalog, TableMetadata};

    #[rstest]
    #[case(Literal::Integer(7), Inferred::Known(DbType::Integer))]
    #[case(Literal::Integer(1 << 40), Inferred::Known(DbType::Long))]
    #[case(Literal::Null, Inferred::Unknown)]
    #[case(Literal::String("x".into()), Inferred::Known(DbType::String))]
    #[case(Literal::Float(1.5), Inferred::Known(DbType::Double))]
    #[case(Literal::Interval("1 day".into()), Inferred::Known(DbType::Interval))]
    fn test_literal_types(#[case] literal: Literal, #[case] expected: Inferred<DbType>) {
        assert_eq!(literal_type(&literal), expected);
    }

    #[rstest]
    #[case(BinaryOp::Add, DbType::Integer, DbType::Decimal, Some(DbType::Decimal))]
    #[case(BinaryOp::Add, DbType::Date, DbType::Interval, Some(DbType::Date))]
    #[case(BinaryOp::Add, DbType::Interval, DbType::Timestamp, Some(DbType::Timestamp))]
    #[case(BinaryOp::Subtract, DbType::Timestamp, DbType::Timestamp, Some(DbType::Interval))]
    #[case(BinaryOp::Multiply, DbType::Interval, DbType::Integer, Some(DbType::Interval))]
    #[case(BinaryOp::Concat, DbType::Integer, DbType::Boolean, Some(DbType::String))]
    #[case(BinaryOp::Add, DbType::String, DbType::Integer, None)]
    #[case(BinaryOp::Modulo, DbType::Interval, DbType::Integer, None)]
    fn test_arithmetic_result(
        #[case] op: BinaryOp,
        #[case] left: DbType,
        #[case] right: DbType,
        #[case] expected: Option<DbType>,
    ) {
        assert_eq!(arithmetic_result(op, left, right), expected);
    }

    #[test]
    fn test_expression_inference_in_scope() {
        let catalog = InMemoryCatalog::standard().with_table(
            TableMetadata::new("t")
                .with_column("a", DbType::Integer)
                .with_column("d", DbType::Date)
                .with_column("s", DbType::String),
        );
        let config = ValidationConfig::default();
        let select = SelectQuery::new(vec![SelectItem::Star]).from(TableRef::table("t"));
        let exprs = [
            Expr::binary(Expr::col("a"), BinaryOp::Multiply, Expr::int(1 << 40)),
            Expr::binary(Expr::col("d"), BinaryOp::Add, Expr::interval("1 day")),
            Expr::func("upper", vec![Expr::col("s")]),
            Expr::func("max", vec![Expr::col("d")]),
            Expr::cast(Expr::col("s"), "bigint"),
            Expr::case(vec![(Expr::boolean(true), Expr::null())], Some(Expr::col("s"))),
            Expr::func("no_such_function", vec![]),
        ];

        let mut ctx = ValidationContext::new(&catalog, &config);
        ctx.push_select_scope(&select, None, ScopeKind::Select);
        let types: Vec<_> = exprs.iter().map(|e| ctx.infer_type(e)).collect();
        assert_eq!(
            types,
            vec![
                Inferred::Known(DbType::Long),
                Inferred::Known(DbType::Date),
                Inferred::Known(DbType::String),
                Inferred::Known(DbType::Date),
                Inferred::Known(DbType::Long),
                Inferred::Known(DbType::String),
                Inferred::Unknown,
            ]
        );
        assert!(ctx.problems().is_empty());
    }

    #[test]
    fn test_projection_types_expand_stars() {
        let catalog = InMemoryCatalog::standard().with_table(
            TableMetadata::new("t")
                .with_column("a", DbType::Integer)
                .with_column("b", DbType::Boolean),
        );
        let config = ValidationConfig::default();
        let star: Query = SelectQuery::new(vec![SelectItem::Star])
            .from(TableRef::table("t"))
            .into();
        let unknown: Query = SelectQuery::new(vec![SelectItem::Star])
            .from(TableRef::table("nowhere"))
            .into();
        let single: Query = SelectQuery::new(vec![SelectItem::expr(Expr::col("b"))])
            .from(TableRef::table("t"))
            .into();

        let mut ctx = ValidationContext::new(&catalog, &config);
        assert_eq!(
            ctx.infer_projection_types(&star),
            Inferred::Known(vec![
                Inferred::Known(DbType::Integer),
                Inferred::Known(DbType::Boolean)
            ])
        );
        assert_eq!(ctx.infer_projection_types(&unknown), Inferred::Unknown);
        assert_eq!(ctx.infer_single_column_type(&single), Inferred::Known(DbType::Boolean));
        assert_eq!(ctx.infer_single_column_type(&star), Inferred::Unknown);
    }
}
