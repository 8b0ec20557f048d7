//! Short SQL-like descriptions of tree elements
//!
//! These are for diagnostics, not a renderer: nested queries are elided and
//! output is not guaranteed to be valid SQL.

use crate::{
    ColumnRef, CompositeQuery, Expr, FrameBound, FunctionArg, Join, JoinConstraint, Literal, OverClause,
    Predicate, Quantifier, Query, SelectItem, SelectQuery, TableRef, TruthValue, WindowSpec,
    WithQuery, InValues,
};
use std::fmt;

fn join_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("NULL"),
            Literal::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Decimal(d) => write!(f, "{}", d),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Date(d) => write!(f, "DATE '{}'", d),
            Literal::Time(t) => write!(f, "TIME '{}'", t),
            Literal::Timestamp(ts) => write!(f, "TIMESTAMP '{}'", ts),
            Literal::Interval(i) => write!(f, "INTERVAL '{}'", i),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(t) => write!(f, "{}.{}", t, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Column(c) => write!(f, "{}", c),
            Expr::Parameter(p) => f.write_str(p),
            Expr::Binary(b) => write!(f, "{} {} {}", b.left, b.op.symbol(), b.right),
            Expr::Unary(u) => write!(f, "{}{}", u.op.symbol(), u.operand),
            Expr::Function(call) => {
                write!(f, "{}(", call.name.to_string().to_uppercase())?;
                if call.distinct {
                    f.write_str("DISTINCT ")?;
                }
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match arg {
                        FunctionArg::Star => f.write_str("*")?,
                        FunctionArg::Expr(e) => write!(f, "{}", e)?,
                    }
                }
                f.write_str(")")?;
                if let Some(filter) = &call.filter {
                    write!(f, " FILTER (WHERE {})", filter)?;
                }
                if !call.within_group.is_empty() {
                    f.write_str(" WITHIN GROUP (...)")?;
                }
                match &call.over {
                    Some(OverClause::Named(name)) => write!(f, " OVER {}", name),
                    Some(OverClause::Spec(spec)) => write!(f, " OVER ({})", spec),
                    None => Ok(()),
                }
            }
            Expr::Cast(c) => write!(f, "CAST({} AS {})", c.expr, c.data_type),
            Expr::Case(_) => f.write_str("CASE ... END"),
            Expr::Subquery(q) => write!(f, "({})", q),
            Expr::Row(items) => {
                f.write_str("(")?;
                join_list(f, items)?;
                f.write_str(")")
            }
            Expr::Predicate(p) => write!(f, "{}", p),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let not = |negated: bool| if negated { "NOT " } else { "" };
        match self {
            Predicate::Comparison(c) => write!(f, "{} {} {}", c.left, c.op.symbol(), c.right),
            Predicate::Between(b) => write!(
                f,
                "{} {}BETWEEN {} AND {}",
                b.expr,
                not(b.negated),
                b.low,
                b.high
            ),
            Predicate::Like(l) => write!(
                f,
                "{} {}{} {}",
                l.expr,
                not(l.negated),
                l.kind.keyword(),
                l.pattern
            ),
            Predicate::In(i) => {
                write!(f, "{} {}IN (", i.expr, not(i.negated))?;
                match &i.values {
                    InValues::List(values) => join_list(f, values)?,
                    InValues::Subquery(q) => write!(f, "{}", q)?,
                }
                f.write_str(")")
            }
            Predicate::Quantified(q) => {
                let quantifier = match q.quantifier {
                    Quantifier::Any => "ANY",
                    Quantifier::All => "ALL",
                };
                write!(f, "{} {} {} ({})", q.left, q.op.symbol(), quantifier, q.subquery)
            }
            Predicate::DistinctFrom(d) => {
                write!(f, "{} IS {}DISTINCT FROM {}", d.left, not(d.negated), d.right)
            }
            Predicate::Unary(e) => write!(f, "{}", e),
            Predicate::IsNull(p) => write!(f, "{} IS {}NULL", p.expr, not(p.negated)),
            Predicate::IsTruth(p) => {
                let value = match p.value {
                    TruthValue::True => "TRUE",
                    TruthValue::False => "FALSE",
                    TruthValue::Unknown => "UNKNOWN",
                };
                write!(f, "{} IS {}{}", p.expr, not(p.negated), value)
            }
            Predicate::Exists(e) => write!(f, "{}EXISTS ({})", not(e.negated), e.subquery),
            Predicate::And(items) => write_connective(f, items, " AND "),
            Predicate::Or(items) => write_connective(f, items, " OR "),
            Predicate::Not(inner) => write!(f, "NOT ({})", inner),
        }
    }
}

fn write_connective(f: &mut fmt::Formatter<'_>, items: &[Predicate], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::Expr { expr, alias: Some(alias) } => write!(f, "{} AS {}", expr, alias),
            SelectItem::Expr { expr, alias: None } => write!(f, "{}", expr),
            SelectItem::Star => f.write_str("*"),
            SelectItem::QualifiedStar(q) => write!(f, "{}.*", q),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRef::Table { name, alias } => {
                write!(f, "{}", name)?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", alias)?;
                }
                Ok(())
            }
            TableRef::Derived { alias, lateral, .. } => {
                if *lateral {
                    f.write_str("LATERAL ")?;
                }
                f.write_str("(SELECT ...)")?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", alias)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.keyword(), self.relation)?;
        match &self.constraint {
            JoinConstraint::On(p) => write!(f, " ON {}", p),
            JoinConstraint::Using(cols) => {
                f.write_str(" USING (")?;
                join_list(f, cols)?;
                f.write_str(")")
            }
            JoinConstraint::Natural => f.write_str(" NATURAL"),
            JoinConstraint::None => Ok(()),
        }
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        join_list(f, &self.items)?;
        if let Some(from) = &self.from {
            write!(f, " FROM {}", from.relation)?;
            if !from.joins.is_empty() {
                f.write_str(" ...")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for CompositeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                match self.operators.get(i - 1) {
                    Some(op) => write!(f, " {} ", op)?,
                    None => f.write_str(" ? ")?,
                }
            }
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}

impl fmt::Display for WithQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WITH ")?;
        if self.recursive {
            f.write_str("RECURSIVE ")?;
        }
        let names: Vec<_> = self.ctes.iter().map(|c| c.name.as_str()).collect();
        write!(f, "{} ... {}", names.join(", "), self.body)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Select(s) => write!(f, "{}", s),
            Query::Composite(c) => write!(f, "{}", c),
            Query::With(w) => write!(f, "{}", w),
        }
    }
}

impl fmt::Display for FrameBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameBound::UnboundedPreceding => f.write_str("UNBOUNDED PRECEDING"),
            FrameBound::Preceding(e) => write!(f, "{} PRECEDING", e),
            FrameBound::CurrentRow => f.write_str("CURRENT ROW"),
            FrameBound::Following(e) => write!(f, "{} FOLLOWING", e),
            FrameBound::UnboundedFollowing => f.write_str("UNBOUNDED FOLLOWING"),
        }
    }
}

impl fmt::Display for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(base) = &self.base {
            parts.push(base.to_string());
        }
        if !self.partition_by.is_empty() {
            let exprs: Vec<_> = self.partition_by.iter().map(ToString::to_string).collect();
            parts.push(format!("PARTITION BY {}", exprs.join(", ")));
        }
        if !self.order_by.is_empty() {
            let exprs: Vec<_> = self
                .order_by
                .iter()
                .map(|o| {
                    if o.descending {
                        format!("{} DESC", o.expr)
                    } else {
                        o.expr.to_string()
                    }
                })
                .collect();
            parts.push(format!("ORDER BY {}", exprs.join(", ")));
        }
        if let Some(frame) = &self.frame {
            match &frame.end {
                Some(end) => parts.push(format!(
                    "{} BETWEEN {} AND {}",
                    frame.units.keyword(),
                    frame.start,
                    end
                )),
                None => parts.push(format!("{} {}", frame.units.keyword(), frame.start)),
            }
        }
        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BinaryOp, FrameUnits, OrderItem, WindowFrame};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Expr::qcol("t", "a"), "t.a")]
    #[case(Expr::binary(Expr::col("a"), BinaryOp::Add, Expr::int(1)), "a + 1")]
    #[case(Expr::func("sum", vec![Expr::col("b")]), "SUM(b)")]
    #[case(Expr::count_star(), "COUNT(*)")]
    #[case(Expr::string("it's"), "'it''s'")]
    #[case(Expr::cast(Expr::col("x"), "bigint"), "CAST(x AS bigint)")]
    #[case(Expr::row(vec![Expr::col("a"), Expr::col("b")]), "(a, b)")]
    fn test_expr_display(#[case] expr: Expr, #[case] expected: &str) {
        assert_eq!(expr.to_string(), expected);
    }

    #[test]
    fn test_predicate_display() {
        let p = Predicate::in_list(Expr::col("a"), vec![Expr::int(1), Expr::int(2)]).negated();
        assert_eq!(p.to_string(), "a NOT IN (1, 2)");

        let p = Predicate::between(Expr::col("a"), Expr::int(1), Expr::int(5));
        assert_eq!(p.to_string(), "a BETWEEN 1 AND 5");
    }

    #[test]
    fn test_query_display() {
        let q = SelectQuery::new(vec![SelectItem::expr(Expr::col("a")), SelectItem::Star])
            .from(TableRef::aliased("orders", "o"));
        assert_eq!(q.to_string(), "SELECT a, * FROM orders AS o");
    }

    #[test]
    fn test_window_spec_display() {
        let spec = WindowSpec::new()
            .base("w")
            .order_by(vec![OrderItem::desc(Expr::col("ts"))])
            .frame(WindowFrame::between(
                FrameUnits::Rows,
                FrameBound::preceding(Expr::int(3)),
                FrameBound::CurrentRow,
            ));
        assert_eq!(
            spec.to_string(),
            "w ORDER BY ts DESC ROWS BETWEEN 3 PRECEDING AND CURRENT ROW"
        );
    }
}
