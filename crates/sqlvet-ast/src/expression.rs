//! Scalar expression nodes

use crate::{
    BinaryOp, ComparisonOp, Identifier, Literal, ObjectName, OrderItem, Predicate, Query,
    UnaryOp, WindowSpec,
};
use serde::{Deserialize, Serialize};

/// A scalar expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Literal value
    Literal(Literal),
    /// Column reference, optionally qualified (`t.a`)
    Column(ColumnRef),
    /// Bind parameter (`?`, `$1`, `:name`); its type is never known
    Parameter(String),
    /// Binary arithmetic or concatenation
    Binary(BinaryExpr),
    /// Unary plus/minus
    Unary(UnaryExpr),
    /// Function call, including aggregates and window functions
    Function(FunctionCall),
    /// CAST(expr AS type)
    Cast(CastExpr),
    /// CASE expression (simple or searched)
    Case(CaseExpr),
    /// Subquery in expression position
    Subquery(Box<Query>),
    /// Row constructor `(a, b, ...)`
    Row(Vec<Expr>),
    /// Boolean predicate used as a value
    Predicate(Box<Predicate>),
}

/// A column reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Source qualifier (table name or alias)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Identifier>,
    /// Column name
    pub name: Identifier,
}

impl ColumnRef {
    pub fn new(name: impl Into<Identifier>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified(table: impl Into<Identifier>, name: impl Into<Identifier>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }
}

/// Binary operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: BinaryOp,
    pub right: Box<Expr>,
}

/// Unary operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
}

/// Function call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name, possibly schema-qualified
    pub name: ObjectName,
    /// Arguments
    #[serde(default)]
    pub args: Vec<FunctionArg>,
    /// DISTINCT inside the argument list
    #[serde(default)]
    pub distinct: bool,
    /// FILTER (WHERE ...) clause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Box<Predicate>>,
    /// WITHIN GROUP (ORDER BY ...) clause
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub within_group: Vec<OrderItem>,
    /// OVER clause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over: Option<OverClause>,
}

impl FunctionCall {
    /// Create a plain call
    pub fn new(name: impl Into<ObjectName>, args: Vec<FunctionArg>) -> Self {
        Self {
            name: name.into(),
            args,
            distinct: false,
            filter: None,
            within_group: Vec::new(),
            over: None,
        }
    }

    /// Add a FILTER clause
    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Add a WITHIN GROUP clause
    pub fn within_group(mut self, order_by: Vec<OrderItem>) -> Self {
        self.within_group = order_by;
        self
    }

    /// Add an OVER clause
    pub fn over(mut self, over: OverClause) -> Self {
        self.over = Some(over);
        self
    }

    /// Case-folded last segment of the function name
    pub fn normalized_name(&self) -> String {
        self.name.normalized_last()
    }
}

/// A function argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionArg {
    /// `*`, as in `COUNT(*)`
    Star,
    Expr(Expr),
}

/// OVER clause of a window function call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverClause {
    /// OVER w
    Named(Identifier),
    /// OVER (...)
    Spec(WindowSpec),
}

/// CAST(expr AS type)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastExpr {
    pub expr: Box<Expr>,
    /// Target type name as written (`VARCHAR(20)`, `bigint`, ...)
    pub data_type: String,
}

/// CASE expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseExpr {
    /// Operand of a simple CASE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operand: Option<Box<Expr>>,
    /// WHEN ... THEN ... branches
    pub whens: Vec<WhenClause>,
    /// ELSE result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub else_result: Option<Box<Expr>>,
}

impl CaseExpr {
    /// Iterate over every result expression (THEN branches, then ELSE)
    pub fn results(&self) -> impl Iterator<Item = &Expr> {
        self.whens
            .iter()
            .map(|w| &w.result)
            .chain(self.else_result.as_deref())
    }
}

/// WHEN condition THEN result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenClause {
    pub condition: Expr,
    pub result: Expr,
}

// Helper constructors for Expr
impl Expr {
    /// Create an unqualified column reference
    pub fn col(name: impl Into<Identifier>) -> Self {
        Self::Column(ColumnRef::new(name))
    }

    /// Create a qualified column reference
    pub fn qcol(table: impl Into<Identifier>, name: impl Into<Identifier>) -> Self {
        Self::Column(ColumnRef::qualified(table, name))
    }

    /// Create a NULL literal
    pub fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// Create a boolean literal
    pub fn boolean(value: bool) -> Self {
        Self::Literal(Literal::Boolean(value))
    }

    /// Create an integer literal
    pub fn int(value: i64) -> Self {
        Self::Literal(Literal::Integer(value))
    }

    /// Create a string literal
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    /// Create an interval literal
    pub fn interval(value: impl Into<String>) -> Self {
        Self::Literal(Literal::Interval(value.into()))
    }

    /// Create a binary operation
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Self::Binary(BinaryExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    /// Create a negation
    pub fn neg(operand: Expr) -> Self {
        Self::Unary(UnaryExpr {
            op: UnaryOp::Minus,
            operand: Box::new(operand),
        })
    }

    /// Create a function call with expression arguments
    pub fn func(name: &str, args: Vec<Expr>) -> Self {
        Self::Function(FunctionCall::new(
            name,
            args.into_iter().map(FunctionArg::Expr).collect(),
        ))
    }

    /// Create `COUNT(*)`
    pub fn count_star() -> Self {
        Self::Function(FunctionCall::new("count", vec![FunctionArg::Star]))
    }

    /// Create a CAST
    pub fn cast(expr: Expr, data_type: impl Into<String>) -> Self {
        Self::Cast(CastExpr {
            expr: Box::new(expr),
            data_type: data_type.into(),
        })
    }

    /// Create a searched CASE
    pub fn case(whens: Vec<(Expr, Expr)>, else_result: Option<Expr>) -> Self {
        Self::Case(CaseExpr {
            operand: None,
            whens: whens
                .into_iter()
                .map(|(condition, result)| WhenClause { condition, result })
                .collect(),
            else_result: else_result.map(Box::new),
        })
    }

    /// Create a subquery expression
    pub fn subquery(query: impl Into<Query>) -> Self {
        Self::Subquery(Box::new(query.into()))
    }

    /// Create a row constructor
    pub fn row(items: Vec<Expr>) -> Self {
        Self::Row(items)
    }

    /// Wrap a predicate as a boolean value
    pub fn predicate(predicate: Predicate) -> Self {
        Self::Predicate(Box::new(predicate))
    }

    /// Build a comparison predicate with this expression on the left
    pub fn compare(self, op: ComparisonOp, right: Expr) -> Predicate {
        Predicate::compare(self, op, right)
    }

    /// Integer value of a (possibly negated) integer literal
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Literal(Literal::Integer(i)) => Some(*i),
            Self::Unary(UnaryExpr {
                op: UnaryOp::Minus,
                operand,
            }) => match operand.as_ref() {
                Self::Literal(Literal::Integer(i)) => Some(-*i),
                _ => None,
            },
            _ => None,
        }
    }

    /// The column reference, if this is one
    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            Self::Column(c) => Some(c),
            _ => None,
        }
    }
}

impl From<Literal> for Expr {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}

impl From<ColumnRef> for Expr {
    fn from(col: ColumnRef) -> Self {
        Self::Column(col)
    }
}

impl From<Predicate> for Expr {
    fn from(p: Predicate) -> Self {
        Self::predicate(p)
    }
}
