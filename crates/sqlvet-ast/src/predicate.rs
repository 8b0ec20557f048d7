//! Boolean predicate nodes

use crate::{ComparisonOp, Expr, Query};
use serde::{Deserialize, Serialize};

/// A boolean predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// `a = b`, `a < b`, ...
    Comparison(ComparisonPredicate),
    /// `x [NOT] BETWEEN low AND high`
    Between(BetweenPredicate),
    /// `x [NOT] LIKE | ILIKE | SIMILAR TO pattern`
    Like(LikePredicate),
    /// `x [NOT] IN (...)`
    In(InPredicate),
    /// `x op ANY | ALL (subquery)`
    Quantified(QuantifiedPredicate),
    /// `a IS [NOT] DISTINCT FROM b`
    DistinctFrom(DistinctFromPredicate),
    /// Bare boolean expression used as a predicate
    Unary(Expr),
    /// `x IS [NOT] NULL`
    IsNull(IsNullPredicate),
    /// `x IS [NOT] TRUE | FALSE | UNKNOWN`
    IsTruth(IsTruthPredicate),
    /// `[NOT] EXISTS (subquery)`
    Exists(ExistsPredicate),
    /// Conjunction
    And(Vec<Predicate>),
    /// Disjunction
    Or(Vec<Predicate>),
    /// Negation
    Not(Box<Predicate>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPredicate {
    pub left: Expr,
    pub op: ComparisonOp,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetweenPredicate {
    pub expr: Expr,
    pub low: Expr,
    pub high: Expr,
    #[serde(default)]
    pub negated: bool,
}

/// Pattern-matching operator family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeKind {
    Like,
    ILike,
    SimilarTo,
}

impl LikeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::ILike => "ILIKE",
            Self::SimilarTo => "SIMILAR TO",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikePredicate {
    pub expr: Expr,
    pub pattern: Expr,
    #[serde(default = "default_like_kind")]
    pub kind: LikeKind,
    #[serde(default)]
    pub negated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escape: Option<Expr>,
}

fn default_like_kind() -> LikeKind {
    LikeKind::Like
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InPredicate {
    pub expr: Expr,
    pub values: InValues,
    #[serde(default)]
    pub negated: bool,
}

/// Right-hand side of IN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InValues {
    /// `IN (v1, v2, ...)`; entries are row constructors for tuple IN
    List(Vec<Expr>),
    /// `IN (SELECT ...)`
    Subquery(Box<Query>),
}

/// ANY / SOME or ALL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    Any,
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantifiedPredicate {
    pub left: Expr,
    pub op: ComparisonOp,
    pub quantifier: Quantifier,
    pub subquery: Box<Query>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistinctFromPredicate {
    pub left: Expr,
    pub right: Expr,
    #[serde(default)]
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsNullPredicate {
    pub expr: Expr,
    #[serde(default)]
    pub negated: bool,
}

/// Truth value tested by `IS [NOT] TRUE | FALSE | UNKNOWN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruthValue {
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsTruthPredicate {
    pub expr: Expr,
    pub value: TruthValue,
    #[serde(default)]
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistsPredicate {
    pub subquery: Box<Query>,
    #[serde(default)]
    pub negated: bool,
}

// Helper constructors for Predicate
impl Predicate {
    /// Create a comparison
    pub fn compare(left: Expr, op: ComparisonOp, right: Expr) -> Self {
        Self::Comparison(ComparisonPredicate { left, op, right })
    }

    /// Create an equality comparison
    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::compare(left, ComparisonOp::Eq, right)
    }

    /// Create `expr BETWEEN low AND high`
    pub fn between(expr: Expr, low: Expr, high: Expr) -> Self {
        Self::Between(BetweenPredicate {
            expr,
            low,
            high,
            negated: false,
        })
    }

    /// Create `expr LIKE pattern`
    pub fn like(expr: Expr, pattern: Expr) -> Self {
        Self::Like(LikePredicate {
            expr,
            pattern,
            kind: LikeKind::Like,
            negated: false,
            escape: None,
        })
    }

    /// Create `expr IN (values...)`
    pub fn in_list(expr: Expr, values: Vec<Expr>) -> Self {
        Self::In(InPredicate {
            expr,
            values: InValues::List(values),
            negated: false,
        })
    }

    /// Create `expr IN (subquery)`
    pub fn in_subquery(expr: Expr, query: impl Into<Query>) -> Self {
        Self::In(InPredicate {
            expr,
            values: InValues::Subquery(Box::new(query.into())),
            negated: false,
        })
    }

    /// Create `left op ANY|ALL (subquery)`
    pub fn quantified(
        left: Expr,
        op: ComparisonOp,
        quantifier: Quantifier,
        query: impl Into<Query>,
    ) -> Self {
        Self::Quantified(QuantifiedPredicate {
            left,
            op,
            quantifier,
            subquery: Box::new(query.into()),
        })
    }

    /// Create `left IS DISTINCT FROM right`
    pub fn distinct_from(left: Expr, right: Expr) -> Self {
        Self::DistinctFrom(DistinctFromPredicate {
            left,
            right,
            negated: false,
        })
    }

    /// Create `expr IS NULL`
    pub fn is_null(expr: Expr) -> Self {
        Self::IsNull(IsNullPredicate {
            expr,
            negated: false,
        })
    }

    /// Create `EXISTS (subquery)`
    pub fn exists(query: impl Into<Query>) -> Self {
        Self::Exists(ExistsPredicate {
            subquery: Box::new(query.into()),
            negated: false,
        })
    }

    /// Create a conjunction
    pub fn and(predicates: Vec<Predicate>) -> Self {
        Self::And(predicates)
    }

    /// Create a disjunction
    pub fn or(predicates: Vec<Predicate>) -> Self {
        Self::Or(predicates)
    }

    /// Negate a predicate
    #[allow(clippy::should_implement_trait)]
    pub fn not(predicate: Predicate) -> Self {
        Self::Not(Box::new(predicate))
    }

    /// Negate the predicate where the grammar allows `NOT` inline
    pub fn negated(mut self) -> Self {
        match &mut self {
            Self::Between(p) => p.negated = !p.negated,
            Self::Like(p) => p.negated = !p.negated,
            Self::In(p) => p.negated = !p.negated,
            Self::DistinctFrom(p) => p.negated = !p.negated,
            Self::IsNull(p) => p.negated = !p.negated,
            Self::IsTruth(p) => p.negated = !p.negated,
            Self::Exists(p) => p.negated = !p.negated,
            _ => return Self::not(self),
        }
        self
    }
}
