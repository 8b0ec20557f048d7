//! Function signatures

use crate::DbType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of value accepted at one argument position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    /// `*` or any expression (`COUNT(*)`, `COUNT(x)`)
    StarOrExpr,
    /// Any expression, but not `*`
    AnyExpr,
    /// An expression of string type
    String,
    /// An expression of numeric type
    Numeric,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StarOrExpr => write!(f, "* or expression"),
            Self::AnyExpr => write!(f, "expression"),
            Self::String => write!(f, "string expression"),
            Self::Numeric => write!(f, "numeric expression"),
        }
    }
}

/// How a function's result type is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    /// Always this type
    Fixed(DbType),
    /// Same type as the argument at this position
    Argument(usize),
    /// Not known statically
    #[default]
    Unknown,
}

/// Arity and argument-kind contract of a function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Normalized (lower-case, unqualified) function name
    pub name: String,
    pub min_args: usize,
    /// `None` for variadic functions
    #[serde(default)]
    pub max_args: Option<usize>,
    /// Positional argument kinds; the last kind repeats for variadic tails
    #[serde(default)]
    pub arg_kinds: Vec<ArgKind>,
    /// Aggregate function (`SUM`, `COUNT`, ...)
    #[serde(default)]
    pub aggregate: bool,
    #[serde(default)]
    pub returns: ReturnType,
}

impl FunctionSignature {
    /// Create a scalar function signature
    pub fn scalar(name: &str, min_args: usize, max_args: Option<usize>, arg_kinds: Vec<ArgKind>) -> Self {
        Self {
            name: name.to_lowercase(),
            min_args,
            max_args,
            arg_kinds,
            aggregate: false,
            returns: ReturnType::Unknown,
        }
    }

    /// Create an aggregate function signature
    pub fn aggregate(name: &str, min_args: usize, max_args: Option<usize>, arg_kinds: Vec<ArgKind>) -> Self {
        Self {
            aggregate: true,
            ..Self::scalar(name, min_args, max_args, arg_kinds)
        }
    }

    /// Set the return type
    pub fn returns(mut self, returns: ReturnType) -> Self {
        self.returns = returns;
        self
    }

    /// Set a fixed return type
    pub fn returning(self, ty: DbType) -> Self {
        self.returns(ReturnType::Fixed(ty))
    }

    /// Check if `count` arguments are accepted
    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.is_none_or(|max| count <= max)
    }

    /// Expected kind at a position; the last declared kind repeats
    pub fn arg_kind(&self, position: usize) -> Option<ArgKind> {
        self.arg_kinds
            .get(position)
            .or_else(|| self.arg_kinds.last())
            .copied()
    }

    /// Human-readable arity, e.g. `1`, `1 to 3`, `at least 2`
    pub fn arity_description(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{} to {}", self.min_args, max),
            None => format!("at least {}", self.min_args),
        }
    }
}
