//! Literal values

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    /// NULL
    Null,
    /// TRUE / FALSE
    Boolean(bool),
    /// Exact integer
    Integer(i64),
    /// Exact decimal (`12.50`)
    Decimal(Decimal),
    /// Approximate numeric (`1.5e3`)
    Float(f64),
    /// Character string
    String(String),
    /// DATE 'YYYY-MM-DD'
    Date(NaiveDate),
    /// TIME 'hh:mm:ss'
    Time(NaiveTime),
    /// TIMESTAMP 'YYYY-MM-DD hh:mm:ss'
    Timestamp(NaiveDateTime),
    /// INTERVAL '...' kept as written
    Interval(String),
}

impl Literal {
    /// Check if this literal is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Decimal(_) | Self::Float(_))
    }

    /// Check if this literal is a negative number
    pub fn is_negative(&self) -> bool {
        match self {
            Self::Integer(i) => *i < 0,
            Self::Decimal(d) => d.is_sign_negative() && !d.is_zero(),
            Self::Float(f) => *f < 0.0,
            _ => false,
        }
    }
}
