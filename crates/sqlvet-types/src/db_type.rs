//! Scalar database types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    Boolean,
    SmallInt,
    Integer,
    /// 64-bit integer
    Long,
    /// Exact numeric
    Decimal,
    /// Approximate numeric
    Double,
    String,
    Binary,
    Date,
    Time,
    Timestamp,
    Interval,
    Json,
    Uuid,
    /// No type information; comparable with everything
    Unknown,
}

impl DbType {
    /// Every type, in declaration order
    pub const ALL: &'static [DbType] = &[
        Self::Boolean,
        Self::SmallInt,
        Self::Integer,
        Self::Long,
        Self::Decimal,
        Self::Double,
        Self::String,
        Self::Binary,
        Self::Date,
        Self::Time,
        Self::Timestamp,
        Self::Interval,
        Self::Json,
        Self::Uuid,
        Self::Unknown,
    ];

    /// Get the SQL name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::Long => "BIGINT",
            Self::Decimal => "DECIMAL",
            Self::Double => "DOUBLE",
            Self::String => "VARCHAR",
            Self::Binary => "BINARY",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Interval => "INTERVAL",
            Self::Json => "JSON",
            Self::Uuid => "UUID",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Check if this type is numeric
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::SmallInt | Self::Integer | Self::Long | Self::Decimal | Self::Double
        )
    }

    /// Check if this type is an exact integer
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::SmallInt | Self::Integer | Self::Long)
    }

    /// Check if this type is a date/time point (not an interval)
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }

    /// Check if type information is present
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Whether values of the two types may be compared with each other
    ///
    /// The relation is reflexive and symmetric, and `Unknown` is comparable with
    /// every type. Numerics compare with each other, `Date` with `Timestamp`.
    /// `String` additionally compares with the temporal types and `Uuid`,
    /// whose literals are written as strings.
    pub fn comparable(a: DbType, b: DbType) -> bool {
        if a == b || a == DbType::Unknown || b == DbType::Unknown {
            return true;
        }
        if a.is_numeric() && b.is_numeric() {
            return true;
        }
        matches!(
            (a, b),
            (DbType::Date, DbType::Timestamp)
                | (DbType::Timestamp, DbType::Date)
                | (DbType::String, DbType::Date | DbType::Time | DbType::Timestamp | DbType::Uuid)
                | (DbType::Date | DbType::Time | DbType::Timestamp | DbType::Uuid, DbType::String)
        )
    }

    /// Result type of an arithmetic operation on two numerics: the wider one
    pub fn promote(a: DbType, b: DbType) -> DbType {
        if !a.is_numeric() || !b.is_numeric() {
            return DbType::Unknown;
        }
        if a.numeric_rank() >= b.numeric_rank() { a } else { b }
    }

    const fn numeric_rank(&self) -> u8 {
        match self {
            Self::SmallInt => 1,
            Self::Integer => 2,
            Self::Long => 3,
            Self::Decimal => 4,
            Self::Double => 5,
            _ => 0,
        }
    }

    /// Canonicalize a SQL type name as written in DDL or a CAST
    ///
    /// Parameters (`VARCHAR(20)`, `DECIMAL(10,2)`), quoting, case and
    /// `UNSIGNED` are ignored. Unrecognized names map to `Unknown`.
    pub fn from_sql_name(data_type: &str) -> DbType {
        let trimmed = data_type
            .trim()
            .trim_matches(|c| c == '"' || c == '\'' || c == '`');
        let normalized = trimmed
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        if let Some((wrapper, inner)) = split_type_args(&normalized) {
            if wrapper == "nullable" || wrapper == "lowcardinality" {
                return Self::from_sql_name(inner);
            }
        }

        let base = normalized.split('(').next().unwrap_or("").trim();
        let base = base.strip_prefix("unsigned ").unwrap_or(base);
        let base = base.strip_suffix(" unsigned").unwrap_or(base);

        match base {
            "bool" | "boolean" | "bit" => DbType::Boolean,
            "tinyint" | "smallint" | "int2" | "int16" | "smallserial" => DbType::SmallInt,
            "int" | "integer" | "int4" | "int32" | "mediumint" | "serial" => DbType::Integer,
            "bigint" | "int8" | "int64" | "long" | "bigserial" => DbType::Long,
            "numeric" | "decimal" | "dec" | "number" | "money" => DbType::Decimal,
            "float" | "float4" | "float8" | "real" | "double" | "double precision"
            | "float32" | "float64" => DbType::Double,
            "char" | "character" | "varchar" | "character varying" | "nchar" | "nvarchar"
            | "text" | "string" | "clob" | "citext" => DbType::String,
            "binary" | "varbinary" | "blob" | "bytea" | "bytes" => DbType::Binary,
            "date" => DbType::Date,
            "time" | "timetz" | "time with time zone" | "time without time zone" => DbType::Time,
            "timestamp"
            | "timestamptz"
            | "datetime"
            | "datetime2"
            | "smalldatetime"
            | "timestamp with time zone"
            | "timestamp without time zone" => DbType::Timestamp,
            "interval" => DbType::Interval,
            "json" | "jsonb" | "variant" => DbType::Json,
            "uuid" | "uniqueidentifier" => DbType::Uuid,
            _ => DbType::Unknown,
        }
    }
}

fn split_type_args(data_type: &str) -> Option<(&str, &str)> {
    let open = data_type.find('(')?;
    if !data_type.ends_with(')') || open + 1 >= data_type.len() {
        return None;
    }
    let base = data_type[..open].trim();
    let inner = data_type[open + 1..data_type.len() - 1].trim();
    Some((base, inner))
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
