//! Diagnostic codes following a structured numbering system
//!
//! Code ranges:
//! - SQLV0100-SQLV0199: Name resolution and access (tables, columns)
//! - SQLV0200-SQLV0299: Typing and shape (type mismatches, subquery shape)
//! - SQLV0300-SQLV0399: Aggregation, grouping, ordering, LIMIT/OFFSET
//! - SQLV0400-SQLV0499: Set operations and common table expressions
//! - SQLV0500-SQLV0599: Window definitions and frames
//! - SQLV0600-SQLV0699: Joins
//! - SQLV0700-SQLV0799: Functions, policy and structural limits

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Diagnostic code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProblemCode {
    // Resolution and access
    ColumnNotFound,
    ColumnAmbiguous,
    ColumnAccessDenied,
    TableNotFound,
    SourceAliasDuplicate,

    // Typing and shape
    TypeMismatch,
    SubqueryShapeMismatch,
    RowArityMismatch,

    // Aggregation, grouping, ordering
    AggregationMisuse,
    GroupByInvalidOrdinal,
    OrderByInvalidOrdinal,
    OrderByInvalidExpression,
    LimitOffsetInvalid,

    // Set operations and CTEs
    SetOperationColumnCountMismatch,
    CteDuplicateName,
    CteSelfReference,
    CteRecursiveStructureInvalid,
    CteColumnCountMismatch,

    // Windows
    WindowDuplicateName,
    WindowNotFound,
    WindowInheritanceCycle,
    WindowInheritanceInvalid,
    WindowFrameInvalid,

    // Joins
    JoinOnMissingPredicate,
    JoinOnInvalidReference,
    JoinUsingInvalidColumn,

    // Functions, policy, limits
    FunctionNotAllowed,
    FunctionArityMismatch,
    FunctionArgumentInvalid,
    MaxJoinsExceeded,
    MaxSelectColumnsExceeded,
}

impl ProblemCode {
    /// Every code, in numbering order
    pub const ALL: &'static [ProblemCode] = &[
        Self::ColumnNotFound,
        Self::ColumnAmbiguous,
        Self::ColumnAccessDenied,
        Self::TableNotFound,
        Self::SourceAliasDuplicate,
        Self::TypeMismatch,
        Self::SubqueryShapeMismatch,
        Self::RowArityMismatch,
        Self::AggregationMisuse,
        Self::GroupByInvalidOrdinal,
        Self::OrderByInvalidOrdinal,
        Self::OrderByInvalidExpression,
        Self::LimitOffsetInvalid,
        Self::SetOperationColumnCountMismatch,
        Self::CteDuplicateName,
        Self::CteSelfReference,
        Self::CteRecursiveStructureInvalid,
        Self::CteColumnCountMismatch,
        Self::WindowDuplicateName,
        Self::WindowNotFound,
        Self::WindowInheritanceCycle,
        Self::WindowInheritanceInvalid,
        Self::WindowFrameInvalid,
        Self::JoinOnMissingPredicate,
        Self::JoinOnInvalidReference,
        Self::JoinUsingInvalidColumn,
        Self::FunctionNotAllowed,
        Self::FunctionArityMismatch,
        Self::FunctionArgumentInvalid,
        Self::MaxJoinsExceeded,
        Self::MaxSelectColumnsExceeded,
    ];

    /// Get the numeric code
    pub const fn number(&self) -> u16 {
        match self {
            Self::ColumnNotFound => 100,
            Self::ColumnAmbiguous => 101,
            Self::ColumnAccessDenied => 102,
            Self::TableNotFound => 103,
            Self::SourceAliasDuplicate => 104,
            Self::TypeMismatch => 200,
            Self::SubqueryShapeMismatch => 201,
            Self::RowArityMismatch => 202,
            Self::AggregationMisuse => 300,
            Self::GroupByInvalidOrdinal => 301,
            Self::OrderByInvalidOrdinal => 302,
            Self::OrderByInvalidExpression => 303,
            Self::LimitOffsetInvalid => 304,
            Self::SetOperationColumnCountMismatch => 400,
            Self::CteDuplicateName => 401,
            Self::CteSelfReference => 402,
            Self::CteRecursiveStructureInvalid => 403,
            Self::CteColumnCountMismatch => 404,
            Self::WindowDuplicateName => 500,
            Self::WindowNotFound => 501,
            Self::WindowInheritanceCycle => 502,
            Self::WindowInheritanceInvalid => 503,
            Self::WindowFrameInvalid => 504,
            Self::JoinOnMissingPredicate => 600,
            Self::JoinOnInvalidReference => 601,
            Self::JoinUsingInvalidColumn => 602,
            Self::FunctionNotAllowed => 700,
            Self::FunctionArityMismatch => 701,
            Self::FunctionArgumentInvalid => 702,
            Self::MaxJoinsExceeded => 703,
            Self::MaxSelectColumnsExceeded => 704,
        }
    }

    /// Stable upper-snake-case name, as used in JSON output and configuration
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ColumnNotFound => "COLUMN_NOT_FOUND",
            Self::ColumnAmbiguous => "COLUMN_AMBIGUOUS",
            Self::ColumnAccessDenied => "COLUMN_ACCESS_DENIED",
            Self::TableNotFound => "TABLE_NOT_FOUND",
            Self::SourceAliasDuplicate => "SOURCE_ALIAS_DUPLICATE",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::SubqueryShapeMismatch => "SUBQUERY_SHAPE_MISMATCH",
            Self::RowArityMismatch => "ROW_ARITY_MISMATCH",
            Self::AggregationMisuse => "AGGREGATION_MISUSE",
            Self::GroupByInvalidOrdinal => "GROUP_BY_INVALID_ORDINAL",
            Self::OrderByInvalidOrdinal => "ORDER_BY_INVALID_ORDINAL",
            Self::OrderByInvalidExpression => "ORDER_BY_INVALID_EXPRESSION",
            Self::LimitOffsetInvalid => "LIMIT_OFFSET_INVALID",
            Self::SetOperationColumnCountMismatch => "SET_OPERATION_COLUMN_COUNT_MISMATCH",
            Self::CteDuplicateName => "CTE_DUPLICATE_NAME",
            Self::CteSelfReference => "CTE_SELF_REFERENCE",
            Self::CteRecursiveStructureInvalid => "CTE_RECURSIVE_STRUCTURE_INVALID",
            Self::CteColumnCountMismatch => "CTE_COLUMN_COUNT_MISMATCH",
            Self::WindowDuplicateName => "WINDOW_DUPLICATE_NAME",
            Self::WindowNotFound => "WINDOW_NOT_FOUND",
            Self::WindowInheritanceCycle => "WINDOW_INHERITANCE_CYCLE",
            Self::WindowInheritanceInvalid => "WINDOW_INHERITANCE_INVALID",
            Self::WindowFrameInvalid => "WINDOW_FRAME_INVALID",
            Self::JoinOnMissingPredicate => "JOIN_ON_MISSING_PREDICATE",
            Self::JoinOnInvalidReference => "JOIN_ON_INVALID_REFERENCE",
            Self::JoinUsingInvalidColumn => "JOIN_USING_INVALID_COLUMN",
            Self::FunctionNotAllowed => "FUNCTION_NOT_ALLOWED",
            Self::FunctionArityMismatch => "FUNCTION_ARITY_MISMATCH",
            Self::FunctionArgumentInvalid => "FUNCTION_ARGUMENT_INVALID",
            Self::MaxJoinsExceeded => "MAX_JOINS_EXCEEDED",
            Self::MaxSelectColumnsExceeded => "MAX_SELECT_COLUMNS_EXCEEDED",
        }
    }

    /// Numbered identifier, e.g. `SQLV0300`
    pub fn id(&self) -> String {
        format!("SQLV{:04}", self.number())
    }

    /// Get descriptive information for this code
    pub fn info(&self) -> &'static ProblemInfo {
        PROBLEM_INFO.get(self).unwrap_or(&UNKNOWN_PROBLEM)
    }

    /// Check if this is a resolution or access problem (0100-0199)
    pub const fn is_resolution(&self) -> bool {
        let n = self.number();
        n >= 100 && n < 200
    }

    /// Check if this is a typing or shape problem (0200-0299)
    pub const fn is_typing(&self) -> bool {
        let n = self.number();
        n >= 200 && n < 300
    }

    /// Check if this is an aggregation/grouping/ordering problem (0300-0399)
    pub const fn is_grouping(&self) -> bool {
        let n = self.number();
        n >= 300 && n < 400
    }

    /// Check if this is a set operation or CTE problem (0400-0499)
    pub const fn is_query_structure(&self) -> bool {
        let n = self.number();
        n >= 400 && n < 500
    }

    /// Check if this is a window problem (0500-0599)
    pub const fn is_window(&self) -> bool {
        let n = self.number();
        n >= 500 && n < 600
    }

    /// Check if this is a join problem (0600-0699)
    pub const fn is_join(&self) -> bool {
        let n = self.number();
        n >= 600 && n < 700
    }

    /// Check if this is a function, policy or limit problem (0700-0799)
    pub const fn is_policy(&self) -> bool {
        let n = self.number();
        n >= 700 && n < 800
    }
}

impl fmt::Display for ProblemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProblemCode {
    type Err = crate::SqlvetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.name().eq_ignore_ascii_case(wanted) || code.id() == wanted)
            .ok_or_else(|| crate::SqlvetError::UnknownProblemCode(wanted.to_string()))
    }
}

/// Information about a diagnostic code
#[derive(Debug, Clone)]
pub struct ProblemInfo {
    /// Short description of the problem
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ProblemInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_PROBLEM: ProblemInfo = ProblemInfo::new("Unknown problem");

static PROBLEM_INFO: LazyLock<HashMap<ProblemCode, ProblemInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    map.insert(ProblemCode::ColumnNotFound, ProblemInfo::new("Column not found")
        .with_help("Check the column name and that its table is in the FROM clause"));
    map.insert(ProblemCode::ColumnAmbiguous, ProblemInfo::new("Ambiguous column reference")
        .with_help("Qualify the column with a table name or alias"));
    map.insert(ProblemCode::ColumnAccessDenied, ProblemInfo::new("Column access denied by policy"));
    map.insert(ProblemCode::TableNotFound, ProblemInfo::new("Table not found"));
    map.insert(ProblemCode::SourceAliasDuplicate, ProblemInfo::new("Duplicate table alias in FROM clause"));

    map.insert(ProblemCode::TypeMismatch, ProblemInfo::new("Incompatible types"));
    map.insert(ProblemCode::SubqueryShapeMismatch, ProblemInfo::new("Subquery must return exactly one column")
        .with_help("A subquery in scalar position must project a single expression"));
    map.insert(ProblemCode::RowArityMismatch, ProblemInfo::new("Row constructor width mismatch"));

    map.insert(ProblemCode::AggregationMisuse, ProblemInfo::new("Invalid use of aggregation")
        .with_help("Non-aggregated columns must appear in GROUP BY"));
    map.insert(ProblemCode::GroupByInvalidOrdinal, ProblemInfo::new("GROUP BY position out of range"));
    map.insert(ProblemCode::OrderByInvalidOrdinal, ProblemInfo::new("ORDER BY position out of range"));
    map.insert(ProblemCode::OrderByInvalidExpression, ProblemInfo::new("Invalid ORDER BY expression for set operation")
        .with_help("ORDER BY on a set operation must name an output column of the first query"));
    map.insert(ProblemCode::LimitOffsetInvalid, ProblemInfo::new("Invalid LIMIT or OFFSET value"));

    map.insert(ProblemCode::SetOperationColumnCountMismatch, ProblemInfo::new("Set operation column count mismatch"));
    map.insert(ProblemCode::CteDuplicateName, ProblemInfo::new("Duplicate common table expression name"));
    map.insert(ProblemCode::CteSelfReference, ProblemInfo::new("Non-recursive CTE references itself")
        .with_help("Use WITH RECURSIVE for self-referencing common table expressions"));
    map.insert(ProblemCode::CteRecursiveStructureInvalid, ProblemInfo::new("Invalid recursive CTE structure")
        .with_help("A recursive CTE must be an anchor query UNION [ALL] a self-referencing query"));
    map.insert(ProblemCode::CteColumnCountMismatch, ProblemInfo::new("CTE column list does not match its query"));

    map.insert(ProblemCode::WindowDuplicateName, ProblemInfo::new("Duplicate window name"));
    map.insert(ProblemCode::WindowNotFound, ProblemInfo::new("Window not found"));
    map.insert(ProblemCode::WindowInheritanceCycle, ProblemInfo::new("Circular window inheritance"));
    map.insert(ProblemCode::WindowInheritanceInvalid, ProblemInfo::new("Invalid window inheritance"));
    map.insert(ProblemCode::WindowFrameInvalid, ProblemInfo::new("Invalid window frame"));

    map.insert(ProblemCode::JoinOnMissingPredicate, ProblemInfo::new("JOIN requires an ON condition"));
    map.insert(ProblemCode::JoinOnInvalidReference, ProblemInfo::new("JOIN condition references a table that is not yet joined"));
    map.insert(ProblemCode::JoinUsingInvalidColumn, ProblemInfo::new("Invalid JOIN USING column"));

    map.insert(ProblemCode::FunctionNotAllowed, ProblemInfo::new("Function not allowed by policy"));
    map.insert(ProblemCode::FunctionArityMismatch, ProblemInfo::new("Wrong number of function arguments"));
    map.insert(ProblemCode::FunctionArgumentInvalid, ProblemInfo::new("Invalid function argument"));
    map.insert(ProblemCode::MaxJoinsExceeded, ProblemInfo::new("Too many joins"));
    map.insert(ProblemCode::MaxSelectColumnsExceeded, ProblemInfo::new("Too many select columns"));

    map
});
