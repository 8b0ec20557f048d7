//! Query nodes: SELECT blocks, set operations, WITH, FROM sources

use crate::{Expr, Identifier, ObjectName, Predicate, SetOperator, WindowDef};
use serde::{Deserialize, Serialize};

/// A query expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// A single SELECT block
    Select(Box<SelectQuery>),
    /// Terms joined by UNION / INTERSECT / EXCEPT
    Composite(Box<CompositeQuery>),
    /// WITH ... body
    With(Box<WithQuery>),
}

impl Query {
    /// The query that produces rows: WITH is unwrapped to its body,
    /// a composite to its first term, recursively
    pub fn leading_select(&self) -> Option<&SelectQuery> {
        match self {
            Self::Select(s) => Some(s),
            Self::Composite(c) => c.terms.first().and_then(Query::leading_select),
            Self::With(w) => w.body.leading_select(),
        }
    }
}

impl From<SelectQuery> for Query {
    fn from(select: SelectQuery) -> Self {
        Self::Select(Box::new(select))
    }
}

impl From<CompositeQuery> for Query {
    fn from(composite: CompositeQuery) -> Self {
        Self::Composite(Box::new(composite))
    }
}

impl From<WithQuery> for Query {
    fn from(with: WithQuery) -> Self {
        Self::With(Box::new(with))
    }
}

/// A SELECT block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    #[serde(default)]
    pub distinct: bool,
    pub items: Vec<SelectItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<FromClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Predicate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<GroupingElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub having: Option<Predicate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<WindowDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Expr>,
}

impl SelectQuery {
    /// Create a SELECT with the given items and no FROM
    pub fn new(items: Vec<SelectItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// Set the leading FROM relation
    pub fn from(mut self, relation: TableRef) -> Self {
        self.from = Some(FromClause {
            relation,
            joins: Vec::new(),
        });
        self
    }

    /// Append a join to the FROM clause
    pub fn join(mut self, join: Join) -> Self {
        if let Some(from) = &mut self.from {
            from.joins.push(join);
        }
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.where_clause = Some(predicate);
        self
    }

    pub fn group_by(mut self, elements: Vec<GroupingElement>) -> Self {
        self.group_by = elements;
        self
    }

    pub fn having(mut self, predicate: Predicate) -> Self {
        self.having = Some(predicate);
        self
    }

    pub fn window(mut self, window: WindowDef) -> Self {
        self.windows.push(window);
        self
    }

    pub fn order_by(mut self, items: Vec<OrderItem>) -> Self {
        self.order_by = items;
        self
    }

    pub fn limit(mut self, limit: Expr) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: Expr) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// All FROM relations in order: the leading relation, then each join's
    pub fn relations(&self) -> Vec<&TableRef> {
        match &self.from {
            Some(from) => std::iter::once(&from.relation)
                .chain(from.joins.iter().map(|j| &j.relation))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Joins of the FROM clause
    pub fn joins(&self) -> &[Join] {
        self.from.as_ref().map(|f| f.joins.as_slice()).unwrap_or(&[])
    }

    /// Every expression named by GROUP BY, flattened through grouping sets
    pub fn grouping_exprs(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        for element in &self.group_by {
            element.collect_exprs(&mut out);
        }
        out
    }
}

/// An item of the select list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectItem {
    /// `expr [AS alias]`
    Expr {
        expr: Expr,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<Identifier>,
    },
    /// `*`
    Star,
    /// `t.*`
    QualifiedStar(Identifier),
}

impl SelectItem {
    pub fn expr(expr: Expr) -> Self {
        Self::Expr { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: impl Into<Identifier>) -> Self {
        Self::Expr {
            expr,
            alias: Some(alias.into()),
        }
    }

    pub fn qualified_star(qualifier: impl Into<Identifier>) -> Self {
        Self::QualifiedStar(qualifier.into())
    }

    /// The expression of a plain item
    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Self::Expr { expr, .. } => Some(expr),
            _ => None,
        }
    }

    /// Whether this is `*` or `t.*`
    pub fn is_star(&self) -> bool {
        matches!(self, Self::Star | Self::QualifiedStar(_))
    }
}

/// ORDER BY item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub expr: Expr,
    #[serde(default)]
    pub descending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls_first: Option<bool>,
}

impl OrderItem {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            descending: false,
            nulls_first: None,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            descending: true,
            nulls_first: None,
        }
    }

    /// `ORDER BY n`
    pub fn ordinal(position: i64) -> Self {
        Self::asc(Expr::int(position))
    }
}

/// GROUP BY element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingElement {
    /// A grouping expression (or ordinal)
    Expr(Expr),
    /// `()`
    Empty,
    /// Parenthesized list `(a, b)`
    Set(Vec<GroupingElement>),
    Rollup(Vec<GroupingElement>),
    Cube(Vec<GroupingElement>),
    GroupingSets(Vec<GroupingElement>),
}

impl GroupingElement {
    /// Append every expression in this element, depth first
    pub fn collect_exprs<'a>(&'a self, out: &mut Vec<&'a Expr>) {
        match self {
            Self::Expr(e) => out.push(e),
            Self::Empty => {}
            Self::Set(items) | Self::Rollup(items) | Self::Cube(items) | Self::GroupingSets(items) => {
                for item in items {
                    item.collect_exprs(out);
                }
            }
        }
    }
}

impl From<Expr> for GroupingElement {
    fn from(expr: Expr) -> Self {
        Self::Expr(expr)
    }
}

/// FROM clause: a leading relation followed by joins, left to right
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FromClause {
    pub relation: TableRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<Join>,
}

/// A row source in FROM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRef {
    /// Base table or CTE reference
    Table {
        name: ObjectName,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<Identifier>,
    },
    /// Subquery in FROM
    Derived {
        query: Box<Query>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<Identifier>,
        #[serde(default)]
        lateral: bool,
    },
}

impl TableRef {
    pub fn table(name: &str) -> Self {
        Self::Table {
            name: ObjectName::from(name),
            alias: None,
        }
    }

    pub fn aliased(name: &str, alias: impl Into<Identifier>) -> Self {
        Self::Table {
            name: ObjectName::from(name),
            alias: Some(alias.into()),
        }
    }

    pub fn derived(query: impl Into<Query>, alias: impl Into<Identifier>) -> Self {
        Self::Derived {
            query: Box::new(query.into()),
            alias: Some(alias.into()),
            lateral: false,
        }
    }

    pub fn lateral(query: impl Into<Query>, alias: impl Into<Identifier>) -> Self {
        Self::Derived {
            query: Box::new(query.into()),
            alias: Some(alias.into()),
            lateral: true,
        }
    }

    /// Normalized key under which this source is bound: the alias if any,
    /// else the last segment of the table name
    pub fn source_key(&self) -> Option<String> {
        match self {
            Self::Table { name, alias } => Some(
                alias
                    .as_ref()
                    .map(Identifier::normalized)
                    .unwrap_or_else(|| name.normalized_last()),
            ),
            Self::Derived { alias, .. } => alias.as_ref().map(Identifier::normalized),
        }
    }
}

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// Join condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinConstraint {
    On(Predicate),
    Using(Vec<Identifier>),
    Natural,
    None,
}

/// A join of the FROM clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub kind: JoinKind,
    pub relation: TableRef,
    pub constraint: JoinConstraint,
}

impl Join {
    pub fn inner(relation: TableRef, on: Predicate) -> Self {
        Self {
            kind: JoinKind::Inner,
            relation,
            constraint: JoinConstraint::On(on),
        }
    }

    pub fn left(relation: TableRef, on: Predicate) -> Self {
        Self {
            kind: JoinKind::Left,
            relation,
            constraint: JoinConstraint::On(on),
        }
    }

    pub fn using(relation: TableRef, columns: &[&str]) -> Self {
        Self {
            kind: JoinKind::Inner,
            relation,
            constraint: JoinConstraint::Using(columns.iter().map(|c| Identifier::new(*c)).collect()),
        }
    }

    pub fn cross(relation: TableRef) -> Self {
        Self {
            kind: JoinKind::Cross,
            relation,
            constraint: JoinConstraint::None,
        }
    }

    /// A join with no condition at all
    pub fn bare(kind: JoinKind, relation: TableRef) -> Self {
        Self {
            kind,
            relation,
            constraint: JoinConstraint::None,
        }
    }
}

/// Terms combined with set operators
///
/// `operators[i]` joins `terms[i]` and `terms[i + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeQuery {
    pub terms: Vec<Query>,
    pub operators: Vec<SetOperator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Expr>,
}

impl CompositeQuery {
    /// Start a composite from its first term
    pub fn new(first: impl Into<Query>) -> Self {
        Self {
            terms: vec![first.into()],
            operators: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Append `op term`
    pub fn then(mut self, op: SetOperator, term: impl Into<Query>) -> Self {
        self.operators.push(op);
        self.terms.push(term.into());
        self
    }

    /// `a UNION b`
    pub fn union(left: impl Into<Query>, right: impl Into<Query>) -> Self {
        Self::new(left).then(SetOperator::Union, right)
    }

    /// `a UNION ALL b`
    pub fn union_all(left: impl Into<Query>, right: impl Into<Query>) -> Self {
        Self::new(left).then(SetOperator::UnionAll, right)
    }

    pub fn order_by(mut self, items: Vec<OrderItem>) -> Self {
        self.order_by = items;
        self
    }

    pub fn limit(mut self, limit: Expr) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: Expr) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Whether every operator is UNION or UNION ALL
    pub fn is_union(&self) -> bool {
        !self.operators.is_empty() && self.operators.iter().all(SetOperator::is_union)
    }
}

/// WITH [RECURSIVE] cte, ... body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithQuery {
    #[serde(default)]
    pub recursive: bool,
    pub ctes: Vec<Cte>,
    pub body: Query,
}

impl WithQuery {
    pub fn new(ctes: Vec<Cte>, body: impl Into<Query>) -> Self {
        Self {
            recursive: false,
            ctes,
            body: body.into(),
        }
    }

    pub fn recursive(ctes: Vec<Cte>, body: impl Into<Query>) -> Self {
        Self {
            recursive: true,
            ctes,
            body: body.into(),
        }
    }
}

/// A common table expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cte {
    pub name: Identifier,
    /// Optional column list `name (c1, c2)`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Identifier>,
    pub query: Query,
}

impl Cte {
    pub fn new(name: impl Into<Identifier>, query: impl Into<Query>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            query: query.into(),
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| Identifier::new(*c)).collect();
        self
    }
}
