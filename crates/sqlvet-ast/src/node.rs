//! Borrowed node view and node tags
//!
//! [`Node`] lets traversal code and validation rules treat every element of
//! the tree uniformly. [`Node::children`] yields child nodes in the fixed
//! order that traversal relies on: field order, left to right.

use crate::{
    Cte, Expr, FunctionArg, GroupingElement, InValues, Join, JoinConstraint, OverClause,
    Predicate, Query, SelectItem, SelectQuery, CompositeQuery, TableRef, WindowDef, WindowSpec,
    WithQuery,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fieldless tag identifying the variant of a [`Node`]
///
/// Expressions and predicates get one tag per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    // Queries
    Select,
    Composite,
    With,
    Cte,
    // Query parts
    SelectItem,
    TableRef,
    Join,
    WindowDef,
    WindowSpec,
    // Expressions
    Literal,
    Column,
    Parameter,
    Binary,
    Unary,
    Function,
    Cast,
    Case,
    Subquery,
    Row,
    PredicateExpr,
    // Predicates
    Comparison,
    Between,
    Like,
    In,
    Quantified,
    DistinctFrom,
    UnaryPredicate,
    IsNull,
    IsTruth,
    Exists,
    And,
    Or,
    Not,
}

/// A borrowed view over any element of a query tree
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Select(&'a SelectQuery),
    Composite(&'a CompositeQuery),
    With(&'a WithQuery),
    Cte(&'a Cte),
    SelectItem(&'a SelectItem),
    TableRef(&'a TableRef),
    Join(&'a Join),
    WindowDef(&'a WindowDef),
    WindowSpec(&'a WindowSpec),
    Expr(&'a Expr),
    Predicate(&'a Predicate),
}

impl<'a> Node<'a> {
    /// View a query as a node
    pub fn query(query: &'a Query) -> Self {
        match query {
            Query::Select(s) => Node::Select(s),
            Query::Composite(c) => Node::Composite(c),
            Query::With(w) => Node::With(w),
        }
    }

    /// Get the tag of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Select(_) => NodeKind::Select,
            Node::Composite(_) => NodeKind::Composite,
            Node::With(_) => NodeKind::With,
            Node::Cte(_) => NodeKind::Cte,
            Node::SelectItem(_) => NodeKind::SelectItem,
            Node::TableRef(_) => NodeKind::TableRef,
            Node::Join(_) => NodeKind::Join,
            Node::WindowDef(_) => NodeKind::WindowDef,
            Node::WindowSpec(_) => NodeKind::WindowSpec,
            Node::Expr(e) => match e {
                Expr::Literal(_) => NodeKind::Literal,
                Expr::Column(_) => NodeKind::Column,
                Expr::Parameter(_) => NodeKind::Parameter,
                Expr::Binary(_) => NodeKind::Binary,
                Expr::Unary(_) => NodeKind::Unary,
                Expr::Function(_) => NodeKind::Function,
                Expr::Cast(_) => NodeKind::Cast,
                Expr::Case(_) => NodeKind::Case,
                Expr::Subquery(_) => NodeKind::Subquery,
                Expr::Row(_) => NodeKind::Row,
                Expr::Predicate(_) => NodeKind::PredicateExpr,
            },
            Node::Predicate(p) => match p {
                Predicate::Comparison(_) => NodeKind::Comparison,
                Predicate::Between(_) => NodeKind::Between,
                Predicate::Like(_) => NodeKind::Like,
                Predicate::In(_) => NodeKind::In,
                Predicate::Quantified(_) => NodeKind::Quantified,
                Predicate::DistinctFrom(_) => NodeKind::DistinctFrom,
                Predicate::Unary(_) => NodeKind::UnaryPredicate,
                Predicate::IsNull(_) => NodeKind::IsNull,
                Predicate::IsTruth(_) => NodeKind::IsTruth,
                Predicate::Exists(_) => NodeKind::Exists,
                Predicate::And(_) => NodeKind::And,
                Predicate::Or(_) => NodeKind::Or,
                Predicate::Not(_) => NodeKind::Not,
            },
        }
    }

    /// Whether this node is a query (SELECT, composite or WITH)
    pub fn is_query(&self) -> bool {
        matches!(self, Node::Select(_) | Node::Composite(_) | Node::With(_))
    }

    /// Short human-readable description used in diagnostics
    pub fn describe(&self) -> String {
        const MAX: usize = 80;
        let text = self.to_string();
        if text.chars().count() <= MAX {
            text
        } else {
            let mut cut: String = text.chars().take(MAX - 3).collect();
            cut.push_str("...");
            cut
        }
    }

    /// Child nodes in traversal order
    pub fn children(&self) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        match *self {
            Node::Select(s) => {
                if let Some(from) = &s.from {
                    out.push(Node::TableRef(&from.relation));
                    out.extend(from.joins.iter().map(Node::Join));
                }
                out.extend(s.items.iter().map(Node::SelectItem));
                out.extend(s.where_clause.iter().map(Node::Predicate));
                for element in &s.group_by {
                    push_grouping(element, &mut out);
                }
                out.extend(s.having.iter().map(Node::Predicate));
                out.extend(s.windows.iter().map(Node::WindowDef));
                out.extend(s.order_by.iter().map(|o| Node::Expr(&o.expr)));
                out.extend(s.limit.iter().map(Node::Expr));
                out.extend(s.offset.iter().map(Node::Expr));
            }
            Node::Composite(c) => {
                out.extend(c.terms.iter().map(Node::query));
                out.extend(c.order_by.iter().map(|o| Node::Expr(&o.expr)));
                out.extend(c.limit.iter().map(Node::Expr));
                out.extend(c.offset.iter().map(Node::Expr));
            }
            Node::With(w) => {
                out.extend(w.ctes.iter().map(Node::Cte));
                out.push(Node::query(&w.body));
            }
            Node::Cte(cte) => out.push(Node::query(&cte.query)),
            Node::SelectItem(item) => out.extend(item.as_expr().map(Node::Expr)),
            Node::TableRef(table) => {
                if let TableRef::Derived { query, .. } = table {
                    out.push(Node::query(query));
                }
            }
            Node::Join(join) => {
                out.push(Node::TableRef(&join.relation));
                if let JoinConstraint::On(p) = &join.constraint {
                    out.push(Node::Predicate(p));
                }
            }
            Node::WindowDef(def) => out.push(Node::WindowSpec(&def.spec)),
            Node::WindowSpec(spec) => push_window_spec(spec, &mut out),
            Node::Expr(e) => push_expr_children(e, &mut out),
            Node::Predicate(p) => push_predicate_children(p, &mut out),
        }
        out
    }
}

fn push_grouping<'a>(element: &'a GroupingElement, out: &mut Vec<Node<'a>>) {
    let mut exprs = Vec::new();
    element.collect_exprs(&mut exprs);
    out.extend(exprs.into_iter().map(Node::Expr));
}

fn push_window_spec<'a>(spec: &'a WindowSpec, out: &mut Vec<Node<'a>>) {
    out.extend(spec.partition_by.iter().map(Node::Expr));
    out.extend(spec.order_by.iter().map(|o| Node::Expr(&o.expr)));
    if let Some(frame) = &spec.frame {
        out.extend(frame.bounds().filter_map(|b| b.offset()).map(Node::Expr));
    }
}

fn push_expr_children<'a>(expr: &'a Expr, out: &mut Vec<Node<'a>>) {
    match expr {
        Expr::Literal(_) | Expr::Column(_) | Expr::Parameter(_) => {}
        Expr::Binary(b) => {
            out.push(Node::Expr(&b.left));
            out.push(Node::Expr(&b.right));
        }
        Expr::Unary(u) => out.push(Node::Expr(&u.operand)),
        Expr::Function(f) => {
            for arg in &f.args {
                if let FunctionArg::Expr(e) = arg {
                    out.push(Node::Expr(e));
                }
            }
            out.extend(f.filter.as_deref().map(Node::Predicate));
            out.extend(f.within_group.iter().map(|o| Node::Expr(&o.expr)));
            if let Some(OverClause::Spec(spec)) = &f.over {
                out.push(Node::WindowSpec(spec));
            }
        }
        Expr::Cast(c) => out.push(Node::Expr(&c.expr)),
        Expr::Case(c) => {
            out.extend(c.operand.as_deref().map(Node::Expr));
            for when in &c.whens {
                out.push(Node::Expr(&when.condition));
                out.push(Node::Expr(&when.result));
            }
            out.extend(c.else_result.as_deref().map(Node::Expr));
        }
        Expr::Subquery(q) => out.push(Node::query(q)),
        Expr::Row(items) => out.extend(items.iter().map(Node::Expr)),
        Expr::Predicate(p) => out.push(Node::Predicate(p)),
    }
}

fn push_predicate_children<'a>(predicate: &'a Predicate, out: &mut Vec<Node<'a>>) {
    match predicate {
        Predicate::Comparison(c) => {
            out.push(Node::Expr(&c.left));
            out.push(Node::Expr(&c.right));
        }
        Predicate::Between(b) => {
            out.push(Node::Expr(&b.expr));
            out.push(Node::Expr(&b.low));
            out.push(Node::Expr(&b.high));
        }
        Predicate::Like(l) => {
            out.push(Node::Expr(&l.expr));
            out.push(Node::Expr(&l.pattern));
            out.extend(l.escape.iter().map(Node::Expr));
        }
        Predicate::In(i) => {
            out.push(Node::Expr(&i.expr));
            match &i.values {
                InValues::List(values) => out.extend(values.iter().map(Node::Expr)),
                InValues::Subquery(q) => out.push(Node::query(q)),
            }
        }
        Predicate::Quantified(q) => {
            out.push(Node::Expr(&q.left));
            out.push(Node::query(&q.subquery));
        }
        Predicate::DistinctFrom(d) => {
            out.push(Node::Expr(&d.left));
            out.push(Node::Expr(&d.right));
        }
        Predicate::Unary(e) => out.push(Node::Expr(e)),
        Predicate::IsNull(p) => out.push(Node::Expr(&p.expr)),
        Predicate::IsTruth(p) => out.push(Node::Expr(&p.expr)),
        Predicate::Exists(e) => out.push(Node::query(&e.subquery)),
        Predicate::And(items) | Predicate::Or(items) => {
            out.extend(items.iter().map(Node::Predicate))
        }
        Predicate::Not(inner) => out.push(Node::Predicate(inner)),
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Select(s) => write!(f, "{}", s),
            Node::Composite(c) => write!(f, "{}", c),
            Node::With(w) => write!(f, "{}", w),
            Node::Cte(c) => write!(f, "{} AS (...)", c.name),
            Node::SelectItem(i) => write!(f, "{}", i),
            Node::TableRef(t) => write!(f, "{}", t),
            Node::Join(j) => write!(f, "{}", j),
            Node::WindowDef(w) => write!(f, "{} AS ({})", w.name, w.spec),
            Node::WindowSpec(s) => write!(f, "({})", s),
            Node::Expr(e) => write!(f, "{}", e),
            Node::Predicate(p) => write!(f, "{}", p),
        }
    }
}
