//! Tree walker
//!
//! Visits a query pre-order, left to right, keeping the context's scopes and
//! CTE frames in step with the position in the tree. Each visited node is
//! handed to the rules registered for its kind.
//!
//! Order within a SELECT: the select node (with every FROM source already
//! bound), the FROM relations and joins, select items, WHERE, GROUP BY,
//! HAVING, WINDOW definitions, ORDER BY, LIMIT, OFFSET.

use crate::context::ValidationContext;
use crate::registry::RuleRegistry;
use crate::scope::{Clause, ScopeId, ScopeKind};
use sqlvet_ast::{
    CompositeQuery, JoinConstraint, Node, Query, SelectQuery, TableRef, WithQuery,
};

/// Walks a query tree, dispatching rules
pub struct Walker<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> Walker<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    /// Walk a query from the context's current scope
    pub fn walk<'a>(&self, query: &'a Query, ctx: &mut ValidationContext<'a>) {
        let parent = ctx.current_scope_id();
        self.walk_query(query, ctx, parent);
    }

    fn walk_query<'a>(&self, query: &'a Query, ctx: &mut ValidationContext<'a>, parent: Option<ScopeId>) {
        match query {
            Query::Select(select) => self.walk_select(select, ctx, parent),
            Query::Composite(composite) => self.walk_composite(composite, ctx, parent),
            Query::With(with) => self.walk_with(with, ctx, parent),
        }
    }

    fn walk_select<'a>(
        &self,
        select: &'a SelectQuery,
        ctx: &mut ValidationContext<'a>,
        parent: Option<ScopeId>,
    ) {
        let scope = ctx.push_select_scope(select, parent, ScopeKind::Select);
        self.registry.dispatch(Node::Select(select), ctx);

        if let Some(from) = &select.from {
            ctx.set_cursor(0);
            self.walk_relation(&from.relation, ctx, scope);
            for (k, join) in from.joins.iter().enumerate() {
                // The join's own relation is visible to its ON predicate
                ctx.set_cursor(k + 2);
                self.registry.dispatch(Node::Join(join), ctx);
                ctx.set_cursor(k + 1);
                self.walk_relation(&join.relation, ctx, scope);
                if let JoinConstraint::On(predicate) = &join.constraint {
                    ctx.set_cursor(k + 2);
                    self.visit(Node::Predicate(predicate), ctx);
                }
            }
            ctx.set_cursor(usize::MAX);
        }

        ctx.set_clause(Clause::Select);
        for item in &select.items {
            self.visit(Node::SelectItem(item), ctx);
        }

        if let Some(predicate) = &select.where_clause {
            ctx.set_clause(Clause::Where);
            self.visit(Node::Predicate(predicate), ctx);
        }

        ctx.set_clause(Clause::GroupBy);
        for expr in select.grouping_exprs() {
            self.visit(Node::Expr(expr), ctx);
        }

        if let Some(predicate) = &select.having {
            ctx.set_clause(Clause::Having);
            self.visit(Node::Predicate(predicate), ctx);
        }

        ctx.set_clause(Clause::Window);
        for window in &select.windows {
            self.visit(Node::WindowDef(window), ctx);
        }

        ctx.set_clause(Clause::OrderBy);
        for item in &select.order_by {
            self.visit(Node::Expr(&item.expr), ctx);
        }

        ctx.set_clause(Clause::Limit);
        for expr in select.limit.iter().chain(&select.offset) {
            self.visit(Node::Expr(expr), ctx);
        }

        ctx.pop_scope();
    }

    fn walk_relation<'a>(&self, relation: &'a TableRef, ctx: &mut ValidationContext<'a>, scope: ScopeId) {
        self.registry.dispatch(Node::TableRef(relation), ctx);
        if let TableRef::Derived { query, lateral, .. } = relation {
            let parent = if *lateral {
                Some(scope)
            } else {
                ctx.scope(scope).parent()
            };
            self.walk_query(query, ctx, parent);
        }
    }

    fn walk_composite<'a>(
        &self,
        composite: &'a CompositeQuery,
        ctx: &mut ValidationContext<'a>,
        parent: Option<ScopeId>,
    ) {
        self.registry.dispatch(Node::Composite(composite), ctx);
        for term in &composite.terms {
            self.walk_query(term, ctx, parent);
        }

        let has_tail =
            !composite.order_by.is_empty() || composite.limit.is_some() || composite.offset.is_some();
        if !has_tail {
            return;
        }

        // ORDER BY of a set operation sees the first term's sources and aliases
        let first = composite.terms.first().and_then(Query::leading_select);
        if let Some(first) = first {
            ctx.push_select_scope(first, parent, ScopeKind::SetOrder);
        }
        ctx.set_clause(Clause::OrderBy);
        for item in &composite.order_by {
            self.visit(Node::Expr(&item.expr), ctx);
        }
        ctx.set_clause(Clause::Limit);
        for expr in composite.limit.iter().chain(&composite.offset) {
            self.visit(Node::Expr(expr), ctx);
        }
        if first.is_some() {
            ctx.pop_scope();
        }
    }

    fn walk_with<'a>(&self, with: &'a WithQuery, ctx: &mut ValidationContext<'a>, parent: Option<ScopeId>) {
        self.registry.dispatch(Node::With(with), ctx);
        ctx.push_cte_frame(with);
        for (index, cte) in with.ctes.iter().enumerate() {
            ctx.enter_cte_definition(index);
            self.registry.dispatch(Node::Cte(cte), ctx);
            self.walk_query(&cte.query, ctx, parent);
        }
        ctx.leave_cte_definitions();
        self.walk_query(&with.body, ctx, parent);
        ctx.pop_cte_frame();
    }

    /// Visit an expression-level node and its children; a nested query opens
    /// a scope correlated with the current one
    fn visit<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let parent = ctx.current_scope_id();
        match node {
            Node::Select(select) => return self.walk_select(select, ctx, parent),
            Node::Composite(composite) => return self.walk_composite(composite, ctx, parent),
            Node::With(with) => return self.walk_with(with, ctx, parent),
            _ => {}
        }
        self.registry.dispatch(node, ctx);
        for child in node.children() {
            self.visit(child, ctx);
        }
    }
}
