//! Validation context
//!
//! The context owns all mutable state of one validation pass: the scope
//! stack, the CTE frames of enclosing WITH clauses and the accumulated
//! problems. Rules receive it mutably and use it to resolve names, infer
//! types and report findings.

use crate::config::ValidationConfig;
use crate::scope::{
    BoundSource, Clause, ColumnLookup, ColumnSet, CteFrame, CteState, Scope, ScopeId, ScopeKind,
    SourceKind,
};
use indexmap::IndexSet;
use sqlvet_ast::{ColumnRef, Join, Node, Query, SelectItem, SelectQuery, TableRef, WindowDef, WithQuery};
use sqlvet_catalog::{AccessPolicy, Catalog, StructuralLimits, TableMetadata};
use sqlvet_diagnostics::{ProblemCode, ValidationProblem};
use sqlvet_types::{DbType, FunctionSignature, Inferred};
use std::collections::HashMap;

/// Outcome of resolving a column reference
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    /// Resolved to exactly one source (or an output alias, with no table)
    Found {
        table: Option<&'a TableMetadata>,
        ty: Inferred<DbType>,
    },
    /// Possibly valid, but nothing can be said about it
    Unknown,
    NotFound(String),
    Ambiguous(String),
}

/// Sources of the current scope exposing a column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMatches {
    /// Key and type of each source that definitely exposes the column
    pub sources: Vec<(Option<String>, Inferred<DbType>)>,
    /// Some source might expose it
    pub open: bool,
}

/// Mutable state of a validation pass
pub struct ValidationContext<'a> {
    catalog: &'a dyn Catalog,
    config: &'a ValidationConfig,
    scopes: Vec<Scope<'a>>,
    ctes: Vec<CteFrame<'a>>,
    derived: HashMap<*const Query, ColumnSet>,
    resolving_alias: bool,
    problems: Vec<ValidationProblem>,
}

impl<'a> ValidationContext<'a> {
    /// Create a context with an empty scope stack
    pub fn new(catalog: &'a dyn Catalog, config: &'a ValidationConfig) -> Self {
        Self {
            catalog,
            config,
            scopes: Vec::new(),
            ctes: Vec::new(),
            derived: HashMap::new(),
            resolving_alias: false,
            problems: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &'a dyn Catalog {
        self.catalog
    }

    pub fn config(&self) -> &'a ValidationConfig {
        self.config
    }

    /// Problems reported so far
    pub fn problems(&self) -> &[ValidationProblem] {
        &self.problems
    }

    pub fn into_problems(self) -> Vec<ValidationProblem> {
        self.problems
    }

    /// Record a problem; the configured severity override applies
    pub fn add_problem(
        &mut self,
        code: ProblemCode,
        message: impl Into<String>,
        node: Node<'_>,
        clause_path: &str,
    ) {
        self.push_problem(code, message.into(), node.describe(), clause_path);
    }

    fn push_problem(&mut self, code: ProblemCode, message: String, node: String, clause_path: &str) {
        let problem = ValidationProblem::error(code, message)
            .with_node(node)
            .with_clause(clause_path)
            .with_severity(self.config.severity_for(code));
        log::trace!("problem: {}", problem);
        self.problems.push(problem);
    }

    // ------------------------------------------------------------------
    // Catalog and policy
    // ------------------------------------------------------------------

    pub fn access_policy(&self) -> &'a AccessPolicy {
        self.catalog.access_policy()
    }

    pub fn is_function_allowed(&self, name: &str) -> bool {
        self.access_policy().is_function_allowed(name)
    }

    pub fn function_signature(&self, name: &str) -> Option<&'a FunctionSignature> {
        self.catalog.function(name)
    }

    /// Limits in force: the configuration's override, else the catalog's
    pub fn limits(&self) -> StructuralLimits {
        self.config
            .limits
            .unwrap_or_else(|| *self.catalog.limits())
    }

    // ------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------

    /// Enter a scope for a SELECT and bind all of its FROM sources
    pub fn push_select_scope(
        &mut self,
        select: &'a SelectQuery,
        parent: Option<ScopeId>,
        kind: ScopeKind,
    ) -> ScopeId {
        let depth = parent.map_or(0, |p| self.scopes[p].depth() + 1);
        let id = self.scopes.len();
        self.scopes.push(Scope::for_select(kind, parent, depth, select));
        for relation in select.relations() {
            let source = self.bind_source(relation, id);
            self.scopes[id].bind(source);
        }
        log::trace!(
            "enter {} scope {} (depth {}, {} sources)",
            kind,
            id,
            depth,
            self.scopes[id].sources().len()
        );
        id
    }

    /// Leave the innermost scope
    pub fn pop_scope(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            log::trace!("leave {} scope {}", scope.kind(), self.scopes.len());
        }
    }

    pub fn current_scope_id(&self) -> Option<ScopeId> {
        self.scopes.len().checked_sub(1)
    }

    pub fn current_scope(&self) -> Option<&Scope<'a>> {
        self.scopes.last()
    }

    pub fn current_scope_mut(&mut self) -> Option<&mut Scope<'a>> {
        self.scopes.last_mut()
    }

    pub fn scope(&self, id: ScopeId) -> &Scope<'a> {
        &self.scopes[id]
    }

    /// Set the clause being walked in the current scope
    pub fn set_clause(&mut self, clause: Clause) {
        if let Some(scope) = self.current_scope_mut() {
            scope.set_clause(clause);
        }
    }

    /// Move the join cursor of the current scope
    pub fn set_cursor(&mut self, count: usize) {
        if let Some(scope) = self.current_scope_mut() {
            scope.set_cursor(count);
        }
    }

    /// Clause path segment of the current position
    pub fn clause_name(&self) -> &'static str {
        self.current_scope().map_or("query", |s| s.clause().name())
    }

    /// Clause being walked in the current scope
    pub fn current_clause(&self) -> Option<Clause> {
        self.current_scope().map(Scope::clause)
    }

    /// Clause path for a problem found by a construct, e.g. `where.comparison`
    pub fn clause_path(&self, construct: &str) -> String {
        format!("{}.{}", self.clause_name(), construct)
    }

    /// Keys of every source bound in the current scope, hidden ones included
    pub fn current_scope_source_keys(&self) -> IndexSet<String> {
        self.current_scope()
            .map(|scope| {
                scope
                    .sources()
                    .iter()
                    .filter_map(|s| s.key.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Keys an ON predicate of `join` may reference: the leading relation and
    /// every join up to and including this one
    pub fn on_join_visible_aliases(&self, join: &Join) -> IndexSet<String> {
        let Some(scope) = self.current_scope() else {
            return IndexSet::new();
        };
        let visible = self
            .join_relation_position(join)
            .map_or(scope.cursor(), |position| position + 1);
        scope
            .sources()
            .iter()
            .take(visible)
            .filter_map(|s| s.key.clone())
            .collect()
    }

    /// Named window of the current SELECT
    pub fn window(&self, name: &str) -> Option<&'a WindowDef> {
        self.current_scope()?
            .windows()
            .iter()
            .find(|w| w.name.normalized() == name)
    }

    // ------------------------------------------------------------------
    // CTE frames
    // ------------------------------------------------------------------

    pub fn push_cte_frame(&mut self, with: &'a WithQuery) {
        self.ctes.push(CteFrame::new(with.recursive, &with.ctes));
    }

    pub fn pop_cte_frame(&mut self) {
        self.ctes.pop();
    }

    /// Start walking the body of CTE `index` of the innermost WITH
    pub fn enter_cte_definition(&mut self, index: usize) {
        if let Some(frame) = self.ctes.last_mut() {
            frame.enter_definition(index);
        }
    }

    pub fn leave_cte_definitions(&mut self) {
        if let Some(frame) = self.ctes.last_mut() {
            frame.leave_definitions();
        }
    }

    /// Check if a FROM reference by this name would bind to a CTE
    pub fn is_cte_visible(&self, name: &str) -> bool {
        self.find_cte(name).is_some()
    }

    /// Check if the body of a CTE with this name is being walked
    pub fn is_defining_cte(&self, name: &str) -> bool {
        self.ctes.iter().any(|f| f.defining_name() == Some(name))
    }

    /// Whether the innermost WITH is `WITH RECURSIVE`
    pub fn in_recursive_with(&self) -> bool {
        self.ctes.last().is_some_and(|f| f.recursive)
    }

    fn find_cte(&self, name: &str) -> Option<(usize, usize)> {
        self.ctes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(f, frame)| frame.find(name).map(|i| (f, i)))
    }

    /// Make sure the columns of a CTE are computed
    ///
    /// The body is inferred in a fresh scope chain with only the WITH frames
    /// up to the CTE's own visible. A reference reached while the CTE is
    /// being computed sees an opaque column set.
    fn ensure_cte_columns(&mut self, frame: usize, index: usize) {
        if !matches!(self.ctes[frame].slots[index].state, CteState::Pending) {
            return;
        }
        self.ctes[frame].slots[index].state = CteState::Computing;
        let cte = self.ctes[frame].slots[index].cte;

        let inner_frames = self.ctes.split_off(frame + 1);
        let (saved_visible, saved_defining) = (self.ctes[frame].visible, self.ctes[frame].defining);
        self.ctes[frame].enter_definition(index);

        let columns = self.output_columns_in(&cte.query, None);
        let names: Vec<String> = cte.columns.iter().map(|c| c.normalized()).collect();
        let columns = if names.is_empty() {
            columns
        } else {
            columns.renamed(&names)
        };

        self.ctes[frame].visible = saved_visible;
        self.ctes[frame].defining = saved_defining;
        self.ctes.extend(inner_frames);
        log::trace!("computed columns of CTE {}", cte.name);
        self.ctes[frame].slots[index].state = CteState::Done(columns);
    }

    fn cte_columns(&mut self, frame: usize, index: usize) -> Option<&ColumnSet> {
        self.ensure_cte_columns(frame, index);
        match &self.ctes[frame].slots[index].state {
            CteState::Done(columns) => Some(columns),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Binding and projections
    // ------------------------------------------------------------------

    fn bind_source(&mut self, relation: &'a TableRef, scope: ScopeId) -> BoundSource<'a> {
        let key = relation.source_key();
        let kind = match relation {
            TableRef::Table { name, .. } => {
                let cte = if name.is_simple() {
                    self.find_cte(&name.normalized())
                } else {
                    None
                };
                match cte {
                    Some((frame, index)) => SourceKind::Cte { frame, index },
                    None => match self.catalog.table(&name.normalized()) {
                        Some(table) => SourceKind::Table(table),
                        None => SourceKind::Opaque,
                    },
                }
            }
            TableRef::Derived { query, lateral, .. } => {
                let columns = if *lateral {
                    self.output_columns_in(query, Some(scope))
                } else {
                    let cache_key = std::ptr::from_ref::<Query>(query);
                    if let Some(columns) = self.derived.get(&cache_key) {
                        columns.clone()
                    } else {
                        let parent = self.scopes[scope].parent();
                        let columns = self.output_columns_in(query, parent);
                        self.derived.insert(cache_key, columns.clone());
                        columns
                    }
                };
                SourceKind::Derived(columns)
            }
        };
        BoundSource { key, kind }
    }

    /// Output columns of a query evaluated in the current scope
    pub fn output_columns(&mut self, query: &'a Query) -> ColumnSet {
        let parent = self.current_scope_id();
        self.output_columns_in(query, parent)
    }

    /// Output columns of a query whose scope has the given parent
    ///
    /// WITH is unwrapped to its body and a composite to its first term. Star
    /// items are expanded from their sources; a star over a source with
    /// unknown columns leaves the set open.
    pub fn output_columns_in(&mut self, query: &'a Query, parent: Option<ScopeId>) -> ColumnSet {
        match query {
            Query::Select(select) => self.select_columns(select, parent),
            Query::Composite(composite) => match composite.terms.first() {
                Some(first) => self.output_columns_in(first, parent),
                None => ColumnSet::opaque(),
            },
            Query::With(with) => {
                self.push_cte_frame(with);
                let columns = self.output_columns_in(&with.body, parent);
                self.pop_cte_frame();
                columns
            }
        }
    }

    fn select_columns(&mut self, select: &'a SelectQuery, parent: Option<ScopeId>) -> ColumnSet {
        let scope = self.push_select_scope(select, parent, ScopeKind::Projection);
        self.scopes[scope].set_clause(Clause::Select);

        let mut columns = ColumnSet::new();
        for item in &select.items {
            match item {
                SelectItem::Expr { expr, alias } => {
                    let name = alias
                        .as_ref()
                        .map(|a| a.normalized())
                        .or_else(|| expr.as_column().map(|c| c.name.normalized()));
                    let ty = self.infer_type(expr);
                    columns.push(name, ty);
                }
                SelectItem::Star => {
                    for position in 0..self.scopes[scope].sources().len() {
                        self.expand_source(scope, position, &mut columns);
                    }
                }
                SelectItem::QualifiedStar(qualifier) => {
                    let position = self.scopes[scope]
                        .source(&qualifier.normalized())
                        .map(|(p, _)| p);
                    match position {
                        Some(position) => self.expand_source(scope, position, &mut columns),
                        None => columns.mark_open(),
                    }
                }
            }
        }

        self.pop_scope();
        columns
    }

    fn expand_source(&mut self, scope: ScopeId, position: usize, out: &mut ColumnSet) {
        let (frame, index) = match &self.scopes[scope].sources()[position].kind {
            SourceKind::Table(table) => {
                for column in table.columns() {
                    out.push(
                        Some(column.name.to_lowercase()),
                        Inferred::from_type(column.data_type),
                    );
                }
                return;
            }
            SourceKind::Derived(columns) => {
                append_columns(columns, out);
                return;
            }
            SourceKind::Opaque => {
                out.mark_open();
                return;
            }
            SourceKind::Cte { frame, index } => (*frame, *index),
        };
        match self.cte_columns(frame, index) {
            Some(columns) => append_columns(columns, out),
            None => out.mark_open(),
        }
    }

    /// Number of columns `*` (or `qualifier.*`) expands to in the current scope
    pub fn star_width(&mut self, qualifier: Option<&str>) -> Inferred<usize> {
        let Some(scope) = self.current_scope_id() else {
            return Inferred::Unknown;
        };
        let positions: Vec<usize> = match qualifier {
            Some(q) => match self.scopes[scope].source(q) {
                Some((position, _)) => vec![position],
                None => return Inferred::Unknown,
            },
            None => (0..self.scopes[scope].sources().len()).collect(),
        };
        let mut columns = ColumnSet::new();
        for position in positions {
            self.expand_source(scope, position, &mut columns);
        }
        columns.width()
    }

    /// Catalog tables a star item reads, for access checks
    pub fn star_tables(&self, qualifier: Option<&str>) -> Vec<&'a TableMetadata> {
        let Some(scope) = self.current_scope() else {
            return Vec::new();
        };
        scope
            .visible_sources()
            .iter()
            .filter(|s| qualifier.is_none_or(|q| s.has_key(q)))
            .filter_map(|s| match s.kind {
                SourceKind::Table(table) => Some(table),
                _ => None,
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Column resolution
    // ------------------------------------------------------------------

    fn column_in_source(&mut self, scope: ScopeId, position: usize, name: &str) -> ColumnLookup {
        let (frame, index) = match &self.scopes[scope].sources()[position].kind {
            SourceKind::Table(table) => {
                return match table.column_type(name) {
                    Some(ty) => ColumnLookup::Found(Inferred::from_type(ty)),
                    None => ColumnLookup::Missing,
                };
            }
            SourceKind::Derived(columns) => return columns.lookup(name),
            SourceKind::Opaque => return ColumnLookup::Maybe,
            SourceKind::Cte { frame, index } => (*frame, *index),
        };
        match self.cte_columns(frame, index) {
            Some(columns) => columns.lookup(name),
            None => ColumnLookup::Maybe,
        }
    }

    fn source_table(&self, scope: ScopeId, position: usize) -> Option<&'a TableMetadata> {
        match self.scopes[scope].sources()[position].kind {
            SourceKind::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Resolve a column reference without reporting
    pub fn lookup_column(&mut self, column: &ColumnRef) -> Resolution<'a> {
        let name = column.name.normalized();
        match &column.table {
            Some(qualifier) => self.lookup_qualified(&qualifier.normalized(), &name),
            None => self.lookup_unqualified(&name),
        }
    }

    fn lookup_qualified(&mut self, qualifier: &str, name: &str) -> Resolution<'a> {
        let mut next = self.current_scope_id();
        while let Some(id) = next {
            if let Some(position) = self.scopes[id].source(qualifier).map(|(p, _)| p) {
                if !self.scopes[id].is_visible(position) {
                    return Resolution::Unknown;
                }
                return match self.column_in_source(id, position, name) {
                    ColumnLookup::Found(ty) => Resolution::Found {
                        table: self.source_table(id, position),
                        ty,
                    },
                    ColumnLookup::Maybe => Resolution::Unknown,
                    ColumnLookup::Missing => Resolution::NotFound(format!(
                        "Column '{}.{}' not found",
                        qualifier, name
                    )),
                };
            }
            next = self.scopes[id].parent();
        }
        Resolution::NotFound(format!(
            "Column '{}.{}' not found: no source named '{}' is in scope",
            qualifier, name, qualifier
        ))
    }

    fn lookup_unqualified(&mut self, name: &str) -> Resolution<'a> {
        if let Some(ty) = self.output_alias_type(name) {
            return Resolution::Found { table: None, ty };
        }

        let mut next = self.current_scope_id();
        while let Some(id) = next {
            let mut found = Vec::new();
            let mut open = false;
            for position in 0..self.scopes[id].cursor() {
                match self.column_in_source(id, position, name) {
                    ColumnLookup::Found(ty) => found.push((position, ty)),
                    ColumnLookup::Maybe => open = true,
                    ColumnLookup::Missing => {}
                }
            }
            match found.as_slice() {
                [(position, ty)] => {
                    return Resolution::Found {
                        table: self.source_table(id, *position),
                        ty: *ty,
                    };
                }
                [] if open => return Resolution::Unknown,
                [] => {}
                many => {
                    let sources: Vec<String> = many
                        .iter()
                        .map(|(p, _)| {
                            self.scopes[id].sources()[*p]
                                .key
                                .clone()
                                .unwrap_or_else(|| "(subquery)".to_string())
                        })
                        .collect();
                    return Resolution::Ambiguous(format!(
                        "Column '{}' is ambiguous: it is exposed by {}",
                        name,
                        sources.join(", ")
                    ));
                }
            }
            next = self.scopes[id].parent();
        }
        Resolution::NotFound(format!("Column '{}' not found", name))
    }

    fn output_alias_type(&mut self, name: &str) -> Option<Inferred<DbType>> {
        if self.resolving_alias {
            return None;
        }
        let scope = self.current_scope()?;
        if !scope.clause().sees_output_aliases() {
            return None;
        }
        let expr = scope.output_alias(name)?;
        self.resolving_alias = true;
        let ty = self.infer_type(expr);
        self.resolving_alias = false;
        Some(ty)
    }

    /// Resolve a column reference to its type, optionally reporting
    /// `COLUMN_NOT_FOUND` or `COLUMN_AMBIGUOUS`
    pub fn resolve_column(&mut self, column: &ColumnRef, report_if_missing: bool) -> Inferred<DbType> {
        match self.lookup_column(column) {
            Resolution::Found { ty, .. } => ty,
            Resolution::Unknown => Inferred::Unknown,
            Resolution::NotFound(message) => {
                if report_if_missing {
                    let clause = self.clause_name();
                    self.push_problem(ProblemCode::ColumnNotFound, message, column.to_string(), clause);
                }
                Inferred::Unknown
            }
            Resolution::Ambiguous(message) => {
                if report_if_missing {
                    let clause = self.clause_name();
                    self.push_problem(ProblemCode::ColumnAmbiguous, message, column.to_string(), clause);
                }
                Inferred::Unknown
            }
        }
    }

    /// Catalog table a column reference reads from, if it resolves to one
    pub fn column_origin(&mut self, column: &ColumnRef) -> Option<&'a TableMetadata> {
        match self.lookup_column(column) {
            Resolution::Found { table, .. } => table,
            _ => None,
        }
    }

    /// Type of a column of a current-scope source
    pub fn source_column_type(&mut self, source_key: &str, column: &str) -> Inferred<DbType> {
        match self.source_exposes(source_key, column) {
            (Inferred::Known(true), ty) => ty,
            _ => Inferred::Unknown,
        }
    }

    /// Whether a current-scope source exposes a column, and its type
    pub fn source_exposes(&mut self, source_key: &str, column: &str) -> (Inferred<bool>, Inferred<DbType>) {
        let Some(scope) = self.current_scope_id() else {
            return (Inferred::Unknown, Inferred::Unknown);
        };
        let Some(position) = self.scopes[scope].source(source_key).map(|(p, _)| p) else {
            return (Inferred::Unknown, Inferred::Unknown);
        };
        match self.column_in_source(scope, position, &column.to_lowercase()) {
            ColumnLookup::Found(ty) => (Inferred::Known(true), ty),
            ColumnLookup::Maybe => (Inferred::Unknown, Inferred::Unknown),
            ColumnLookup::Missing => (Inferred::Known(false), Inferred::Unknown),
        }
    }

    /// Visible current-scope sources exposing a column, other than `excluding_key`
    pub fn sources_with_column(&mut self, column: &str, excluding_key: Option<&str>) -> ColumnMatches {
        let Some(scope) = self.current_scope_id() else {
            return ColumnMatches::default();
        };
        let positions = (0..self.scopes[scope].cursor())
            .filter(|&p| excluding_key.is_none() || self.scopes[scope].sources()[p].key.as_deref() != excluding_key)
            .collect::<Vec<_>>();
        self.matches_at(scope, positions, column)
    }

    /// Position of a join's relation among the current scope's sources; the
    /// FROM relation is at 0, join `k` at `k + 1`
    pub fn join_relation_position(&self, join: &Join) -> Option<usize> {
        self.current_scope()?
            .joins()
            .iter()
            .position(|j| std::ptr::eq(j, join))
            .map(|k| k + 1)
    }

    /// Sources on the left of `join` exposing a column: the FROM relation and
    /// every earlier join
    pub fn left_sources_with_column(&mut self, join: &Join, column: &str) -> ColumnMatches {
        let (Some(scope), Some(end)) = (self.current_scope_id(), self.join_relation_position(join)) else {
            return ColumnMatches {
                sources: Vec::new(),
                open: true,
            };
        };
        self.matches_at(scope, (0..end).collect(), column)
    }

    /// Whether the relation of `join` exposes a column, and its type
    pub fn join_relation_exposes(&mut self, join: &Join, column: &str) -> (Inferred<bool>, Inferred<DbType>) {
        let (Some(scope), Some(position)) = (self.current_scope_id(), self.join_relation_position(join)) else {
            return (Inferred::Unknown, Inferred::Unknown);
        };
        match self.column_in_source(scope, position, &column.to_lowercase()) {
            ColumnLookup::Found(ty) => (Inferred::Known(true), ty),
            ColumnLookup::Maybe => (Inferred::Unknown, Inferred::Unknown),
            ColumnLookup::Missing => (Inferred::Known(false), Inferred::Unknown),
        }
    }

    fn matches_at(&mut self, scope: ScopeId, positions: Vec<usize>, column: &str) -> ColumnMatches {
        let mut matches = ColumnMatches::default();
        let column = column.to_lowercase();
        for position in positions {
            let key = self.scopes[scope].sources()[position].key.clone();
            match self.column_in_source(scope, position, &column) {
                ColumnLookup::Found(ty) => matches.sources.push((key, ty)),
                ColumnLookup::Maybe => matches.open = true,
                ColumnLookup::Missing => {}
            }
        }
        matches
    }

    /// Number of visible current-scope sources that definitely expose a column
    pub fn count_strict_sources_with_column(&mut self, column: &str, excluding_key: Option<&str>) -> usize {
        self.sources_with_column(column, excluding_key).sources.len()
    }
}

fn append_columns(columns: &ColumnSet, out: &mut ColumnSet) {
    for (name, ty) in columns.entries() {
        out.push(name.clone(), *ty);
    }
    if columns.is_open() {
        out.mark_open();
    }
}
