//! Name scopes for SQL semantic analysis
//!
//! Every SELECT introduces a scope that binds its FROM sources under their
//! source keys. Scopes are kept on a stack owned by the validation context and
//! refer to their parent by index; a derived table's scope skips the enclosing
//! SELECT, so the parent is not always the previous entry.

use indexmap::IndexMap;
use sqlvet_ast::{Cte, Expr, Join, SelectItem, SelectQuery, WindowDef};
use sqlvet_catalog::TableMetadata;
use sqlvet_types::{DbType, Inferred};
use std::fmt;

/// Index of a scope on the context's scope stack
pub type ScopeId = usize;

/// Kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// A SELECT block being walked
    Select,
    /// ORDER BY / LIMIT / OFFSET of a set operation
    SetOrder,
    /// Temporary scope used to infer a projection
    Projection,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "select"),
            Self::SetOrder => write!(f, "set-order"),
            Self::Projection => write!(f, "projection"),
        }
    }
}

/// Clause of a SELECT currently being walked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    From,
    Select,
    Where,
    GroupBy,
    Having,
    Window,
    OrderBy,
    Limit,
}

impl Clause {
    /// Clause name used in diagnostic clause paths
    pub fn name(&self) -> &'static str {
        match self {
            Self::From => "from",
            Self::Select => "select",
            Self::Where => "where",
            Self::GroupBy => "group_by",
            Self::Having => "having",
            Self::Window => "window",
            Self::OrderBy => "order_by",
            Self::Limit => "limit",
        }
    }

    /// Output aliases are visible to unqualified references in these clauses
    pub fn sees_output_aliases(&self) -> bool {
        matches!(self, Self::GroupBy | Self::OrderBy)
    }
}

/// Output columns of a derived table, CTE or set operation
///
/// An open set may expose columns beyond the listed ones (it expanded a star
/// over a source whose columns are not known).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    columns: Vec<(Option<String>, Inferred<DbType>)>,
    open: bool,
}

/// Outcome of looking a column up in a [`ColumnSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLookup {
    Found(Inferred<DbType>),
    /// Not listed, but the set is open
    Maybe,
    Missing,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set about which nothing is known
    pub fn opaque() -> Self {
        Self {
            columns: Vec::new(),
            open: true,
        }
    }

    pub fn push(&mut self, name: Option<String>, ty: Inferred<DbType>) {
        self.columns.push((name, ty));
    }

    pub fn mark_open(&mut self) {
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Find a column by case-folded name; the first match wins
    pub fn lookup(&self, name: &str) -> ColumnLookup {
        match self
            .columns
            .iter()
            .find(|(n, _)| n.as_deref() == Some(name))
        {
            Some((_, ty)) => ColumnLookup::Found(*ty),
            None if self.open => ColumnLookup::Maybe,
            None => ColumnLookup::Missing,
        }
    }

    /// Number of columns, when the set is closed
    pub fn width(&self) -> Inferred<usize> {
        if self.open {
            Inferred::Unknown
        } else {
            Inferred::Known(self.columns.len())
        }
    }

    /// Column types in order, when the set is closed
    pub fn types(&self) -> Inferred<Vec<Inferred<DbType>>> {
        if self.open {
            Inferred::Unknown
        } else {
            Inferred::Known(self.columns.iter().map(|(_, ty)| *ty).collect())
        }
    }

    /// All columns in order, unnamed ones included
    pub fn entries(&self) -> &[(Option<String>, Inferred<DbType>)] {
        &self.columns
    }

    /// Named columns in order
    pub fn named(&self) -> impl Iterator<Item = (&str, Inferred<DbType>)> {
        self.columns
            .iter()
            .filter_map(|(n, ty)| n.as_deref().map(|n| (n, *ty)))
    }

    /// Replace column names positionally, as a CTE column list does
    pub fn renamed(mut self, names: &[String]) -> Self {
        for (slot, name) in self.columns.iter_mut().zip(names) {
            slot.0 = Some(name.clone());
        }
        self
    }
}

/// What a bound source refers to
#[derive(Debug, Clone)]
pub enum SourceKind<'a> {
    /// A catalog table
    Table(&'a TableMetadata),
    /// A CTE slot of a WITH frame; its columns are computed on first use
    Cte { frame: usize, index: usize },
    /// A subquery in FROM, with columns computed at bind time
    Derived(ColumnSet),
    /// An unresolvable table; any column may exist
    Opaque,
}

/// A FROM source bound in a scope
#[derive(Debug, Clone)]
pub struct BoundSource<'a> {
    /// Normalized source key; absent for an unaliased derived table
    pub key: Option<String>,
    pub kind: SourceKind<'a>,
}

impl BoundSource<'_> {
    pub fn has_key(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }
}

/// A name scope
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    depth: usize,
    sources: Vec<BoundSource<'a>>,
    /// Number of leading sources visible to expressions (the join cursor)
    visible: usize,
    clause: Clause,
    output_aliases: IndexMap<String, &'a Expr>,
    select: Option<&'a SelectQuery>,
}

impl<'a> Scope<'a> {
    pub fn new(kind: ScopeKind, parent: Option<ScopeId>, depth: usize) -> Self {
        Self {
            kind,
            parent,
            depth,
            sources: Vec::new(),
            visible: 0,
            clause: Clause::From,
            output_aliases: IndexMap::new(),
            select: None,
        }
    }

    /// Create a scope for a SELECT; its output aliases are defined up front
    pub fn for_select(
        kind: ScopeKind,
        parent: Option<ScopeId>,
        depth: usize,
        select: &'a SelectQuery,
    ) -> Self {
        let mut scope = Self::new(kind, parent, depth);
        scope.select = Some(select);
        for item in &select.items {
            if let SelectItem::Expr {
                expr,
                alias: Some(alias),
            } = item
            {
                scope.output_aliases.entry(alias.normalized()).or_insert(expr);
            }
        }
        scope
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn clause(&self) -> Clause {
        self.clause
    }

    pub fn set_clause(&mut self, clause: Clause) {
        self.clause = clause;
    }

    /// Bind the next FROM source; it becomes visible immediately
    pub fn bind(&mut self, source: BoundSource<'a>) {
        self.sources.push(source);
        self.visible = self.sources.len();
    }

    /// Limit visibility to the first `count` sources
    pub fn set_cursor(&mut self, count: usize) {
        self.visible = count.min(self.sources.len());
    }

    /// Make every bound source visible
    pub fn reveal_all(&mut self) {
        self.visible = self.sources.len();
    }

    pub fn cursor(&self) -> usize {
        self.visible
    }

    /// All bound sources, hidden ones included
    pub fn sources(&self) -> &[BoundSource<'a>] {
        &self.sources
    }

    /// Sources the join cursor currently exposes
    pub fn visible_sources(&self) -> &[BoundSource<'a>] {
        &self.sources[..self.visible]
    }

    /// Find a bound source by key, with its position
    pub fn source(&self, key: &str) -> Option<(usize, &BoundSource<'a>)> {
        self.sources.iter().enumerate().find(|(_, s)| s.has_key(key))
    }

    pub fn is_visible(&self, position: usize) -> bool {
        position < self.visible
    }

    pub fn output_alias(&self, name: &str) -> Option<&'a Expr> {
        self.output_aliases.get(name).copied()
    }

    /// The SELECT this scope was created for
    pub fn select(&self) -> Option<&'a SelectQuery> {
        self.select
    }

    /// Named windows of the SELECT owning this scope
    pub fn windows(&self) -> &'a [WindowDef] {
        self.select.map(|s| s.windows.as_slice()).unwrap_or(&[])
    }

    /// Joins of the SELECT owning this scope
    pub fn joins(&self) -> &'a [Join] {
        self.select.map(SelectQuery::joins).unwrap_or(&[])
    }
}

/// Progress of a CTE's column computation
#[derive(Debug, Clone)]
pub enum CteState {
    Pending,
    /// Being computed; a reference now is a self reference
    Computing,
    Done(ColumnSet),
}

/// A CTE declared by an enclosing WITH
#[derive(Debug, Clone)]
pub struct CteSlot<'a> {
    pub name: String,
    pub cte: &'a Cte,
    pub state: CteState,
}

/// CTEs declared by one WITH clause
#[derive(Debug, Clone)]
pub struct CteFrame<'a> {
    pub recursive: bool,
    pub slots: Vec<CteSlot<'a>>,
    /// Number of leading slots visible to FROM references
    pub visible: usize,
    /// Slot whose body is being walked
    pub defining: Option<usize>,
}

impl<'a> CteFrame<'a> {
    pub fn new(recursive: bool, ctes: &'a [Cte]) -> Self {
        let slots: Vec<_> = ctes
            .iter()
            .map(|cte| CteSlot {
                name: cte.name.normalized(),
                cte,
                state: CteState::Pending,
            })
            .collect();
        Self {
            recursive,
            visible: slots.len(),
            slots,
            defining: None,
        }
    }

    /// Enter the body of slot `index`: non-recursive bodies see earlier siblings only
    pub fn enter_definition(&mut self, index: usize) {
        self.defining = Some(index);
        self.visible = if self.recursive {
            self.slots.len()
        } else {
            index
        };
    }

    /// Leave CTE bodies: the WITH body sees every slot
    pub fn leave_definitions(&mut self) {
        self.defining = None;
        self.visible = self.slots.len();
    }

    /// Find a visible CTE by case-folded name; the first declaration wins
    pub fn find(&self, name: &str) -> Option<usize> {
        self.slots[..self.visible]
            .iter()
            .position(|slot| slot.name == name)
    }

    /// Name of the CTE whose body is being walked
    pub fn defining_name(&self) -> Option<&str> {
        self.defining
            .and_then(|i| self.slots.get(i))
            .map(|slot| slot.name.as_str())
    }
}
