//! Window rules: WINDOW clause definitions, references, inheritance and
//! frames

use super::is_negative_literal;
use crate::context::ValidationContext;
use crate::registry::Rule;
use crate::shape::check_scalar_operand;
use indexmap::{IndexMap, IndexSet};
use sqlvet_ast::{
    Expr, FrameBound, FrameUnits, Node, NodeKind, OverClause, WindowDef, WindowFrame as Frame,
    WindowSpec,
};
use sqlvet_diagnostics::ProblemCode;
use sqlvet_types::{DbType, Inferred};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Windows of a WINDOW clause that sit on an inheritance cycle, in
/// declaration order
///
/// Edges run from a window to the base it extends. A back edge to a window
/// still on the DFS stack closes a cycle; every window on it is collected
/// once.
fn cycle_members(windows: &[WindowDef]) -> IndexSet<String> {
    let mut index: IndexMap<String, usize> = IndexMap::new();
    for (i, window) in windows.iter().enumerate() {
        index.entry(window.name.normalized()).or_insert(i);
    }
    let base_of = |i: usize| -> Option<usize> {
        let base = windows[i].spec.base.as_ref()?;
        index.get(&base.normalized()).copied()
    };

    let mut colors = vec![Color::White; windows.len()];
    let mut members = IndexSet::new();
    for root in index.values().copied() {
        if colors[root] != Color::White {
            continue;
        }
        // Inheritance is a chain: each window has at most one base
        let mut stack = Vec::new();
        let mut current = Some(root);
        while let Some(i) = current {
            match colors[i] {
                Color::White => {
                    colors[i] = Color::Gray;
                    stack.push(i);
                    current = base_of(i);
                }
                Color::Gray => {
                    let start = stack.iter().position(|&s| s == i).unwrap_or(0);
                    for &member in &stack[start..] {
                        members.insert(windows[member].name.normalized());
                    }
                    current = None;
                }
                Color::Black => current = None,
            }
        }
        for i in stack {
            colors[i] = Color::Black;
        }
    }

    let mut ordered = IndexSet::new();
    for window in windows {
        let name = window.name.normalized();
        if members.contains(&name) {
            ordered.insert(name);
        }
    }
    ordered
}

/// WINDOW names are unique and inheritance between them is acyclic
pub struct WindowDefinition;

impl Rule for WindowDefinition {
    fn name(&self) -> &'static str {
        "window-definition"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Select]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::Select(select) = node else {
            return;
        };
        let mut seen = IndexSet::new();
        for window in &select.windows {
            if !seen.insert(window.name.normalized()) {
                ctx.add_problem(
                    ProblemCode::WindowDuplicateName,
                    format!("Window '{}' is defined more than once", window.name),
                    Node::WindowDef(window),
                    "window",
                );
            }
        }

        for name in cycle_members(&select.windows) {
            if let Some(window) = select.windows.iter().find(|w| w.name.normalized() == name) {
                ctx.add_problem(
                    ProblemCode::WindowInheritanceCycle,
                    format!("Window '{}' is part of an inheritance cycle", window.name),
                    Node::WindowDef(window),
                    "window",
                );
            }
        }
    }
}

/// OVER clauses and base windows must name a window of the WINDOW clause
pub struct WindowReference;

impl Rule for WindowReference {
    fn name(&self) -> &'static str {
        "window-reference"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Function, NodeKind::WindowSpec]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let name = match node {
            Node::Expr(Expr::Function(call)) => match &call.over {
                Some(OverClause::Named(name)) => name,
                _ => return,
            },
            Node::WindowSpec(spec) => match &spec.base {
                Some(base) => base,
                None => return,
            },
            _ => return,
        };
        if ctx.window(&name.normalized()).is_none() {
            let path = ctx.clause_path("window");
            ctx.add_problem(
                ProblemCode::WindowNotFound,
                format!("Window '{}' is not defined", name),
                node,
                &path,
            );
        }
    }
}

/// A window that extends a base may not override its partitioning or
/// ordering, and the base may not have a frame
pub struct WindowInheritance;

impl Rule for WindowInheritance {
    fn name(&self) -> &'static str {
        "window-inheritance"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::WindowSpec]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::WindowSpec(spec) = node else {
            return;
        };
        let Some(base_name) = &spec.base else {
            return;
        };
        let Some(base) = ctx.window(&base_name.normalized()) else {
            return;
        };
        let path = ctx.clause_path("window");
        let report = |ctx: &mut ValidationContext<'a>, message: String| {
            ctx.add_problem(ProblemCode::WindowInheritanceInvalid, message, node, &path);
        };
        if !spec.partition_by.is_empty() {
            report(ctx, format!("Cannot override PARTITION BY of window '{}'", base_name));
        }
        if !spec.order_by.is_empty() && !base.spec.order_by.is_empty() {
            report(ctx, format!("Cannot override ORDER BY of window '{}'", base_name));
        }
        if base.spec.frame.is_some() {
            report(
                ctx,
                format!("Cannot extend window '{}' because it has a frame clause", base_name),
            );
        }
    }
}

/// Frame bounds must be ordered, with valid offsets for the frame unit
pub struct WindowFrame;

impl WindowFrame {
    /// Number of ORDER BY items of a spec, inherited through base windows;
    /// `None` when the base chain is cyclic
    fn effective_order_by<'a>(ctx: &ValidationContext<'a>, spec: &'a WindowSpec) -> Option<usize> {
        let mut visited = IndexSet::new();
        let mut current = spec;
        loop {
            if !current.order_by.is_empty() {
                return Some(current.order_by.len());
            }
            let Some(base) = &current.base else {
                return Some(0);
            };
            let name = base.normalized();
            if !visited.insert(name.clone()) {
                return None;
            }
            current = &ctx.window(&name)?.spec;
        }
    }

    fn check_offset<'a>(
        ctx: &mut ValidationContext<'a>,
        units: FrameUnits,
        offset: &'a Expr,
        node: Node<'_>,
        path: &str,
    ) {
        if !check_scalar_operand(ctx, offset, path) {
            return;
        }
        if is_negative_literal(offset) {
            ctx.add_problem(
                ProblemCode::WindowFrameInvalid,
                format!("Frame offset {} must not be negative", offset),
                node,
                path,
            );
            return;
        }
        let Inferred::Known(ty) = ctx.infer_type(offset) else {
            return;
        };
        let valid = match units {
            FrameUnits::Rows => ty.is_numeric(),
            FrameUnits::Range => ty.is_numeric() || ty == DbType::Interval,
            FrameUnits::Groups => ty.is_integer(),
        };
        if !valid {
            let expected = match units {
                FrameUnits::Rows => "a numeric",
                FrameUnits::Range => "a numeric or interval",
                FrameUnits::Groups => "an integer",
            };
            ctx.add_problem(
                ProblemCode::WindowFrameInvalid,
                format!("{} frame offset must be {} value, found {}", units.keyword(), expected, ty),
                node,
                path,
            );
        }
    }

    fn check_bounds(ctx: &mut ValidationContext<'_>, frame: &Frame, node: Node<'_>, path: &str) {
        let end = frame.end.as_ref().unwrap_or(&FrameBound::CurrentRow);
        let message = if frame.start == FrameBound::UnboundedFollowing {
            Some("Frame start cannot be UNBOUNDED FOLLOWING".to_string())
        } else if *end == FrameBound::UnboundedPreceding {
            Some("Frame end cannot be UNBOUNDED PRECEDING".to_string())
        } else if frame.start.rank() > end.rank() {
            Some(format!("Frame starting at {} cannot end at {}", frame.start, end))
        } else {
            None
        };
        if let Some(message) = message {
            ctx.add_problem(ProblemCode::WindowFrameInvalid, message, node, path);
        }
    }
}

impl Rule for WindowFrame {
    fn name(&self) -> &'static str {
        "window-frame"
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::WindowSpec]
    }

    fn check<'a>(&self, node: Node<'a>, ctx: &mut ValidationContext<'a>) {
        let Node::WindowSpec(spec) = node else {
            return;
        };
        let Some(frame) = &spec.frame else {
            return;
        };
        let path = ctx.clause_path("window_frame");

        for offset in frame.bounds().filter_map(FrameBound::offset) {
            Self::check_offset(ctx, frame.units, offset, node, &path);
        }
        Self::check_bounds(ctx, frame, node, &path);

        let has_offset = frame.bounds().any(|b| b.offset().is_some());
        if frame.units == FrameUnits::Range && has_offset {
            match Self::effective_order_by(ctx, spec) {
                Some(1) | None => {}
                Some(count) => ctx.add_problem(
                    ProblemCode::WindowFrameInvalid,
                    format!(
                        "RANGE with an offset requires exactly one ORDER BY column, found {}",
                        count
                    ),
                    node,
                    &path,
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn def(name: &str, base: Option<&str>) -> WindowDef {
        let spec = match base {
            Some(b) => WindowSpec::new().base(b),
            None => WindowSpec::new(),
        };
        WindowDef::new(name, spec)
    }

    #[test]
    fn test_cycle_members_each_once() {
        let windows = vec![
            def("a", Some("b")),
            def("b", Some("c")),
            def("c", Some("a")),
            def("d", Some("a")),
            def("e", None),
        ];
        let members: Vec<_> = cycle_members(&windows).into_iter().collect();
        assert_eq!(members, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_self_cycle_and_chain() {
        let windows = vec![def("w", Some("w")), def("x", Some("y")), def("y", None)];
        let members: Vec<_> = cycle_members(&windows).into_iter().collect();
        assert_eq!(members, vec!["w"]);
    }

    #[test]
    fn test_missing_base_is_not_a_cycle() {
        let windows = vec![def("a", Some("zzz"))];
        assert!(cycle_members(&windows).is_empty());
    }
}
