//! Window definitions and frames

use crate::{Expr, Identifier, OrderItem};
use serde::{Deserialize, Serialize};

/// `WINDOW name AS (spec)` entry of a SELECT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowDef {
    pub name: Identifier,
    pub spec: WindowSpec,
}

impl WindowDef {
    pub fn new(name: impl Into<Identifier>, spec: WindowSpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

/// Window specification, used both in the WINDOW clause and inline in OVER
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Base window this specification extends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partition_by: Vec<Expr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<WindowFrame>,
}

impl WindowSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend a named base window
    pub fn base(mut self, name: impl Into<Identifier>) -> Self {
        self.base = Some(name.into());
        self
    }

    pub fn partition_by(mut self, exprs: Vec<Expr>) -> Self {
        self.partition_by = exprs;
        self
    }

    pub fn order_by(mut self, items: Vec<OrderItem>) -> Self {
        self.order_by = items;
        self
    }

    pub fn frame(mut self, frame: WindowFrame) -> Self {
        self.frame = Some(frame);
        self
    }
}

/// Frame unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameUnits {
    Rows,
    Range,
    Groups,
}

impl FrameUnits {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Rows => "ROWS",
            Self::Range => "RANGE",
            Self::Groups => "GROUPS",
        }
    }
}

/// Window frame clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowFrame {
    pub units: FrameUnits,
    pub start: FrameBound,
    /// End bound of `BETWEEN start AND end`; absent for the single-bound form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<FrameBound>,
}

impl WindowFrame {
    /// `units BETWEEN start AND end`
    pub fn between(units: FrameUnits, start: FrameBound, end: FrameBound) -> Self {
        Self {
            units,
            start,
            end: Some(end),
        }
    }

    /// `units start`
    pub fn starting(units: FrameUnits, start: FrameBound) -> Self {
        Self {
            units,
            start,
            end: None,
        }
    }

    /// Iterate over the bounds in order
    pub fn bounds(&self) -> impl Iterator<Item = &FrameBound> {
        std::iter::once(&self.start).chain(self.end.as_ref())
    }
}

/// One end of a window frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(Box<Expr>),
    CurrentRow,
    Following(Box<Expr>),
    UnboundedFollowing,
}

impl FrameBound {
    /// `offset PRECEDING`
    pub fn preceding(offset: Expr) -> Self {
        Self::Preceding(Box::new(offset))
    }

    /// `offset FOLLOWING`
    pub fn following(offset: Expr) -> Self {
        Self::Following(Box::new(offset))
    }

    /// Position in the order `UNBOUNDED PRECEDING < PRECEDING < CURRENT ROW <
    /// FOLLOWING < UNBOUNDED FOLLOWING`
    pub fn rank(&self) -> u8 {
        match self {
            Self::UnboundedPreceding => 0,
            Self::Preceding(_) => 1,
            Self::CurrentRow => 2,
            Self::Following(_) => 3,
            Self::UnboundedFollowing => 4,
        }
    }

    /// Offset expression of `n PRECEDING` / `n FOLLOWING`
    pub fn offset(&self) -> Option<&Expr> {
        match self {
            Self::Preceding(e) | Self::Following(e) => Some(&**e),
            _ => None,
        }
    }
}
