//! Three-valued inference results

/// Result of type or shape inference
///
/// `Unknown` means the information could not be determined. It is never a
/// violation: checks that need a value skip themselves on `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Inferred<T> {
    Known(T),
    #[default]
    Unknown,
}

impl<T> Inferred<T> {
    /// Check if the value is known
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Convert to an `Option`
    pub fn known(self) -> Option<T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Unknown => None,
        }
    }

    /// Borrow the known value
    pub fn as_ref(&self) -> Inferred<&T> {
        match self {
            Self::Known(v) => Inferred::Known(v),
            Self::Unknown => Inferred::Unknown,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Inferred<U> {
        match self {
            Self::Known(v) => Inferred::Known(f(v)),
            Self::Unknown => Inferred::Unknown,
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Inferred<U>) -> Inferred<U> {
        match self {
            Self::Known(v) => f(v),
            Self::Unknown => Inferred::Unknown,
        }
    }

    /// Use `other` when this value is unknown
    pub fn or_else(self, other: impl FnOnce() -> Inferred<T>) -> Inferred<T> {
        match self {
            Self::Known(_) => self,
            Self::Unknown => other(),
        }
    }

    /// Pair two results; known only if both are
    pub fn zip<U>(self, other: Inferred<U>) -> Inferred<(T, U)> {
        match (self, other) {
            (Self::Known(a), Inferred::Known(b)) => Inferred::Known((a, b)),
            _ => Inferred::Unknown,
        }
    }
}

impl Inferred<crate::DbType> {
    /// Lift a type tag: `DbType::Unknown` becomes `Inferred::Unknown`
    pub fn from_type(ty: crate::DbType) -> Self {
        if ty.is_known() {
            Self::Known(ty)
        } else {
            Self::Unknown
        }
    }
}

impl<T> From<Option<T>> for Inferred<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Known(v),
            None => Self::Unknown,
        }
    }
}

/// Whether two inferred types may be compared; unknown on either side passes
pub fn comparable(a: Inferred<crate::DbType>, b: Inferred<crate::DbType>) -> bool {
    match a.zip(b) {
        Inferred::Known((a, b)) => crate::DbType::comparable(a, b),
        Inferred::Unknown => true,
    }
}
