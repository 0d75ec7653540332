//! Dispatch result types and errors.

use thiserror::Error;

use crate::hierarchy::HierarchyError;

use super::generic::Implementation;
use super::types::DispatchKey;

/// Which implementation a call would run.
pub enum Resolved<'a, A, R> {
    /// A registered implementation, found under `key`.
    Registered {
        /// The registered key that matched.
        key: &'a DispatchKey,
        /// The implementation stored under `key`.
        implementation: &'a Implementation<A, R>,
    },
    /// No registered key matched; the default implementation runs.
    Default(&'a Implementation<A, R>),
}

impl<A, R> Resolved<'_, A, R> {
    /// The matched key, if a registered implementation was found.
    pub fn key(&self) -> Option<&DispatchKey> {
        match self {
            Resolved::Registered { key, .. } => Some(key),
            Resolved::Default(_) => None,
        }
    }

    /// The implementation to run.
    pub fn implementation(&self) -> &Implementation<A, R> {
        match self {
            Resolved::Registered { implementation, .. } => implementation,
            Resolved::Default(implementation) => implementation,
        }
    }
}

impl<A, R> std::fmt::Debug for Resolved<'_, A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolved::Registered { key, .. } => f.debug_tuple("Registered").field(key).finish(),
            Resolved::Default(_) => f.write_str("Default"),
        }
    }
}

/// Mistakes made while defining a generic function or registering on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("no dispatch arguments passed to `{function}`")]
    NoDispatchArgs { function: String },

    #[error("unknown dispatch arguments ({}) for `{function}`", .names.join(", "))]
    UnknownDispatchArgs { function: String, names: Vec<String> },

    #[error("dispatch argument `{name}` listed twice for `{function}`")]
    DuplicateDispatchArg { function: String, name: String },

    #[error("`{function}` dispatches on {expected} arguments, got {found} types")]
    ArityMismatch {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("cannot register `{function}` on `object`; install a default implementation instead")]
    RootRegistration { function: String },

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

/// Failures surfaced by a generic function call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No registered key is reachable and the default does not apply.
    #[error("`{function}` is not implemented for ({})", .types.join(", "))]
    NotImplemented { function: String, types: Vec<String> },

    /// Independent virtual ancestors with registrations tie.
    #[error("ambiguous dispatch in `{function}` for `{class}`: {}", .candidates.join(" or "))]
    Ambiguous {
        function: String,
        class: String,
        candidates: Vec<String>,
    },

    #[error("`{function}` takes {expected} arguments, got {found}")]
    ArgumentCount {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("`{function}` dispatches on {expected} types, got {found}")]
    TypeCount {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    /// Raised by an implementation body.
    #[error("{0}")]
    Failed(String),
}

impl DispatchError {
    /// Whether this is the not-implemented condition.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, DispatchError::NotImplemented { .. })
    }

    /// Whether this is the ambiguity condition.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, DispatchError::Ambiguous { .. })
    }
}
