//! Core type definitions for dispatch resolution.

use crate::hierarchy::ClassId;

use super::result::DefinitionError;

/// A tuple of classes, one per dispatch position.
pub type DispatchKey = Vec<ClassId>;

/// A value whose runtime class drives dispatch.
///
/// # Example
///
/// ```
/// use gendispatch::{ClassId, Instance};
///
/// struct Move {
///     class: ClassId,
/// }
///
/// impl Instance for Move {
///     fn class_id(&self) -> ClassId {
///         self.class
///     }
/// }
/// ```
pub trait Instance {
    /// The runtime class of this value.
    fn class_id(&self) -> ClassId;
}

impl<T: Instance + ?Sized> Instance for &T {
    fn class_id(&self) -> ClassId {
        (**self).class_id()
    }
}

impl<T: Instance + ?Sized> Instance for Box<T> {
    fn class_id(&self) -> ClassId {
        (**self).class_id()
    }
}

/// The parameter list of a generic function and its dispatch positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// The generic function's name.
    name: String,
    /// All parameter names, in call order.
    params: Vec<String>,
    /// Indices into `params` that select the implementation.
    dispatch: Vec<usize>,
}

impl Signature {
    /// Create a signature with the given parameters.
    ///
    /// Dispatch positions are chosen with [`Signature::dispatch_on`].
    pub fn new<I, S>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            dispatch: Vec::new(),
        }
    }

    /// Select the dispatch arguments by parameter name.
    ///
    /// Every name must be a parameter of the signature and may appear only
    /// once. Mistakes are reported here rather than at call time.
    pub fn dispatch_on<I, S>(mut self, names: I) -> Result<Self, DefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        if names.is_empty() {
            return Err(DefinitionError::NoDispatchArgs {
                function: self.name,
            });
        }

        let mut positions = Vec::with_capacity(names.len());
        let mut unknown = Vec::new();
        for name in &names {
            match self.params.iter().position(|p| p == name) {
                Some(position) => positions.push((name, position)),
                None => unknown.push(name.clone()),
            }
        }
        if !unknown.is_empty() {
            return Err(DefinitionError::UnknownDispatchArgs {
                function: self.name,
                names: unknown,
            });
        }

        let mut dispatch = Vec::with_capacity(positions.len());
        for (name, position) in positions {
            if dispatch.contains(&position) {
                return Err(DefinitionError::DuplicateDispatchArg {
                    function: self.name,
                    name: name.clone(),
                });
            }
            dispatch.push(position);
        }

        self.dispatch = dispatch;
        Ok(self)
    }

    /// The generic function's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All parameter names.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Positions of the dispatch arguments within the parameter list.
    pub fn dispatch_positions(&self) -> &[usize] {
        &self.dispatch
    }

    /// Names of the dispatch arguments, in dispatch order.
    pub fn dispatch_names(&self) -> impl Iterator<Item = &str> {
        self.dispatch.iter().map(|&i| self.params[i].as_str())
    }

    /// Number of dispatch arguments.
    pub fn arity(&self) -> usize {
        self.dispatch.len()
    }
}
