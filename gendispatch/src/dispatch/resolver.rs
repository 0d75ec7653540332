//! Main dispatch resolution algorithm.
//!
//! Resolution works on the runtime classes found at the dispatch positions:
//!
//! 1. **Fast path**: an exact registration for the class tuple wins.
//! 2. **Virtual ancestors**: per position, collect the registered classes the
//!    runtime class is a subclass of without them being in its declared
//!    precedence list. More specific ones absorb less specific ones; two
//!    independent survivors make the call ambiguous.
//! 3. **Precedence lists**: the declared MRO, or the MRO extended with the
//!    single virtual ancestor (placed after the true bases). `object` is
//!    never consulted.
//! 4. **Walk**: iterate the cross product of the lists, first position
//!    outermost and last innermost; the first registered tuple wins.
//!
//! [`DispatchResolver::dispatch_order`] exposes the exact walk of step 4.

use indexmap::IndexMap;
use tracing::trace;

use crate::hierarchy::{ClassHierarchy, ClassId};

use super::result::DispatchError;
use super::types::DispatchKey;

/// Dispatch resolution context over one registry.
pub struct DispatchResolver<'h, 'a, V> {
    hierarchy: &'h ClassHierarchy,
    function: &'a str,
    arity: usize,
    typemap: &'a IndexMap<DispatchKey, V>,
}

impl<'h, 'a, V> DispatchResolver<'h, 'a, V> {
    /// Create a resolver for `function`, which dispatches on `arity` arguments.
    pub fn new(
        hierarchy: &'h ClassHierarchy,
        function: &'a str,
        arity: usize,
        typemap: &'a IndexMap<DispatchKey, V>,
    ) -> Self {
        Self {
            hierarchy,
            function,
            arity,
            typemap,
        }
    }

    /// Find the registered entry a call with these runtime classes selects.
    ///
    /// Returns `Ok(None)` when no registered key is reachable.
    pub fn resolve(&self, types: &[ClassId]) -> Result<Option<(&'a DispatchKey, &'a V)>, DispatchError> {
        self.check(types)?;

        if let Some(entry) = self.typemap.get_key_value(types) {
            trace!(function = self.function, key = ?self.names(types), "exact match");
            return Ok(Some(entry));
        }

        let lists = self.precedence_lists(types)?;
        // The first candidate is the exact tuple, already tried above.
        for candidate in CrossProduct::new(lists).skip(1) {
            trace!(function = self.function, candidate = ?self.names(&candidate), "trying");
            if let Some(entry) = self.typemap.get_key_value(&candidate) {
                return Ok(Some(entry));
            }
        }

        trace!(function = self.function, types = ?self.names(types), "no registered key reachable");
        Ok(None)
    }

    /// The ordered candidate keys the walk visits for these runtime classes.
    pub fn dispatch_order(&self, types: &[ClassId]) -> Result<Vec<DispatchKey>, DispatchError> {
        self.check(types)?;
        Ok(CrossProduct::new(self.precedence_lists(types)?).collect())
    }

    /// Per-position precedence lists, virtual ancestors included.
    pub fn precedence_lists(&self, types: &[ClassId]) -> Result<Vec<Vec<ClassId>>, DispatchError> {
        let vancestors = self.virtual_ancestors(types)?;

        types
            .iter()
            .zip(vancestors)
            .map(|(&class, vas)| {
                let mut mro = match vas.as_slice() {
                    [] => self.hierarchy.mro(class)?.to_vec(),
                    [va] => self.hierarchy.virtual_mro(class, *va)?,
                    _ => {
                        return Err(DispatchError::Ambiguous {
                            function: self.function.to_string(),
                            class: self.hierarchy.name(class).to_string(),
                            candidates: self.names(&vas),
                        })
                    }
                };
                mro.retain(|&c| c != ClassId::OBJECT);
                Ok(mro)
            })
            .collect()
    }

    /// Per-position virtual ancestors that carry registrations.
    ///
    /// Each list is an antichain: no entry is a subclass of another.
    pub fn virtual_ancestors(&self, types: &[ClassId]) -> Result<Vec<Vec<ClassId>>, DispatchError> {
        self.check(types)?;

        let mut collected = vec![Vec::new(); types.len()];
        for key in self.typemap.keys() {
            for ((&class, &candidate), found) in types.iter().zip(key).zip(collected.iter_mut()) {
                if self.hierarchy.is_subclass(class, candidate)
                    && !self.hierarchy.is_true_ancestor(class, candidate)
                {
                    self.absorb(candidate, found);
                }
            }
        }
        Ok(collected)
    }

    fn absorb(&self, candidate: ClassId, found: &mut Vec<ClassId>) {
        if found.iter().any(|&v| self.hierarchy.is_subclass(v, candidate)) {
            return;
        }
        found.retain(|&v| !self.hierarchy.is_subclass(candidate, v));
        found.push(candidate);
    }

    fn check(&self, types: &[ClassId]) -> Result<(), DispatchError> {
        if types.len() != self.arity {
            return Err(DispatchError::TypeCount {
                function: self.function.to_string(),
                expected: self.arity,
                found: types.len(),
            });
        }
        for &class in types {
            self.hierarchy.get(class)?;
        }
        Ok(())
    }

    fn names(&self, classes: &[ClassId]) -> Vec<String> {
        classes
            .iter()
            .map(|&c| self.hierarchy.name(c).to_string())
            .collect()
    }
}

/// Lexicographic cross product of precedence lists.
///
/// The first list varies slowest, the last fastest.
#[derive(Debug, Clone)]
pub struct CrossProduct {
    lists: Vec<Vec<ClassId>>,
    indices: Vec<usize>,
    done: bool,
}

impl CrossProduct {
    /// Iterate over every tuple drawn from `lists`.
    pub fn new(lists: Vec<Vec<ClassId>>) -> Self {
        let done = lists.is_empty() || lists.iter().any(Vec::is_empty);
        let indices = vec![0; lists.len()];
        Self {
            lists,
            indices,
            done,
        }
    }
}

impl Iterator for CrossProduct {
    type Item = DispatchKey;

    fn next(&mut self) -> Option<DispatchKey> {
        if self.done {
            return None;
        }

        let item = self
            .lists
            .iter()
            .zip(&self.indices)
            .map(|(list, &i)| list[i])
            .collect();

        let mut pos = self.lists.len();
        loop {
            if pos == 0 {
                self.done = true;
                break;
            }
            pos -= 1;
            self.indices[pos] += 1;
            if self.indices[pos] < self.lists[pos].len() {
                break;
            }
            self.indices[pos] = 0;
        }

        Some(item)
    }
}
