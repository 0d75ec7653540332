//! Generic functions: a signature, a registry and a default body.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::hierarchy::{ClassHierarchy, ClassId};

use super::resolver::DispatchResolver;
use super::result::{DefinitionError, DispatchError, Resolved};
use super::types::{DispatchKey, Instance, Signature};

/// A registered implementation body.
pub type Implementation<A, R> =
    Arc<dyn Fn(&Call<'_, A, R>) -> Result<R, DispatchError> + Send + Sync>;

/// A function whose implementation is selected by the runtime classes of
/// its dispatch arguments.
///
/// # Example
///
/// ```
/// use gendispatch::{ClassHierarchy, ClassId, GenericFunction, Instance, Signature};
///
/// struct Obj(ClassId);
/// impl Instance for Obj {
///     fn class_id(&self) -> ClassId {
///         self.0
///     }
/// }
///
/// let mut classes = ClassHierarchy::new();
/// let float = classes.define("float", &[]).unwrap();
///
/// let signature = Signature::new("describe", ["obj"]).dispatch_on(["obj"]).unwrap();
/// let mut describe = GenericFunction::<Obj, String>::new(signature);
/// describe
///     .register(&classes, &[float], |_| Ok("a float".to_string()))
///     .unwrap();
///
/// assert_eq!(describe.call(&classes, &[Obj(float)]).unwrap(), "a float");
/// ```
pub struct GenericFunction<A, R> {
    signature: Signature,
    typemap: IndexMap<DispatchKey, Implementation<A, R>>,
    default: Implementation<A, R>,
}

impl<A: Instance + 'static, R: 'static> GenericFunction<A, R> {
    /// Create a generic function whose default raises not-implemented.
    pub fn new(signature: Signature) -> Self {
        Self {
            signature,
            typemap: IndexMap::new(),
            default: Arc::new(|call: &Call<'_, A, R>| -> Result<R, DispatchError> {
                Err(call.not_implemented())
            }),
        }
    }

    /// Replace the body run when no registered key matches.
    pub fn with_default<F>(mut self, default: F) -> Self
    where
        F: Fn(&Call<'_, A, R>) -> Result<R, DispatchError> + Send + Sync + 'static,
    {
        self.default = Arc::new(default);
        self
    }

    /// The function's name.
    pub fn name(&self) -> &str {
        self.signature.name()
    }

    /// The function's signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Attach `implementation` to the class tuple `types`.
    ///
    /// Re-registering a tuple replaces the previous implementation.
    pub fn register<F>(
        &mut self,
        hierarchy: &ClassHierarchy,
        types: &[ClassId],
        implementation: F,
    ) -> Result<(), DefinitionError>
    where
        F: Fn(&Call<'_, A, R>) -> Result<R, DispatchError> + Send + Sync + 'static,
    {
        if types.len() != self.signature.arity() {
            return Err(DefinitionError::ArityMismatch {
                function: self.name().to_string(),
                expected: self.signature.arity(),
                found: types.len(),
            });
        }
        for &class in types {
            hierarchy.get(class)?;
        }
        if types.contains(&ClassId::OBJECT) {
            return Err(DefinitionError::RootRegistration {
                function: self.name().to_string(),
            });
        }

        let key = types.to_vec();
        let names = names_of(hierarchy, &key);
        if self.typemap.insert(key, Arc::new(implementation)).is_some() {
            debug!(function = self.name(), key = ?names, "replaced implementation");
        } else {
            debug!(function = self.name(), key = ?names, "registered implementation");
        }
        Ok(())
    }

    /// Register by class names.
    pub fn register_named<F>(
        &mut self,
        hierarchy: &ClassHierarchy,
        types: &[&str],
        implementation: F,
    ) -> Result<(), DefinitionError>
    where
        F: Fn(&Call<'_, A, R>) -> Result<R, DispatchError> + Send + Sync + 'static,
    {
        let types = types
            .iter()
            .map(|name| hierarchy.resolve_name(name))
            .collect::<Result<Vec<_>, _>>()?;
        self.register(hierarchy, &types, implementation)
    }

    /// Whether `types` has a registration of its own.
    pub fn is_registered(&self, types: &[ClassId]) -> bool {
        self.typemap.contains_key(types)
    }

    /// Registered keys, in registration order.
    pub fn registered_keys(&self) -> impl Iterator<Item = &DispatchKey> {
        self.typemap.keys()
    }

    /// Call the function.
    pub fn call(&self, hierarchy: &ClassHierarchy, args: &[A]) -> Result<R, DispatchError> {
        let params = self.signature.params().len();
        if args.len() != params {
            return Err(DispatchError::ArgumentCount {
                function: self.name().to_string(),
                expected: params,
                found: args.len(),
            });
        }

        let types = self.dispatch_types(args);
        let resolved = self.resolve(hierarchy, &types)?;
        let call = Call {
            function: self,
            hierarchy,
            args,
            types,
        };
        (resolved.implementation())(&call)
    }

    /// Which implementation a call with these runtime classes would run.
    pub fn resolve<'s>(
        &'s self,
        hierarchy: &ClassHierarchy,
        types: &[ClassId],
    ) -> Result<Resolved<'s, A, R>, DispatchError> {
        let resolved = self.resolver(hierarchy).resolve(types)?;
        Ok(match resolved {
            Some((key, implementation)) => Resolved::Registered { key, implementation },
            None => Resolved::Default(&self.default),
        })
    }

    /// The candidate keys dispatch walks for these runtime classes.
    pub fn dispatch_order(
        &self,
        hierarchy: &ClassHierarchy,
        types: &[ClassId],
    ) -> Result<Vec<DispatchKey>, DispatchError> {
        self.resolver(hierarchy).dispatch_order(types)
    }

    /// [`dispatch_order`](Self::dispatch_order), rendered as class names.
    pub fn dispatch_info(
        &self,
        hierarchy: &ClassHierarchy,
        types: &[ClassId],
    ) -> Result<Vec<Vec<String>>, DispatchError> {
        Ok(self
            .dispatch_order(hierarchy, types)?
            .iter()
            .map(|key| names_of(hierarchy, key))
            .collect())
    }

    fn resolver<'h, 's>(
        &'s self,
        hierarchy: &'h ClassHierarchy,
    ) -> DispatchResolver<'h, 's, Implementation<A, R>> {
        DispatchResolver::new(hierarchy, self.name(), self.signature.arity(), &self.typemap)
    }

    fn dispatch_types(&self, args: &[A]) -> Vec<ClassId> {
        self.signature
            .dispatch_positions()
            .iter()
            .map(|&i| args[i].class_id())
            .collect()
    }
}

impl<A, R> fmt::Debug for GenericFunction<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericFunction")
            .field("signature", &self.signature)
            .field("keys", &self.typemap.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// The context an implementation body runs in.
pub struct Call<'a, A, R> {
    function: &'a GenericFunction<A, R>,
    hierarchy: &'a ClassHierarchy,
    args: &'a [A],
    types: Vec<ClassId>,
}

impl<'a, A: Instance + 'static, R: 'static> Call<'a, A, R> {
    /// All call arguments.
    pub fn args(&self) -> &'a [A] {
        self.args
    }

    /// The argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&'a A> {
        self.args.get(index)
    }

    /// Runtime classes at the dispatch positions.
    pub fn dispatch_types(&self) -> &[ClassId] {
        &self.types
    }

    /// The hierarchy the call resolves against.
    pub fn hierarchy(&self) -> &'a ClassHierarchy {
        self.hierarchy
    }

    /// The generic function being called.
    pub fn function(&self) -> &'a GenericFunction<A, R> {
        self.function
    }

    /// Call the same generic function again with other arguments.
    pub fn recurse(&self, args: &[A]) -> Result<R, DispatchError> {
        self.function.call(self.hierarchy, args)
    }

    /// The not-implemented error for this call.
    pub fn not_implemented(&self) -> DispatchError {
        DispatchError::NotImplemented {
            function: self.function.name().to_string(),
            types: names_of(self.hierarchy, &self.types),
        }
    }
}

fn names_of(hierarchy: &ClassHierarchy, classes: &[ClassId]) -> Vec<String> {
    classes.iter().map(|&c| hierarchy.name(c).to_string()).collect()
}
