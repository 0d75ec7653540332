//! Class hierarchy with declared and virtual inheritance.
//!
//! A [`ClassHierarchy`] is an arena of classes. Every class has an ordered
//! list of declared bases and a precedence list computed once, at definition
//! time, with C3. On top of the declared graph, any class may later be
//! registered as a *virtual ancestor* of another class: it then counts for
//! [`ClassHierarchy::is_subclass`] without appearing in the precedence list.
//!
//! # Architecture
//!
//! ```text
//! ClassHierarchy
//! ├── classes: Vec<Class>          (indexed by ClassId)
//! │   ├── name
//! │   ├── bases                    (declared, ordered)
//! │   ├── mro                      (C3, self first, `object` last)
//! │   ├── subclasses               (declared direct subclasses)
//! │   └── virtual_subclasses       (registered after the fact)
//! └── names: FxHashMap<String, ClassId>
//! ```

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::debug;

use crate::mro::{c3_merge, compute_c3_mro, Mro, MroError};

/// Stable identifier of a class inside one [`ClassHierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    /// The implicit root every class inherits from.
    pub const OBJECT: ClassId = ClassId(0);

    /// Create a class id from its raw index.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw index of this id.
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised while building or querying a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("unknown class id {0}")]
    UnknownClassId(ClassId),

    #[error("unknown class `{0}`")]
    UnknownClass(String),

    #[error("class `{0}` is already defined")]
    DuplicateClass(String),

    #[error("duplicate base class `{base}` in definition of `{class}`")]
    DuplicateBase { class: String, base: String },

    #[error("cannot create a consistent method resolution order for `{class}` (bases {})", .bases.join(", "))]
    InconsistentMro { class: String, bases: Vec<String> },

    #[error("refusing to create an inheritance cycle: `{ancestor}` is already a subclass of `{subclass}`")]
    InheritanceCycle { ancestor: String, subclass: String },
}

/// A class known to a hierarchy.
#[derive(Debug, Clone)]
pub struct Class {
    name: String,
    bases: Vec<ClassId>,
    mro: Mro,
    subclasses: Vec<ClassId>,
    virtual_subclasses: Vec<ClassId>,
}

impl Class {
    /// The class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared bases, in declaration order.
    pub fn bases(&self) -> &[ClassId] {
        &self.bases
    }

    /// The C3 precedence list, starting with the class itself.
    pub fn mro(&self) -> &[ClassId] {
        &self.mro
    }

    /// Classes that declared this class as a direct base.
    pub fn subclasses(&self) -> &[ClassId] {
        &self.subclasses
    }

    /// Classes registered as virtual subclasses of this class.
    pub fn virtual_subclasses(&self) -> &[ClassId] {
        &self.virtual_subclasses
    }
}

/// Arena of classes with declared and virtual inheritance.
#[derive(Debug, Clone)]
pub struct ClassHierarchy {
    classes: Vec<Class>,
    names: FxHashMap<String, ClassId>,
}

impl Default for ClassHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassHierarchy {
    /// Name of the implicit root class.
    pub const OBJECT_NAME: &'static str = "object";

    /// Create a hierarchy containing only the root class `object`.
    pub fn new() -> Self {
        let object = Class {
            name: Self::OBJECT_NAME.to_string(),
            bases: Vec::new(),
            mro: vec![ClassId::OBJECT],
            subclasses: Vec::new(),
            virtual_subclasses: Vec::new(),
        };
        let mut names = FxHashMap::default();
        names.insert(Self::OBJECT_NAME.to_string(), ClassId::OBJECT);

        Self {
            classes: vec![object],
            names,
        }
    }

    /// Define a new class deriving from `bases`.
    ///
    /// An empty base list means the class derives directly from `object`.
    pub fn define_class(
        &mut self,
        name: impl Into<String>,
        bases: &[ClassId],
    ) -> Result<ClassId, HierarchyError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(HierarchyError::DuplicateClass(name));
        }
        for &base in bases {
            self.get(base)?;
        }

        let bases = if bases.is_empty() {
            vec![ClassId::OBJECT]
        } else {
            bases.to_vec()
        };

        let id = ClassId(self.classes.len() as u32);
        let classes = &self.classes;
        let mro = compute_c3_mro(id, &bases, |base| {
            classes.get(base.index()).map(|class| class.mro.as_slice())
        })
        .map_err(|err| self.mro_error(&name, &bases, err))?;

        for &base in &bases {
            self.classes[base.index()].subclasses.push(id);
        }

        debug!(class = %name, id = %id, "defined class");

        self.names.insert(name.clone(), id);
        self.classes.push(Class {
            name,
            bases,
            mro,
            subclasses: Vec::new(),
            virtual_subclasses: Vec::new(),
        });

        Ok(id)
    }

    /// Define a new class, naming its bases.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        bases: &[&str],
    ) -> Result<ClassId, HierarchyError> {
        let bases = bases
            .iter()
            .map(|base| self.resolve_name(base))
            .collect::<Result<Vec<_>, _>>()?;
        self.define_class(name, &bases)
    }

    /// Register `ancestor` as a virtual ancestor of `subclass`.
    ///
    /// Registering a class that already is a subclass is a no-op. Registering
    /// an ancestor that is itself a subclass of `subclass` would close a cycle
    /// and is refused.
    pub fn register_virtual(
        &mut self,
        ancestor: ClassId,
        subclass: ClassId,
    ) -> Result<(), HierarchyError> {
        self.get(ancestor)?;
        self.get(subclass)?;

        if self.is_subclass(subclass, ancestor) {
            return Ok(());
        }
        if self.is_subclass(ancestor, subclass) {
            return Err(HierarchyError::InheritanceCycle {
                ancestor: self.name(ancestor).to_string(),
                subclass: self.name(subclass).to_string(),
            });
        }

        debug!(
            ancestor = self.name(ancestor),
            subclass = self.name(subclass),
            "registered virtual ancestor"
        );
        self.classes[ancestor.index()].virtual_subclasses.push(subclass);
        Ok(())
    }

    /// Look up a class id by name.
    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.names.get(name).copied()
    }

    /// Look up a class id by name, failing for unknown names.
    pub fn resolve_name(&self, name: &str) -> Result<ClassId, HierarchyError> {
        self.lookup(name)
            .ok_or_else(|| HierarchyError::UnknownClass(name.to_string()))
    }

    /// Get a class by id.
    pub fn get(&self, id: ClassId) -> Result<&Class, HierarchyError> {
        self.classes
            .get(id.index())
            .ok_or(HierarchyError::UnknownClassId(id))
    }

    /// Whether `id` belongs to this hierarchy.
    pub fn contains(&self, id: ClassId) -> bool {
        id.index() < self.classes.len()
    }

    /// The name of a class, or `<unknown>` for foreign ids.
    pub fn name(&self, id: ClassId) -> &str {
        self.classes
            .get(id.index())
            .map(|class| class.name.as_str())
            .unwrap_or("<unknown>")
    }

    /// The C3 precedence list of a class.
    pub fn mro(&self, id: ClassId) -> Result<&[ClassId], HierarchyError> {
        self.get(id).map(Class::mro)
    }

    /// Whether `ancestor` is in the declared precedence list of `class`.
    pub fn is_true_ancestor(&self, class: ClassId, ancestor: ClassId) -> bool {
        self.classes
            .get(class.index())
            .is_some_and(|c| c.mro.contains(&ancestor))
    }

    /// Whether `sub` is a subclass of `sup`, counting virtual registrations.
    ///
    /// `sub` is a subclass of `sup` when `sup` is a true ancestor, or when
    /// `sub` is a subclass of one of the virtual or declared subclasses of
    /// `sup`. Each class below `sup` is visited at most once.
    pub fn is_subclass(&self, sub: ClassId, sup: ClassId) -> bool {
        let mut seen = FxHashSet::default();
        let mut stack = vec![sup];
        while let Some(candidate) = stack.pop() {
            if !seen.insert(candidate) {
                continue;
            }
            if self.is_true_ancestor(sub, candidate) {
                return true;
            }
            if let Some(class) = self.classes.get(candidate.index()) {
                stack.extend(class.virtual_subclasses.iter().chain(&class.subclasses));
            }
        }
        false
    }

    /// Precedence list of `class` extended with one virtual ancestor.
    ///
    /// This is the C3 linearization of a synthetic class deriving from
    /// `(class, ancestor)`, without the synthetic class itself, so the
    /// virtual ancestor lands after the true bases it does not precede.
    pub fn virtual_mro(&self, class: ClassId, ancestor: ClassId) -> Result<Mro, HierarchyError> {
        let sequences = [
            self.mro(class)?.to_vec(),
            self.mro(ancestor)?.to_vec(),
            vec![class, ancestor],
        ];
        c3_merge(&sequences).map_err(|err| {
            let name = format!("{}+{}", self.name(class), self.name(ancestor));
            self.mro_error(&name, &[class, ancestor], err)
        })
    }

    /// Number of classes, including `object`.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// A hierarchy always contains `object`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over all classes with their ids, in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &Class)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, class)| (ClassId(i as u32), class))
    }

    fn mro_error(&self, class: &str, bases: &[ClassId], err: MroError) -> HierarchyError {
        match err {
            MroError::UnknownBase(base) => HierarchyError::UnknownClassId(base),
            MroError::DuplicateBase(base) => HierarchyError::DuplicateBase {
                class: class.to_string(),
                base: self.name(base).to_string(),
            },
            MroError::Inconsistent { .. } => HierarchyError::InconsistentMro {
                class: class.to_string(),
                bases: bases.iter().map(|&b| self.name(b).to_string()).collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_is_root() {
        let h = ClassHierarchy::new();
        assert_eq!(h.lookup("object"), Some(ClassId::OBJECT));
        assert_eq!(h.mro(ClassId::OBJECT).unwrap(), &[ClassId::OBJECT]);
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn test_define_single_inheritance() {
        let mut h = ClassHierarchy::new();
        let rock = h.define("Rock", &[]).unwrap();
        let strong = h.define("StrongRock", &["Rock"]).unwrap();

        assert_eq!(h.mro(strong).unwrap(), &[strong, rock, ClassId::OBJECT]);
        assert_eq!(h.get(rock).unwrap().subclasses(), &[strong]);
        assert!(h.is_subclass(strong, rock));
        assert!(!h.is_subclass(rock, strong));
    }

    #[test]
    fn test_define_multiple_inheritance() {
        let mut h = ClassHierarchy::new();
        let sized = h.define("Sized", &[]).unwrap();
        let s = h.define("S", &[]).unwrap();
        let v = h.define("V", &["Sized", "S"]).unwrap();

        assert_eq!(h.mro(v).unwrap(), &[v, sized, s, ClassId::OBJECT]);
    }

    #[test]
    fn test_duplicate_class_rejected() {
        let mut h = ClassHierarchy::new();
        h.define("A", &[]).unwrap();
        assert_eq!(
            h.define("A", &[]).unwrap_err(),
            HierarchyError::DuplicateClass("A".into())
        );
    }

    #[test]
    fn test_unknown_base_rejected() {
        let mut h = ClassHierarchy::new();
        assert_eq!(
            h.define("A", &["Missing"]).unwrap_err(),
            HierarchyError::UnknownClass("Missing".into())
        );
        assert_eq!(
            h.define_class("B", &[ClassId::from_raw(42)]).unwrap_err(),
            HierarchyError::UnknownClassId(ClassId::from_raw(42))
        );
    }

    #[test]
    fn test_duplicate_base_rejected() {
        let mut h = ClassHierarchy::new();
        h.define("A", &[]).unwrap();
        let err = h.define("B", &["A", "A"]).unwrap_err();
        assert!(matches!(err, HierarchyError::DuplicateBase { .. }));
        assert!(h.lookup("B").is_none());
    }

    #[test]
    fn test_inconsistent_mro_rejected() {
        let mut h = ClassHierarchy::new();
        h.define("A", &[]).unwrap();
        h.define("B", &[]).unwrap();
        h.define("X", &["A", "B"]).unwrap();
        h.define("Y", &["B", "A"]).unwrap();
        let err = h.define("Z", &["X", "Y"]).unwrap_err();
        assert_eq!(
            err,
            HierarchyError::InconsistentMro {
                class: "Z".into(),
                bases: vec!["X".into(), "Y".into()],
            }
        );
        // A failed definition leaves no trace.
        assert!(h.get(h.lookup("X").unwrap()).unwrap().subclasses().is_empty());
    }

    #[test]
    fn test_virtual_registration() {
        let mut h = ClassHierarchy::new();
        let sized = h.define("Sized", &[]).unwrap();
        let with_len = h.define("WithLength", &[]).unwrap();

        assert!(!h.is_subclass(with_len, sized));
        h.register_virtual(sized, with_len).unwrap();
        assert!(h.is_subclass(with_len, sized));
        assert!(!h.is_true_ancestor(with_len, sized));
    }

    #[test]
    fn test_virtual_registration_is_transitive_through_subclasses() {
        let mut h = ClassHierarchy::new();
        let sized = h.define("Sized", &[]).unwrap();
        let set = h.define("Set", &["Sized"]).unwrap();
        let some_set = h.define("SomeSet", &[]).unwrap();
        let child = h.define("Child", &["SomeSet"]).unwrap();

        h.register_virtual(set, some_set).unwrap();
        assert!(h.is_subclass(some_set, set));
        assert!(h.is_subclass(some_set, sized));
        assert!(h.is_subclass(child, set));
    }

    #[test]
    fn test_virtual_registration_of_existing_subclass_is_noop() {
        let mut h = ClassHierarchy::new();
        let a = h.define("A", &[]).unwrap();
        let b = h.define("B", &["A"]).unwrap();

        h.register_virtual(a, b).unwrap();
        assert!(h.get(a).unwrap().virtual_subclasses().is_empty());
    }

    #[test]
    fn test_virtual_registration_refuses_cycle() {
        let mut h = ClassHierarchy::new();
        let a = h.define("A", &[]).unwrap();
        let b = h.define("B", &["A"]).unwrap();
        let c = h.define("C", &[]).unwrap();

        assert!(matches!(
            h.register_virtual(b, a),
            Err(HierarchyError::InheritanceCycle { .. })
        ));
        h.register_virtual(c, b).unwrap();
        assert!(matches!(
            h.register_virtual(b, c),
            Err(HierarchyError::InheritanceCycle { .. })
        ));
        assert!(matches!(
            h.register_virtual(a, ClassId::OBJECT),
            Err(HierarchyError::InheritanceCycle { .. })
        ));
    }

    #[test]
    fn test_virtual_mro_places_ancestor_after_bases() {
        let mut h = ClassHierarchy::new();
        let sized = h.define("Sized", &[]).unwrap();
        let s = h.define("S", &[]).unwrap();
        let container = h.define("Container", &[]).unwrap();
        let v = h.define("V", &["Sized", "S"]).unwrap();

        let mro = h.virtual_mro(v, container).unwrap();
        assert_eq!(mro, vec![v, sized, s, container, ClassId::OBJECT]);
    }

    #[test]
    fn test_virtual_mro_respects_ancestor_precedence() {
        let mut h = ClassHierarchy::new();
        let sized = h.define("Sized", &[]).unwrap();
        let iterable = h.define("Iterable", &[]).unwrap();
        let set = h.define("Set", &["Sized", "Iterable"]).unwrap();
        let some_set = h.define("SomeSet", &["Sized"]).unwrap();

        let mro = h.virtual_mro(some_set, set).unwrap();
        assert_eq!(mro, vec![some_set, set, sized, iterable, ClassId::OBJECT]);
    }

    #[test]
    fn test_is_subclass_on_deep_diamond_chain() {
        let mut h = ClassHierarchy::new();
        let root = h.define("R", &[]).unwrap();
        let mut bottom = "R".to_string();
        for i in 0..40 {
            let (left, right, join) = (format!("B{i}"), format!("C{i}"), format!("D{i}"));
            h.define(left.as_str(), &[bottom.as_str()]).unwrap();
            h.define(right.as_str(), &[bottom.as_str()]).unwrap();
            h.define(join.as_str(), &[left.as_str(), right.as_str()]).unwrap();
            bottom = join;
        }
        let bottom = h.lookup(&bottom).unwrap();
        let unrelated = h.define("Unrelated", &[]).unwrap();

        assert!(h.is_subclass(bottom, root));
        assert!(!h.is_subclass(unrelated, root));
        assert!(!h.is_subclass(root, bottom));

        let leaf = h.define("Leaf", &[]).unwrap();
        h.register_virtual(bottom, leaf).unwrap();
        assert!(h.is_subclass(leaf, root));
    }

    #[test]
    fn test_iter_in_definition_order() {
        let mut h = ClassHierarchy::new();
        h.define("A", &[]).unwrap();
        h.define("B", &[]).unwrap();
        let names: Vec<_> = h.iter().map(|(_, c)| c.name()).collect();
        assert_eq!(names, vec!["object", "A", "B"]);
    }
}
