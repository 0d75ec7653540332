//! Generic functions with multiple dispatch.
//!
//! A generic function selects its implementation from the runtime classes of
//! one or more named arguments. Classes live in an explicit
//! [`ClassHierarchy`] with C3 precedence lists and late-bound virtual
//! ancestors.
//!
//! # Example
//!
//! ```
//! use gendispatch::{ClassHierarchy, ClassId, GenericFunction, Instance, Signature};
//!
//! #[derive(Clone)]
//! struct Move {
//!     class: ClassId,
//!     ordinal: u8,
//! }
//!
//! impl Instance for Move {
//!     fn class_id(&self) -> ClassId {
//!         self.class
//!     }
//! }
//!
//! let mut classes = ClassHierarchy::new();
//! let rock = classes.define("Rock", &[]).unwrap();
//! let paper = classes.define("Paper", &[]).unwrap();
//!
//! let signature = Signature::new("win", ["a", "b"]).dispatch_on(["a", "b"]).unwrap();
//! let mut win = GenericFunction::<Move, i32>::new(signature).with_default(|call| {
//!     let (a, b) = (&call.args()[0], &call.args()[1]);
//!     if a.ordinal == b.ordinal {
//!         Ok(0)
//!     } else if a.ordinal > b.ordinal {
//!         Ok(-call.recurse(&[b.clone(), a.clone()])?)
//!     } else {
//!         Err(call.not_implemented())
//!     }
//! });
//! win.register(&classes, &[rock, paper], |_| Ok(-1)).unwrap();
//!
//! let r = Move { class: rock, ordinal: 0 };
//! let p = Move { class: paper, ordinal: 1 };
//! assert_eq!(win.call(&classes, &[p, r]).unwrap(), 1);
//! ```

pub mod dispatch;
pub mod hierarchy;
pub mod mro;

pub use dispatch::{
    Call, DefinitionError, DispatchError, DispatchKey, GenericFunction, Implementation, Instance,
    Resolved, Signature,
};
pub use hierarchy::{Class, ClassHierarchy, ClassId, HierarchyError};
pub use mro::MroError;
