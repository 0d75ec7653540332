//! Multiple dispatch resolution.
//!
//! A generic function keeps a registry from class tuples to implementations.
//! A call looks up the runtime classes of its dispatch arguments and selects
//! the registered tuple that comes first in the cross product of the
//! per-argument precedence lists. Virtual ancestors are consulted after the
//! true bases, and independent virtual ancestors that both carry
//! registrations make the call fail rather than pick one.
//!
//! # Module Structure
//!
//! - [`types`] - Core type definitions (Instance, Signature, DispatchKey)
//! - [`result`] - Resolution outcome and errors
//! - [`resolver`] - Main dispatch resolution algorithm
//! - [`generic`] - Generic functions and the call context

mod generic;
mod resolver;
mod result;
mod types;


pub use types::{DispatchKey, Instance, Signature};

pub use result::{DefinitionError, DispatchError, Resolved};

pub use resolver::{CrossProduct, DispatchResolver};

pub use generic::{Call, GenericFunction, Implementation};
