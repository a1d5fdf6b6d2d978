use thiserror::Error;

use crate::shape::Shape;

/// Errors triggered while resolving a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectError {
    /// No binding is registered and the type has no self-binding (e.g. a trait object)
    #[error("No binding for '{key}' and the type cannot be constructed on its own")]
    Unbound { key: String },

    /// None of the declared constructors can be satisfied
    #[error("No constructor of '{type_name}' with at most {limit} arguments can be satisfied")]
    NotConstructible {
        type_name: &'static str,
        limit: usize,
    },

    /// The request re-entered a binding that is still being resolved
    #[error("Cyclic dependencies: {path}")]
    CyclicResolution { path: String },

    /// The scope produced something that cannot be adapted to the requested shape
    #[error("Cannot provide '{type_name}' as {requested}: the scope produced {produced}")]
    ShapeMismatch {
        type_name: &'static str,
        requested: Shape,
        produced: &'static str,
    },

    /// The scope yielded an empty handle (e.g. a session that is not active)
    #[error("Empty handle for '{type_name}'")]
    Empty { type_name: &'static str },

    /// The provider refused to allocate a new instance
    #[error("Allocation of '{type_name}' ({size} bytes) failed")]
    Allocation { type_name: &'static str, size: usize },
}

/// Signal returned by a [Provider](crate::Provider) that refuses an allocation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("allocation refused")]
pub struct AllocError;
