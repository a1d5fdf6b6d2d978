//! Scope policies
//!
//! A scope decides whether a request is served by a fresh instance or by one it already holds.
//! Each binding keeps one [Scope::State] per injector, created on the first resolution.
//!
//! | scope         | state                 | serves                                             |
//! |---------------|-----------------------|----------------------------------------------------|
//! | [Unique]      | none                  | a fresh instance on every request                  |
//! | [Singleton]   | cached `Arc`          | one instance, also seen by injectors composed from this one |
//! | [Shared]      | cached `Arc`          | one instance per injector                          |
//! | [External]    | the supplied value    | the value, or the result of the supplied function  |
//! | [Session]     | active flag, `Arc`    | like [Shared] between enter and exit, empty otherwise |
//! | [Exposed]     | cached `Arc`          | the binding of another injector                    |
//! | [Deduce]      | cached `Arc`          | unique, singleton or external depending on the requested shape |

use std::any::Any;

use crate::error::InjectError;
use crate::inject::Context;
use crate::shape::Shape;
use crate::wrapper::Wrapped;

mod deduce;
mod exposed;
pub(crate) mod external;
mod session;
mod shared;
mod singleton;
mod unique;

pub use deduce::Deduce;
pub use exposed::Exposed;
pub use external::{External, ExternalValue, Func, SharedValue, StaticRef, Value, WithInjector};
pub use session::{session, Session, SessionEntry, SessionExit};
pub use shared::Shared;
pub use singleton::Singleton;
pub use unique::Unique;

/// Lifetime policy of a binding for the expected type `E`, constructing the given type `G`
pub trait Scope<E: ?Sized, G: ?Sized>: Clone + Send + Sync + 'static {
    /// Per-injector state of the scope
    type State: Send + Sync + 'static;

    /// Whether an injector composed from another one shares this scope's state
    const INHERITED: bool = false;

    fn state(&self) -> Self::State;

    fn create(
        &self,
        state: &Self::State,
        shape: Shape,
        cx: &mut Context<'_>,
    ) -> Result<Wrapped<E>, InjectError>;

    fn resolvable(&self, shape: Shape, cx: &mut Context<'_>) -> bool;

    /// React to an action broadcast with [Injector::call](crate::Injector::call)
    fn call(&self, _state: &Self::State, _action: &dyn Any) {}
}

/// Error for a shape the scope cannot serve
pub(crate) fn unsupported<E: ?Sized>(shape: Shape, produced: &'static str) -> InjectError {
    InjectError::ShapeMismatch {
        type_name: std::any::type_name::<E>(),
        requested: shape,
        produced,
    }
}
