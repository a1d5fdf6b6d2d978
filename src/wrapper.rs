//! Universal wrapper
//!
//! Scopes hand back a [Wrapped] value and each [Request](crate::Request) shape adapts it.
//! The adaptation is selected by the static shape of the destination only.

use std::any::type_name;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

use crate::error::InjectError;
use crate::shape::Shape;

/// Result of a scope's `create`, before adaptation to the requested shape
pub enum Wrapped<E: ?Sized + 'static> {
    /// A fresh instance owned by the receiver
    Owned(Box<E>),
    /// An instance shared with the scope (or with other receivers)
    Shared(Arc<E>),
    /// An externally owned object
    Static(&'static E),
    /// No instance available (e.g. inactive session)
    Empty,
}

impl<E: ?Sized + 'static> Wrapped<E> {
    pub fn describe(&self) -> &'static str {
        match self {
            Wrapped::Owned(_) => "an owned instance",
            Wrapped::Shared(_) => "a shared instance",
            Wrapped::Static(_) => "a static reference",
            Wrapped::Empty => "an empty handle",
        }
    }

    fn mismatch(&self, requested: Shape) -> InjectError {
        match self {
            Wrapped::Empty => InjectError::Empty {
                type_name: type_name::<E>(),
            },
            _ => InjectError::ShapeMismatch {
                type_name: type_name::<E>(),
                requested,
                produced: self.describe(),
            },
        }
    }

    /// Owning pointer: ownership of a fresh instance moves to the receiver
    pub fn into_boxed(self) -> Result<Box<E>, InjectError> {
        match self {
            Wrapped::Owned(boxed) => Ok(boxed),
            other => Err(other.mismatch(Shape::Boxed)),
        }
    }

    /// Shared handle: a fresh instance is moved into shared ownership
    pub fn into_shared(self) -> Result<Arc<E>, InjectError> {
        match self {
            Wrapped::Shared(shared) => Ok(shared),
            Wrapped::Owned(boxed) => Ok(Arc::from(boxed)),
            other => Err(other.mismatch(Shape::Shared)),
        }
    }

    /// Weak handle, only to instances someone else keeps alive
    pub fn into_weak(self) -> Result<Weak<E>, InjectError> {
        match self {
            Wrapped::Shared(shared) => Ok(Arc::downgrade(&shared)),
            other => Err(other.mismatch(Shape::Weak)),
        }
    }

    /// Immutable reference; owned instances are moved to auxiliary shared storage
    pub fn into_ref(self) -> Result<Ref<E>, InjectError> {
        match self {
            Wrapped::Shared(shared) => Ok(Ref(Holder::Shared(shared))),
            Wrapped::Owned(boxed) => Ok(Ref(Holder::Shared(Arc::from(boxed)))),
            Wrapped::Static(object) => Ok(Ref(Holder::Static(object))),
            other => Err(other.mismatch(Shape::Ref)),
        }
    }

    pub fn into_static(self) -> Result<&'static E, InjectError> {
        match self {
            Wrapped::Static(object) => Ok(object),
            other => Err(other.mismatch(Shape::Static)),
        }
    }
}

impl<E: 'static> Wrapped<E> {
    /// Plain value: the pointee is moved out and its allocation released
    pub fn into_value(self) -> Result<E, InjectError> {
        match self {
            Wrapped::Owned(boxed) => Ok(*boxed),
            other => Err(other.mismatch(Shape::Value)),
        }
    }
}

/// Immutable reference whose referent outlives the expression that created it.
///
/// Fresh instances are kept in auxiliary shared storage owned by the reference itself,
/// shared instances are retained, static objects are borrowed.
pub struct Ref<T: ?Sized + 'static>(Holder<T>);

enum Holder<T: ?Sized + 'static> {
    Shared(Arc<T>),
    Static(&'static T),
}

impl<T: ?Sized> Ref<T> {
    /// The shared storage backing this reference, if any
    pub fn shared(&self) -> Option<&Arc<T>> {
        match &self.0 {
            Holder::Shared(shared) => Some(shared),
            Holder::Static(_) => None,
        }
    }
}

impl<T: ?Sized> Deref for Ref<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.0 {
            Holder::Shared(shared) => shared,
            Holder::Static(object) => object,
        }
    }
}

impl<T: ?Sized> Clone for Ref<T> {
    fn clone(&self) -> Self {
        match &self.0 {
            Holder::Shared(shared) => Ref(Holder::Shared(shared.clone())),
            Holder::Static(object) => Ref(Holder::Static(object)),
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ref").field(&&**self).finish()
    }
}

/// View a given type as its expected type.
///
/// Every type can be viewed as itself. Trait objects get their implementations
/// through the [interface](crate::interface) macro, which makes binding an
/// interface to a non-implementor a compile error.
pub trait Upcast<E: ?Sized>: Send + Sync + 'static {
    fn upcast_box(self: Box<Self>) -> Box<E>;
    fn upcast_arc(self: Arc<Self>) -> Arc<E>;
}

impl<T: Send + Sync + 'static> Upcast<T> for T {
    fn upcast_box(self: Box<Self>) -> Box<T> {
        self
    }

    fn upcast_arc(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Declare a trait object as an injectable interface and list its implementations.
///
/// ```
/// # use std::sync::Arc;
/// # use musubi::*;
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// #[derive(Default)]
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
/// injectable!(English);
/// interface!(dyn Greeter => English);
///
/// let injector = make_injector!(bind::<dyn Greeter>().to_type::<English>());
/// let greeter: Box<dyn Greeter> = injector.create()?;
/// assert_eq!(greeter.greet(), "hello");
/// # Ok::<(), InjectError>(())
/// ```
#[macro_export]
macro_rules! interface {
    ($Interface:ty $(=> $($Implementation:ty),+ $(,)?)?) => {
        impl $crate::Component for $Interface {}

        $($(
        impl $crate::Upcast<$Interface> for $Implementation {
            fn upcast_box(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<$Interface> {
                self
            }
            fn upcast_arc(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$Interface> {
                self
            }
        }
        )+)?
    };
}
