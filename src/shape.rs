//! Request shapes
//!
//! The type asked for at an injection site decides both the plain type and name to look up
//! and the scope a deduced binding applies. The set of shapes is closed:
//!
//! | shape                    | deduced scope |
//! |--------------------------|---------------|
//! | `T` (value)              | unique        |
//! | `Box<T>`                 | unique        |
//! | `Ref<T>`                 | unique        |
//! | `Arc<T>`                 | singleton     |
//! | `Weak<T>`                | singleton     |
//! | `&'static T`             | external      |
//! | `Named<R, N>`            | as `R`        |
//! | `Option<R>`              | as `R`        |

use std::fmt;
use std::sync::{Arc, Weak};

use crate::dependency::Binding;
use crate::error::InjectError;
use crate::named::{Named, NoName};
use crate::wrapper::{Ref, Wrapped};

/// Static shape of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Value,
    Boxed,
    Ref,
    Shared,
    Weak,
    Static,
}

/// Scope selected by a deduced binding for a given shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deduced {
    Unique,
    Singleton,
    External,
}

impl Shape {
    pub fn deduced(self) -> Deduced {
        match self {
            Shape::Value | Shape::Boxed | Shape::Ref => Deduced::Unique,
            Shape::Shared | Shape::Weak => Deduced::Singleton,
            Shape::Static => Deduced::External,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Value => "a value",
            Shape::Boxed => "Box",
            Shape::Ref => "Ref",
            Shape::Shared => "Arc",
            Shape::Weak => "Weak",
            Shape::Static => "&'static",
        })
    }
}

/// A type that can be the plain (expected) type of a binding key.
///
/// Concrete types get an implementation from [injectable](crate::injectable),
/// trait objects from [interface](crate::interface).
pub trait Component: Send + Sync + 'static {
    /// Binding used when nothing is registered for this type.
    ///
    /// Concrete types bind to themselves with the deduced scope; interfaces have none.
    fn self_binding() -> Option<Arc<dyn Binding<Self>>> {
        None
    }
}

/// Shape of an injection site: what is looked up, and how the result is adapted
pub trait Request: Sized + 'static {
    type Plain: ?Sized + Component;
    type Name: 'static;
    const SHAPE: Shape;

    fn adapt(wrapped: Wrapped<Self::Plain>) -> Result<Self, InjectError>;

    /// Called when the binding failed to produce anything
    fn absent(error: InjectError) -> Result<Self, InjectError> {
        Err(error)
    }
}

impl<T: ?Sized + Component> Request for Box<T> {
    type Plain = T;
    type Name = NoName;
    const SHAPE: Shape = Shape::Boxed;

    fn adapt(wrapped: Wrapped<T>) -> Result<Self, InjectError> {
        wrapped.into_boxed()
    }
}

impl<T: ?Sized + Component> Request for Arc<T> {
    type Plain = T;
    type Name = NoName;
    const SHAPE: Shape = Shape::Shared;

    fn adapt(wrapped: Wrapped<T>) -> Result<Self, InjectError> {
        wrapped.into_shared()
    }
}

impl<T: ?Sized + Component> Request for Weak<T> {
    type Plain = T;
    type Name = NoName;
    const SHAPE: Shape = Shape::Weak;

    fn adapt(wrapped: Wrapped<T>) -> Result<Self, InjectError> {
        wrapped.into_weak()
    }
}

impl<T: ?Sized + Component> Request for Ref<T> {
    type Plain = T;
    type Name = NoName;
    const SHAPE: Shape = Shape::Ref;

    fn adapt(wrapped: Wrapped<T>) -> Result<Self, InjectError> {
        wrapped.into_ref()
    }
}

impl<T: ?Sized + Component> Request for &'static T {
    type Plain = T;
    type Name = NoName;
    const SHAPE: Shape = Shape::Static;

    fn adapt(wrapped: Wrapped<T>) -> Result<Self, InjectError> {
        wrapped.into_static()
    }
}

impl<R: Request<Name = NoName>, N: 'static> Request for Named<R, N> {
    type Plain = R::Plain;
    type Name = N;
    const SHAPE: Shape = R::SHAPE;

    fn adapt(wrapped: Wrapped<R::Plain>) -> Result<Self, InjectError> {
        R::adapt(wrapped).map(Named::new)
    }

    fn absent(error: InjectError) -> Result<Self, InjectError> {
        R::absent(error).map(Named::new)
    }
}

/// Nullable handle: empty scopes and refused allocations become `None`
impl<R: Request> Request for Option<R> {
    type Plain = R::Plain;
    type Name = R::Name;
    const SHAPE: Shape = R::SHAPE;

    fn adapt(wrapped: Wrapped<R::Plain>) -> Result<Self, InjectError> {
        match wrapped {
            Wrapped::Empty => Ok(None),
            wrapped => R::adapt(wrapped).map(Some),
        }
    }

    fn absent(error: InjectError) -> Result<Self, InjectError> {
        match error {
            InjectError::Allocation { .. } | InjectError::Empty { .. } => Ok(None),
            error => R::absent(error).map(Some),
        }
    }
}

impl Component for str {}

/// Plain values with a zero-argument construction through [Default]
macro_rules! value_component {
    ($($Type:ty),+ $(,)?) => {
        $(
        impl Component for $Type {
            fn self_binding() -> Option<Arc<dyn Binding<Self>>> {
                Some($crate::dependency::bind::<$Type>().into_binding())
            }
        }

        impl $crate::ctor::Injectable for $Type {
            fn signature() -> $crate::ctor::Signature<Self> {
                $crate::ctor::Signature::Explicit($crate::__ctor!(<$Type as Default>::default))
            }
        }

        impl Request for $Type {
            type Plain = $Type;
            type Name = NoName;
            const SHAPE: Shape = Shape::Value;

            fn adapt(wrapped: Wrapped<$Type>) -> Result<Self, InjectError> {
                wrapped.into_value()
            }
        }
        )+
    };
}

value_component!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
);

/// Declare concrete types that the injector never constructs itself.
///
/// They can be requested in any shape, but must be bound explicitly, usually to a value.
///
/// ```
/// # use musubi::*;
/// #[derive(Clone)]
/// struct Settings {
///     verbose: bool,
/// }
/// component!(Settings);
///
/// let injector = Injector::builder().arg(Settings { verbose: true }).build();
/// let settings: Settings = injector.create()?;
/// assert!(settings.verbose);
/// # Ok::<(), InjectError>(())
/// ```
#[macro_export]
macro_rules! component {
    ($($Type:ty),+ $(,)?) => {
        $(
        impl $crate::Component for $Type {}

        impl $crate::Request for $Type {
            type Plain = $Type;
            type Name = $crate::NoName;
            const SHAPE: $crate::Shape = $crate::Shape::Value;

            fn adapt(wrapped: $crate::Wrapped<Self>) -> ::std::result::Result<Self, $crate::InjectError> {
                wrapped.into_value()
            }
        }
        )+
    };
}
