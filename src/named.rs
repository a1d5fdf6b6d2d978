//! Name annotations
//!
//! A binding key is the pair (expected type, name). Names are plain marker types:
//!
//! ```
//! # use musubi::*;
//! struct Radius;
//!
//! let injector = make_injector!(bind::<f64>().named(Radius).to(5.0_f64));
//!
//! let radius: Named<f64, Radius> = injector.create()?;
//! let unnamed: f64 = injector.create()?;
//! assert_eq!(*radius, 5.0);
//! assert_eq!(unnamed, 0.0);
//! # Ok::<(), InjectError>(())
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

/// Name of every binding declared without [named](crate::Dependency::named)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NoName;

/// A request for `T` under the name `N`.
///
/// Named and unnamed keys are disjoint: `Named<T, N>` never matches a plain `T` binding.
pub struct Named<T, N> {
    object: T,
    _name: PhantomData<fn() -> N>,
}

impl<T, N> Named<T, N> {
    pub fn new(object: T) -> Self {
        Self {
            object,
            _name: PhantomData,
        }
    }

    pub fn into_inner(self) -> T {
        self.object
    }
}

impl<T, N> Deref for Named<T, N> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.object
    }
}

impl<T, N> DerefMut for Named<T, N> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.object
    }
}

impl<T: Clone, N> Clone for Named<T, N> {
    fn clone(&self) -> Self {
        Self::new(self.object.clone())
    }
}

impl<T: PartialEq, N> PartialEq for Named<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object
    }
}

impl<T: fmt::Debug, N> fmt::Debug for Named<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Named")
            .field(&self.object)
            .field(&std::any::type_name::<N>())
            .finish()
    }
}
