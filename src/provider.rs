//! Allocation admission
//!
//! Every fresh instance is announced to a [Provider] once its constructor arguments are resolved
//! and right before its constructor runs. The provider may refuse, in which case the request
//! fails with [InjectError::Allocation], or yields `None` when it was made through an `Option`.
//!
//! A provider is an admission policy, not a construction strategy: admitted instances are
//! always placed on the global heap by [Creator] (`Box::new` or `Arc::new`). [Arena] only keeps
//! a byte budget and never hands out memory of its own; released instances do not give their
//! bytes back.
//!
//! ```
//! # use std::sync::Arc;
//! # use musubi::*;
//! #[derive(Default)]
//! struct Buffer([u64; 8]);
//! injectable!(Buffer);
//!
//! let injector = make_injector!();
//! let arena = Arena::with_capacity(100);
//!
//! let first: Option<Box<Buffer>> = injector.provide(&arena)?;
//! let second: Option<Box<Buffer>> = injector.provide(&arena)?;
//! assert!(first.is_some());
//! assert!(second.is_none());
//! # Ok::<(), InjectError>(())
//! ```

use std::alloc::Layout;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::ctor::Injectable;
use crate::error::{AllocError, InjectError};
use crate::inject::Context;
use crate::pool::TypeInfo;
use crate::wrapper::Upcast;

/// Admission policy consulted for every fresh instance
pub trait Provider: Send + Sync {
    fn allocate(&self, info: &TypeInfo, layout: Layout) -> Result<(), AllocError>;
}

/// Admits everything
#[derive(Debug, Clone, Copy, Default)]
pub struct Heap;

impl Provider for Heap {
    fn allocate(&self, _info: &TypeInfo, _layout: Layout) -> Result<(), AllocError> {
        Ok(())
    }
}

/// Fixed byte budget, refusing any instance that does not fit in what is left.
///
/// Instances are still heap allocated; only their padded size is counted.
#[derive(Debug, Default)]
pub struct Arena {
    capacity: usize,
    used: AtomicUsize,
}

impl Arena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            used: AtomicUsize::new(0),
        }
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.used())
    }
}

impl Provider for Arena {
    fn allocate(&self, info: &TypeInfo, layout: Layout) -> Result<(), AllocError> {
        let size = layout.pad_to_align().size();
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(size).filter(|&total| total <= self.capacity)
            })
            .map(|_| ())
            .map_err(|used| {
                tracing::warn!(
                    type_name = info.type_name,
                    size,
                    used,
                    capacity = self.capacity,
                    "arena exhausted"
                );
                AllocError
            })
    }
}

/// Builds instances of the given type `G` for a scope
pub struct Creator<'c, 'a, G> {
    cx: &'c mut Context<'a>,
    _given: PhantomData<fn() -> G>,
}

impl<'c, 'a, G: Injectable> Creator<'c, 'a, G> {
    pub fn new(cx: &'c mut Context<'a>) -> Self {
        Self {
            cx,
            _given: PhantomData,
        }
    }

    /// A fresh instance owned by the caller
    pub fn get<E: ?Sized>(self) -> Result<Box<E>, InjectError>
    where
        G: Upcast<E>,
    {
        let instance = self.cx.construct::<G>()?;
        Ok(<G as Upcast<E>>::upcast_box(Box::new(instance)))
    }

    /// A fresh instance in shared ownership
    pub fn get_shared<E: ?Sized>(self) -> Result<Arc<E>, InjectError>
    where
        G: Upcast<E>,
    {
        let instance = self.cx.construct::<G>()?;
        Ok(<G as Upcast<E>>::upcast_arc(Arc::new(instance)))
    }
}
