use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::ctor::Injectable;
use crate::error::InjectError;
use crate::inject::Context;
use crate::shape::{Component, Deduced, Shape};
use crate::wrapper::{Upcast, Wrapped};

use super::singleton::cached;
use super::{unsupported, Scope, Unique};

/// Scope chosen by the shape of each request: values, boxes and references get a fresh
/// instance, shared and weak handles a cached one.
///
/// Default scope of every binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deduce;

impl<E, G> Scope<E, G> for Deduce
where
    E: ?Sized + Component,
    G: Injectable + Upcast<E>,
{
    type State = OnceCell<Arc<E>>;
    const INHERITED: bool = true;

    fn state(&self) -> Self::State {
        OnceCell::new()
    }

    fn create(
        &self,
        state: &Self::State,
        shape: Shape,
        cx: &mut Context<'_>,
    ) -> Result<Wrapped<E>, InjectError> {
        match shape.deduced() {
            Deduced::Unique => <Unique as Scope<E, G>>::create(&Unique, &(), shape, cx),
            Deduced::Singleton => cached::<E, G>(state, shape, cx),
            // external objects come from explicit bindings only
            Deduced::External => Err(unsupported::<E>(shape, "no external object")),
        }
    }

    fn resolvable(&self, shape: Shape, cx: &mut Context<'_>) -> bool {
        shape.deduced() != Deduced::External && cx.constructible::<G>()
    }
}
