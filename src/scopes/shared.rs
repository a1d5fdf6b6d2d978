use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::ctor::Injectable;
use crate::error::InjectError;
use crate::inject::Context;
use crate::shape::{Component, Shape};
use crate::wrapper::{Upcast, Wrapped};

use super::singleton::{cacheable, cached};
use super::Scope;

/// One instance per injector.
///
/// Unlike [Singleton](super::Singleton), an injector composed from the declaring one builds
/// its own instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shared;

impl<E, G> Scope<E, G> for Shared
where
    E: ?Sized + Component,
    G: Injectable + Upcast<E>,
{
    type State = OnceCell<Arc<E>>;

    fn state(&self) -> Self::State {
        OnceCell::new()
    }

    fn create(
        &self,
        state: &Self::State,
        shape: Shape,
        cx: &mut Context<'_>,
    ) -> Result<Wrapped<E>, InjectError> {
        cached::<E, G>(state, shape, cx)
    }

    fn resolvable(&self, shape: Shape, cx: &mut Context<'_>) -> bool {
        cacheable(shape) && cx.constructible::<G>()
    }
}
