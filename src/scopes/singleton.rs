use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::ctor::Injectable;
use crate::error::InjectError;
use crate::inject::Context;
use crate::provider::Creator;
use crate::shape::{Component, Shape};
use crate::wrapper::{Upcast, Wrapped};

use super::{unsupported, Scope};

/// One instance, built on first use and kept by the scope.
///
/// Injectors composed from the declaring injector share the instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Singleton;

impl<E, G> Scope<E, G> for Singleton
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
        cached::<E, G>(state, shape, cx)
    }

    fn resolvable(&self, shape: Shape, cx: &mut Context<'_>) -> bool {
        cacheable(shape) && cx.constructible::<G>()
    }
}

pub(crate) fn cacheable(shape: Shape) -> bool {
    matches!(shape, Shape::Shared | Shape::Weak | Shape::Ref)
}

/// Shared instance from the cache, populated on first use
pub(crate) fn cached<E, G>(
    cache: &OnceCell<Arc<E>>,
    shape: Shape,
    cx: &mut Context<'_>,
) -> Result<Wrapped<E>, InjectError>
where
    E: ?Sized + Component,
    G: Injectable + Upcast<E>,
{
    if !cacheable(shape) {
        return Err(unsupported::<E>(shape, "a shared instance"));
    }
    let instance = cache.get_or_try_init(|| {
        tracing::debug!(given = std::any::type_name::<G>(), "populating cached instance");
        Creator::<G>::new(cx).get_shared::<E>()
    })?;
    Ok(Wrapped::Shared(instance.clone()))
}
