use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::InjectError;
use crate::inject::{Context, Injector};
use crate::named::NoName;
use crate::shape::{Component, Deduced, Shape};
use crate::wrapper::Wrapped;

/// Publish the binding of another injector, applying the scope deduced from each request
/// on top of it
#[derive(Clone)]
pub struct Exposed {
    source: Injector,
}

impl Exposed {
    pub fn new(source: &Injector) -> Self {
        Self {
            source: source.clone(),
        }
    }
}

impl std::fmt::Debug for Exposed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exposed").finish_non_exhaustive()
    }
}

impl<E, G> super::Scope<E, G> for Exposed
where
    E: ?Sized + Component,
    G: ?Sized + 'static,
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
        let source = self.source.core();
        match shape.deduced() {
            Deduced::Singleton => {
                let instance = state.get_or_try_init(|| {
                    cx.rebase(source, |cx| cx.produce::<E, NoName>(Shape::Shared))?
                        .into_shared()
                })?;
                Ok(Wrapped::Shared(instance.clone()))
            }
            Deduced::Unique | Deduced::External => {
                cx.rebase(source, |cx| cx.produce::<E, NoName>(shape))
            }
        }
    }

    fn resolvable(&self, shape: Shape, cx: &mut Context<'_>) -> bool {
        let source = self.source.core();
        match shape.deduced() {
            Deduced::Singleton => cx.rebase(source, |cx| {
                cx.satisfiable::<E, NoName>(Shape::Shared)
            }),
            Deduced::Unique | Deduced::External => {
                cx.rebase(source, |cx| cx.satisfiable::<E, NoName>(shape))
            }
        }
    }
}
