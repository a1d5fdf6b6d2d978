use crate::ctor::Injectable;
use crate::error::InjectError;
use crate::inject::Context;
use crate::provider::Creator;
use crate::shape::{Component, Shape};
use crate::wrapper::{Upcast, Wrapped};

use super::{unsupported, Scope};

/// A fresh instance of the given type for every request
#[derive(Debug, Clone, Copy, Default)]
pub struct Unique;

impl<E, G> Scope<E, G> for Unique
where
    E: ?Sized + Component,
    G: Injectable + Upcast<E>,
{
    type State = ();

    fn state(&self) {}

    fn create(
        &self,
        _state: &(),
        shape: Shape,
        cx: &mut Context<'_>,
    ) -> Result<Wrapped<E>, InjectError> {
        match shape {
            Shape::Value | Shape::Boxed | Shape::Ref => {
                Creator::<G>::new(cx).get::<E>().map(Wrapped::Owned)
            }
            Shape::Shared => Creator::<G>::new(cx).get_shared::<E>().map(Wrapped::Shared),
            // nothing would keep the instance alive
            Shape::Weak | Shape::Static => Err(unsupported::<E>(shape, "a fresh instance")),
        }
    }

    fn resolvable(&self, shape: Shape, cx: &mut Context<'_>) -> bool {
        !matches!(shape, Shape::Weak | Shape::Static) && cx.constructible::<G>()
    }
}
