//! Values supplied from outside of the injector

use std::sync::Arc;

use crate::error::InjectError;
use crate::inject::Context;
use crate::shape::{Component, Shape};
use crate::wrapper::{Upcast, Wrapped};

use super::{unsupported, Scope};

/// Scope of bindings created with [to](crate::Dependency::to) and its variants
#[derive(Debug, Clone)]
pub struct External<V>(V);

impl<V> External<V> {
    pub fn new(value: V) -> Self {
        Self(value)
    }
}

/// Something an [External] scope can hand out as an `E`
pub trait ExternalValue<E: ?Sized>: Clone + Send + Sync + 'static {
    fn produce(&self, shape: Shape, cx: &mut Context<'_>) -> Result<Wrapped<E>, InjectError>;

    fn supports(&self, shape: Shape) -> bool;
}

impl<E, G, V> Scope<E, G> for External<V>
where
    E: ?Sized + Component,
    G: ?Sized + 'static,
    V: ExternalValue<E>,
{
    type State = ();
    const INHERITED: bool = true;

    fn state(&self) {}

    fn create(
        &self,
        _state: &(),
        shape: Shape,
        cx: &mut Context<'_>,
    ) -> Result<Wrapped<E>, InjectError> {
        if !self.0.supports(shape) {
            return Err(unsupported::<E>(shape, "an external value"));
        }
        self.0.produce(shape, cx)
    }

    fn resolvable(&self, shape: Shape, _cx: &mut Context<'_>) -> bool {
        self.0.supports(shape)
    }
}

/// A value: copies for owned requests, one shared instance otherwise
pub struct Value<V> {
    value: Arc<V>,
}

impl<V> Value<V> {
    pub fn new(value: V) -> Self {
        Self {
            value: Arc::new(value),
        }
    }
}

impl<V> Clone for Value<V> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<E, V> ExternalValue<E> for Value<V>
where
    E: ?Sized,
    V: Clone + Upcast<E>,
{
    fn produce(&self, shape: Shape, _cx: &mut Context<'_>) -> Result<Wrapped<E>, InjectError> {
        Ok(match shape {
            Shape::Value | Shape::Boxed => {
                Wrapped::Owned(<V as Upcast<E>>::upcast_box(Box::new(V::clone(&self.value))))
            }
            _ => Wrapped::Shared(<V as Upcast<E>>::upcast_arc(self.value.clone())),
        })
    }

    fn supports(&self, shape: Shape) -> bool {
        shape != Shape::Static
    }
}

/// A function called on every request
pub struct Func<F>(Arc<F>);

impl<F> Func<F> {
    pub fn new(function: F) -> Self {
        Self(Arc::new(function))
    }
}

impl<F> Clone for Func<F> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<E, F, V> ExternalValue<E> for Func<F>
where
    E: ?Sized,
    F: Fn() -> V + Send + Sync + 'static,
    V: Upcast<E>,
{
    fn produce(&self, shape: Shape, _cx: &mut Context<'_>) -> Result<Wrapped<E>, InjectError> {
        Ok(fresh(shape, (self.0)()))
    }

    fn supports(&self, shape: Shape) -> bool {
        fresh_supports(shape)
    }
}

/// A function receiving the resolution context
pub struct WithInjector<F>(Arc<F>);

impl<F> WithInjector<F> {
    pub fn new(function: F) -> Self {
        Self(Arc::new(function))
    }
}

impl<F> Clone for WithInjector<F> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<E, F, V> ExternalValue<E> for WithInjector<F>
where
    E: ?Sized,
    F: Fn(&mut Context<'_>) -> Result<V, InjectError> + Send + Sync + 'static,
    V: Upcast<E>,
{
    fn produce(&self, shape: Shape, cx: &mut Context<'_>) -> Result<Wrapped<E>, InjectError> {
        Ok(fresh(shape, (self.0)(cx)?))
    }

    fn supports(&self, shape: Shape) -> bool {
        fresh_supports(shape)
    }
}

fn fresh<E: ?Sized, V: Upcast<E>>(shape: Shape, value: V) -> Wrapped<E> {
    match shape {
        Shape::Shared => Wrapped::Shared(<V as Upcast<E>>::upcast_arc(Arc::new(value))),
        _ => Wrapped::Owned(<V as Upcast<E>>::upcast_box(Box::new(value))),
    }
}

fn fresh_supports(shape: Shape) -> bool {
    !matches!(shape, Shape::Weak | Shape::Static)
}

/// An instance shared with the code that declared the binding
pub struct SharedValue<E: ?Sized>(Arc<E>);

impl<E: ?Sized> SharedValue<E> {
    pub fn new(instance: Arc<E>) -> Self {
        Self(instance)
    }
}

impl<E: ?Sized> Clone for SharedValue<E> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<E: ?Sized + Send + Sync + 'static> ExternalValue<E> for SharedValue<E> {
    fn produce(&self, _shape: Shape, _cx: &mut Context<'_>) -> Result<Wrapped<E>, InjectError> {
        Ok(Wrapped::Shared(self.0.clone()))
    }

    fn supports(&self, shape: Shape) -> bool {
        matches!(shape, Shape::Shared | Shape::Weak | Shape::Ref)
    }
}

/// An object owned outside of the injector
pub struct StaticRef<E: ?Sized + 'static>(&'static E);

impl<E: ?Sized> StaticRef<E> {
    pub fn new(object: &'static E) -> Self {
        Self(object)
    }
}

impl<E: ?Sized> Clone for StaticRef<E> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl<E: ?Sized + Sync + 'static> ExternalValue<E> for StaticRef<E> {
    fn produce(&self, _shape: Shape, _cx: &mut Context<'_>) -> Result<Wrapped<E>, InjectError> {
        Ok(Wrapped::Static(self.0))
    }

    fn supports(&self, shape: Shape) -> bool {
        matches!(shape, Shape::Static | Shape::Ref)
    }
}
