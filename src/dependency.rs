//! Dependency descriptors
//!
//! A [Dependency] pairs a scope policy with an expected type, a given type and a name.
//! Descriptors are plain values: every modifier consumes the descriptor and returns a new one,
//! usually of a different type, so they compose in any order.
//!
//! ```
//! # use std::sync::Arc;
//! # use musubi::*;
//! #[derive(Default)]
//! struct Cache(Vec<u8>);
//! injectable!(Cache);
//!
//! struct Primary;
//!
//! let injector = make_injector!(
//!     bind::<Cache>().in_scope(Singleton),
//!     bind::<Cache>().named(Primary).in_scope(Unique),
//! );
//!
//! let a: Arc<Cache> = injector.create()?;
//! let b: Arc<Cache> = injector.create()?;
//! assert!(Arc::ptr_eq(&a, &b));
//!
//! let c: Named<Arc<Cache>, Primary> = injector.create()?;
//! assert!(!Arc::ptr_eq(&a, &*c));
//! # Ok::<(), InjectError>(())
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::InjectError;
use crate::inject::{Context, Core};
use crate::named::NoName;
use crate::pool::{BindingKey, Entry, PoolEntry};
use crate::scopes::external::{Func, SharedValue, StaticRef, Value, WithInjector};
use crate::scopes::{Deduce, External, Scope};
use crate::shape::{Component, Shape};
use crate::wrapper::{Upcast, Wrapped};

/// A registered binding for the expected type `E`, as seen by the injector
pub trait Binding<E: ?Sized>: Send + Sync {
    /// Produce an instance for the requested shape
    fn create(&self, shape: Shape, cx: &mut Context<'_>) -> Result<Wrapped<E>, InjectError>;

    /// Whether `create` can succeed with the current bindings, without building anything
    fn resolvable(&self, shape: Shape, cx: &mut Context<'_>) -> bool;
}

/// Binding declaration: scope `S`, expected type `E`, given type `G` and name `N`
pub struct Dependency<S, E: ?Sized, G: ?Sized = E, N = NoName> {
    scope: S,
    _marker: PhantomData<fn() -> (Box<E>, Box<G>, N)>,
}

/// Start a binding declaration for the expected type `E`.
///
/// The given type is `E` itself and the scope is deduced from the shape of each request.
pub fn bind<E: ?Sized + Component>() -> Dependency<Deduce, E> {
    Dependency::new(Deduce)
}

impl<S, E: ?Sized, G: ?Sized, N> Dependency<S, E, G, N> {
    fn new(scope: S) -> Self {
        Self {
            scope,
            _marker: PhantomData,
        }
    }

    pub fn scope(&self) -> &S {
        &self.scope
    }

    /// Same binding under the name `M`
    pub fn named<M: 'static>(self, _name: M) -> Dependency<S, E, G, M> {
        Dependency::new(self.scope)
    }

    /// Same binding in another scope
    pub fn in_scope<T>(self, scope: T) -> Dependency<T, E, G, N> {
        Dependency::new(scope)
    }

    /// Construct `H` to satisfy requests for `E`
    pub fn to_type<H: ?Sized>(self) -> Dependency<S, E, H, N> {
        Dependency::new(self.scope)
    }

    /// Bind to a value; owned requests receive a copy, shared requests the same instance
    pub fn to<V>(self, value: V) -> Dependency<External<Value<V>>, E, E, N>
    where
        V: Clone + Upcast<E>,
    {
        Dependency::new(External::new(Value::new(value)))
    }

    /// Bind to a function called on every request
    pub fn to_fn<F, V>(self, function: F) -> Dependency<External<Func<F>>, E, E, N>
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Upcast<E>,
    {
        Dependency::new(External::new(Func::new(function)))
    }

    /// Bind to a function receiving the resolution context, so that the result can depend on
    /// other bindings
    pub fn to_with<F, V>(self, function: F) -> Dependency<External<WithInjector<F>>, E, E, N>
    where
        F: Fn(&mut Context<'_>) -> Result<V, InjectError> + Send + Sync + 'static,
        V: Upcast<E>,
    {
        Dependency::new(External::new(WithInjector::new(function)))
    }

    /// Bind to an instance shared with the caller
    pub fn to_shared(self, instance: Arc<E>) -> Dependency<External<SharedValue<E>>, E, E, N>
    where
        E: Send + Sync + 'static,
    {
        Dependency::new(External::new(SharedValue::new(instance)))
    }

    /// Bind to an object owned outside of the injector
    pub fn to_static(self, object: &'static E) -> Dependency<External<StaticRef<E>>, E, E, N>
    where
        E: Sync + 'static,
    {
        Dependency::new(External::new(StaticRef::new(object)))
    }
}

impl<S, E, G, N> Dependency<S, E, G, N>
where
    S: Scope<E, G>,
    E: ?Sized + 'static,
    G: ?Sized + 'static,
    N: 'static,
{
    pub fn key(&self) -> BindingKey {
        BindingKey::of::<E, N>()
    }

    /// Turn the declaration into a binding with its own scope state
    pub fn into_binding(self) -> Arc<dyn Binding<E>> {
        Arc::new(Slot::new(self, None))
    }

    pub(crate) fn into_entry(self) -> PoolEntry {
        PoolEntry::new::<E, _>(self.key(), Arc::new(Slot::new(self, None)))
    }
}

impl<S: Clone, E: ?Sized, G: ?Sized, N> Clone for Dependency<S, E, G, N> {
    fn clone(&self) -> Self {
        Self::new(self.scope.clone())
    }
}

impl<S: fmt::Debug, E: ?Sized, G: ?Sized, N> fmt::Debug for Dependency<S, E, G, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("scope", &self.scope)
            .field("expected", &std::any::type_name::<E>())
            .field("given", &std::any::type_name::<G>())
            .field("name", &std::any::type_name::<N>())
            .finish()
    }
}

/// A dependency together with its scope state, created on first use
struct Slot<S, E: ?Sized, G: ?Sized, N>
where
    S: Scope<E, G>,
{
    dependency: Dependency<S, E, G, N>,
    state: OnceCell<S::State>,
    /// Injector to resolve in, when the binding was re-derived from another injector
    source: Option<Arc<Core>>,
}

impl<S, E, G, N> Slot<S, E, G, N>
where
    S: Scope<E, G>,
    E: ?Sized,
    G: ?Sized,
{
    fn new(dependency: Dependency<S, E, G, N>, source: Option<Arc<Core>>) -> Self {
        Self {
            dependency,
            state: OnceCell::new(),
            source,
        }
    }

    fn state(&self) -> &S::State {
        self.state.get_or_init(|| self.dependency.scope.state())
    }
}

impl<S, E, G, N> Binding<E> for Slot<S, E, G, N>
where
    S: Scope<E, G>,
    E: ?Sized + 'static,
    G: ?Sized + 'static,
    N: 'static,
{
    fn create(&self, shape: Shape, cx: &mut Context<'_>) -> Result<Wrapped<E>, InjectError> {
        let scope = &self.dependency.scope;
        match &self.source {
            Some(core) => cx.rebase(core, |cx| scope.create(self.state(), shape, cx)),
            None => scope.create(self.state(), shape, cx),
        }
    }

    fn resolvable(&self, shape: Shape, cx: &mut Context<'_>) -> bool {
        let scope = &self.dependency.scope;
        match &self.source {
            Some(core) => cx.rebase(core, |cx| scope.resolvable(shape, cx)),
            None => scope.resolvable(shape, cx),
        }
    }
}

impl<S, E, G, N> Entry for Slot<S, E, G, N>
where
    S: Scope<E, G>,
    E: ?Sized + 'static,
    G: ?Sized + 'static,
    N: 'static,
{
    fn call(&self, action: &dyn Any) {
        self.dependency.scope.call(self.state(), action);
    }

    fn forward(self: Arc<Self>, source: &Arc<Core>) -> PoolEntry {
        let key = self.dependency.key();
        if S::INHERITED {
            PoolEntry::new::<E, _>(key, Arc::new(Alias::new(key, self, source.clone())))
        } else {
            let slot = Slot::new(self.dependency.clone(), Some(source.clone()));
            PoolEntry::new::<E, _>(key, Arc::new(slot))
        }
    }
}

/// Binding of another injector, sharing its scope state
struct Alias<T, E: ?Sized> {
    key: BindingKey,
    target: Arc<T>,
    source: Arc<Core>,
    _expected: PhantomData<fn() -> Box<E>>,
}

impl<T, E: ?Sized> Alias<T, E> {
    fn new(key: BindingKey, target: Arc<T>, source: Arc<Core>) -> Self {
        Self {
            key,
            target,
            source,
            _expected: PhantomData,
        }
    }
}

impl<T, E> Binding<E> for Alias<T, E>
where
    T: Binding<E>,
    E: ?Sized + 'static,
{
    fn create(&self, shape: Shape, cx: &mut Context<'_>) -> Result<Wrapped<E>, InjectError> {
        cx.rebase(&self.source, |cx| {
            cx.guarded(self.key, &*self.target, |cx| self.target.create(shape, cx))
        })
    }

    fn resolvable(&self, shape: Shape, cx: &mut Context<'_>) -> bool {
        cx.rebase(&self.source, |cx| {
            cx.guarded(self.key, &*self.target, |cx| Ok(self.target.resolvable(shape, cx)))
                .unwrap_or(false)
        })
    }
}

impl<T, E> Entry for Alias<T, E>
where
    T: Binding<E> + Entry + 'static,
    E: ?Sized + 'static,
{
    fn call(&self, action: &dyn Any) {
        self.target.call(action);
    }

    fn forward(self: Arc<Self>, _source: &Arc<Core>) -> PoolEntry {
        // The state still lives in the injector that declared the binding
        PoolEntry::new::<E, _>(self.key, self)
    }
}
