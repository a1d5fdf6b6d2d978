use std::any::Any;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};

use crate::ctor::Injectable;
use crate::error::InjectError;
use crate::inject::Context;
use crate::provider::Creator;
use crate::shape::{Component, Shape};
use crate::wrapper::{Upcast, Wrapped};

use super::singleton::cacheable;
use super::{unsupported, Scope};

/// Instance cached between a [SessionEntry] and a [SessionExit] carrying the name `N`.
///
/// While the session is inactive, requests yield an empty handle, which `Option` requests
/// receive as `None`.
///
/// ```
/// # use std::sync::Arc;
/// # use musubi::*;
/// #[derive(Default)]
/// struct Cart(Vec<u32>);
/// injectable!(Cart);
///
/// struct Checkout;
///
/// let injector = make_injector!(bind::<Cart>().in_scope(session(Checkout)));
/// assert!(injector.create::<Option<Arc<Cart>>>()?.is_none());
///
/// injector.call(&SessionEntry(Checkout));
/// let a: Arc<Cart> = injector.create()?;
/// let b: Arc<Cart> = injector.create()?;
/// assert!(Arc::ptr_eq(&a, &b));
///
/// injector.call(&SessionExit(Checkout));
/// assert!(injector.create::<Option<Arc<Cart>>>()?.is_none());
/// # Ok::<(), InjectError>(())
/// ```
pub struct Session<N> {
    _name: PhantomData<fn() -> N>,
}

/// Session scope for the name `N`
pub fn session<N: 'static>(_name: N) -> Session<N> {
    Session { _name: PhantomData }
}

/// Action activating the sessions named `N`
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionEntry<N>(pub N);

/// Action deactivating the sessions named `N` and dropping their instances
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionExit<N>(pub N);

impl<N> Clone for Session<N> {
    fn clone(&self) -> Self {
        Session { _name: PhantomData }
    }
}

impl<N> std::fmt::Debug for Session<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Session")
            .field(&std::any::type_name::<N>())
            .finish()
    }
}

pub struct SessionState<E: ?Sized> {
    active: bool,
    instance: Option<Arc<E>>,
}

impl<E, G, N> Scope<E, G> for Session<N>
where
    E: ?Sized + Component,
    G: Injectable + Upcast<E>,
    N: 'static,
{
    type State = Mutex<SessionState<E>>;

    fn state(&self) -> Self::State {
        Mutex::new(SessionState {
            active: false,
            instance: None,
        })
    }

    fn create(
        &self,
        state: &Self::State,
        shape: Shape,
        cx: &mut Context<'_>,
    ) -> Result<Wrapped<E>, InjectError> {
        {
            let state = state.lock().unwrap_or_else(PoisonError::into_inner);
            if !state.active {
                return Ok(Wrapped::Empty);
            }
            if !cacheable(shape) {
                return Err(unsupported::<E>(shape, "a session instance"));
            }
            if let Some(instance) = &state.instance {
                return Ok(Wrapped::Shared(instance.clone()));
            }
        }

        // the lock is not held while building, so that the constructor may use other sessions
        let built = Creator::<G>::new(cx).get_shared::<E>()?;

        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.active {
            return Ok(Wrapped::Empty);
        }
        let instance = state.instance.get_or_insert(built).clone();
        tracing::debug!(
            session = std::any::type_name::<N>(),
            given = std::any::type_name::<G>(),
            "session instance created"
        );
        Ok(Wrapped::Shared(instance))
    }

    fn resolvable(&self, shape: Shape, cx: &mut Context<'_>) -> bool {
        cacheable(shape) && cx.constructible::<G>()
    }

    fn call(&self, state: &Self::State, action: &dyn Any) {
        let entry = action.is::<SessionEntry<N>>();
        if !entry && !action.is::<SessionExit<N>>() {
            return;
        }
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        state.active = entry;
        if !entry {
            state.instance = None;
        }
        tracing::debug!(
            session = std::any::type_name::<N>(),
            active = entry,
            "session state changed"
        );
    }
}
