use std::any::Any;
use std::mem;
use std::sync::Arc;

use crate::config::Config;
use crate::ctor::Injectable;
use crate::dependency::{bind, Binding, Dependency};
use crate::error::InjectError;
use crate::pool::{BindingKey, Bindings, TypeInfo, TypeMap};
use crate::provider::Provider;
use crate::scopes::{Exposed, Scope};
use crate::shape::{Component, Request, Shape};
use crate::wrapper::Wrapped;

/// Bindings and settings shared by all clones of an [Injector]
pub(crate) struct Core {
    bindings: Bindings,
    implicit: TypeMap,
    config: Config,
}

/// Dependency injection registry.
///
/// Cloning is cheap: clones share the bindings and the state of their scopes.
#[derive(Clone)]
pub struct Injector {
    core: Arc<Core>,
}

impl Injector {
    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::default()
    }

    /// Obtain an instance in the requested shape.
    ///
    /// Return an error if the request cannot be satisfied by the bindings
    pub fn create<R: Request>(&self) -> Result<R, InjectError> {
        self.provide_with(self.core.config.provider(), &Args::default())
    }

    /// Same as [create](Self::create), with extra bindings consulted before the injector's own
    pub fn create_with<R: Request>(&self, args: &Args) -> Result<R, InjectError> {
        self.provide_with(self.core.config.provider(), args)
    }

    /// Same as [create](Self::create), announcing fresh instances to the given provider
    pub fn provide<R: Request>(&self, provider: &dyn Provider) -> Result<R, InjectError> {
        self.provide_with(provider, &Args::default())
    }

    pub fn provide_with<R: Request>(
        &self,
        provider: &dyn Provider,
        args: &Args,
    ) -> Result<R, InjectError> {
        let mut cx = Context {
            core: &self.core,
            args: &args.bindings,
            provider,
            stack: Vec::new(),
        };
        cx.create::<R>()
    }

    /// Broadcast an action to every binding; scopes without interest in it ignore it
    pub fn call<A: Any>(&self, action: &A) {
        tracing::debug!(action = std::any::type_name::<A>(), "broadcasting action");
        self.core.bindings.call(action);
    }

    pub fn config(&self) -> &Config {
        &self.core.config
    }

    pub fn bindings(&self) -> &Bindings {
        &self.core.bindings
    }

    pub(crate) fn core(&self) -> &Arc<Core> {
        &self.core
    }
}

/// A reusable set of bindings
pub trait Module {
    fn configure(&self, builder: InjectorBuilder) -> InjectorBuilder;
}

/// Collect the bindings of an [Injector]
#[derive(Default)]
pub struct InjectorBuilder {
    bindings: Bindings,
    config: Config,
}

impl InjectorBuilder {
    pub fn bind<S, E, G, N>(mut self, dependency: Dependency<S, E, G, N>) -> Self
    where
        S: Scope<E, G>,
        E: ?Sized + 'static,
        G: ?Sized + 'static,
        N: 'static,
    {
        self.bindings.push(dependency.into_entry());
        self
    }

    /// Bind a value to its own type
    pub fn arg<V: Clone + Component>(self, value: V) -> Self {
        self.bind(bind::<V>().to(value))
    }

    /// Re-derive every binding of another injector.
    ///
    /// The re-derived bindings resolve their constructor parameters in `injector`.
    /// Inherited scopes share their state with it, the others start afresh.
    pub fn install(mut self, injector: &Injector) -> Self {
        for entry in injector.core.bindings.forward(&injector.core) {
            self.bindings.push(entry);
        }
        self
    }

    pub fn module(self, module: &impl Module) -> Self {
        module.configure(self)
    }

    /// Publish the binding of `E` from another injector
    pub fn expose<E: ?Sized + Component>(self, source: &Injector) -> Self {
        self.bind(bind::<E>().in_scope(Exposed::new(source)))
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Injector {
        tracing::debug!(
            bindings = self.bindings.len(),
            config = ?self.config,
            "injector built"
        );
        Injector {
            core: Arc::new(Core {
                bindings: self.bindings,
                implicit: TypeMap::default(),
                config: self.config,
            }),
        }
    }
}

/// Extra bindings for a single request
#[derive(Default)]
pub struct Args {
    bindings: Bindings,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value to its own type
    pub fn value<V: Clone + Component>(self, value: V) -> Self {
        self.with(bind::<V>().to(value))
    }

    pub fn with<S, E, G, N>(mut self, dependency: Dependency<S, E, G, N>) -> Self
    where
        S: Scope<E, G>,
        E: ?Sized + 'static,
        G: ?Sized + 'static,
        N: 'static,
    {
        self.bindings.push(dependency.into_entry());
        self
    }
}

/// Create an [Injector] from a list of bindings
#[macro_export]
macro_rules! make_injector {
    ($($dependency:expr),* $(,)?) => {
        $crate::Injector::builder()$(.bind($dependency))*.build()
    };
}

/// A binding being resolved, identified by its address: the same binding reached through
/// several injectors (request arguments, installed bindings) is still one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    binding: *const (),
    key: BindingKey,
}

/// State of one resolution: the injector being used, the request-level arguments, the provider
/// and the bindings currently being resolved
pub struct Context<'a> {
    core: &'a Core,
    args: &'a Bindings,
    provider: &'a dyn Provider,
    stack: Vec<Frame>,
}

impl<'a> Context<'a> {
    /// Resolve a dependency in the requested shape
    pub fn create<R: Request>(&mut self) -> Result<R, InjectError> {
        match self.produce::<R::Plain, R::Name>(R::SHAPE) {
            Ok(wrapped) => R::adapt(wrapped),
            Err(error) => R::absent(error),
        }
    }

    /// Whether [create](Self::create) can find and satisfy a binding for the request
    pub fn resolvable<R: Request>(&mut self) -> bool {
        self.satisfiable::<R::Plain, R::Name>(R::SHAPE)
    }

    pub fn config(&self) -> &Config {
        &self.core.config
    }

    pub(crate) fn produce<E: ?Sized + Component, N: 'static>(
        &mut self,
        shape: Shape,
    ) -> Result<Wrapped<E>, InjectError> {
        let key = BindingKey::of::<E, N>();
        tracing::trace!(key = %key, shape = %shape, "resolving");
        let binding = self.lookup::<E>(&key).ok_or_else(|| InjectError::Unbound {
            key: key.to_string(),
        })?;
        self.guarded(key, &*binding, |cx| binding.create(shape, cx))
    }

    pub(crate) fn satisfiable<E: ?Sized + Component, N: 'static>(&mut self, shape: Shape) -> bool {
        let key = BindingKey::of::<E, N>();
        let Some(binding) = self.lookup::<E>(&key) else {
            return false;
        };
        self.guarded(key, &*binding, |cx| Ok(binding.resolvable(shape, cx)))
            .unwrap_or(false)
    }

    /// Run `f` with `binding` marked as being resolved for `key`
    pub(crate) fn guarded<B: ?Sized, T>(
        &mut self,
        key: BindingKey,
        binding: &B,
        f: impl FnOnce(&mut Self) -> Result<T, InjectError>,
    ) -> Result<T, InjectError> {
        self.enter(Frame {
            binding: (binding as *const B).cast::<()>(),
            key,
        })?;
        let result = f(self);
        self.stack.pop();
        result
    }

    /// Build an instance of `G` with the constructor selected for the current bindings
    pub(crate) fn construct<G: Injectable>(&mut self) -> Result<G, InjectError> {
        let limit = self.core.config.ctor_limit();
        let ctor = G::signature()
            .select(self, limit)
            .ok_or(InjectError::NotConstructible {
                type_name: std::any::type_name::<G>(),
                limit,
            })?;
        tracing::debug!(
            given = std::any::type_name::<G>(),
            arity = ctor.arity(),
            "constructor selected"
        );
        ctor.build(self)
    }

    pub(crate) fn constructible<G: Injectable>(&mut self) -> bool {
        let limit = self.core.config.ctor_limit();
        G::signature().constructible(self, limit)
    }

    /// Ask the provider for room for one `G`, once its constructor arguments are resolved
    pub(crate) fn allocate<G: 'static>(&self) -> Result<(), InjectError> {
        let info = TypeInfo::of::<G>();
        let layout = std::alloc::Layout::new::<G>();
        self.provider
            .allocate(&info, layout)
            .map_err(|_| InjectError::Allocation {
                type_name: info.type_name,
                size: layout.size(),
            })
    }

    /// Run `f` against another injector, keeping the resolution stack
    pub(crate) fn rebase<T>(&mut self, core: &Core, f: impl FnOnce(&mut Context<'_>) -> T) -> T {
        let mut rebased = Context {
            core,
            args: self.args,
            provider: self.provider,
            stack: mem::take(&mut self.stack),
        };
        let result = f(&mut rebased);
        self.stack = rebased.stack;
        result
    }

    /// Explicit binding from the request arguments or the pool, else the implicit self-binding
    fn lookup<E: ?Sized + Component>(&self, key: &BindingKey) -> Option<Arc<dyn Binding<E>>> {
        self.args
            .get::<E>(key)
            .or_else(|| self.core.bindings.get::<E>(key))
            .or_else(|| {
                if key.is_named() {
                    None
                } else {
                    self.core.implicit.get_or_insert::<E>(key)
                }
            })
    }

    fn enter(&mut self, frame: Frame) -> Result<(), InjectError> {
        if let Some(start) = self.stack.iter().position(|f| f.binding == frame.binding) {
            let mut keys: Vec<String> = self.stack[start..]
                .iter()
                .map(|f| f.key.to_string())
                .collect();
            // forwarded bindings push a second frame under the same key
            keys.dedup();
            keys.push(frame.key.to_string());
            let path = keys.join(" -> ");
            tracing::debug!(path = %path, "cyclic resolution");
            return Err(InjectError::CyclicResolution { path });
        }
        self.stack.push(frame);
        Ok(())
    }
}
