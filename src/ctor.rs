//! Constructor-signature inference
//!
//! A concrete type names its constructor functions; their parameter lists are inferred from
//! the function signatures through [Callable], which is implemented for all functions with up
//! to [MAX_CTOR_ARITY](crate::MAX_CTOR_ARITY) arguments using a tuple to wrap them all in a
//! single type. Every parameter type must be a [Request].
//!
//! inspired by https://nickbryan.co.uk/software/using-a-type-map-for-dependency-injection-in-rust/

use crate::error::InjectError;
use crate::inject::Context;
use crate::shape::Request;

/// A Callable has a ```call``` function with a single argument and a single return type.
pub trait Callable<Args, Ret> {
    fn call(&self, args: Args) -> Ret;
}

/// Tuple of constructor parameters, resolved left to right
pub trait Arguments: Sized {
    const ARITY: usize;

    /// Whether every parameter has a binding that can be satisfied
    fn resolvable(cx: &mut Context<'_>) -> bool;

    fn resolve(cx: &mut Context<'_>) -> Result<Self, InjectError>;
}

macro_rules! callable_tuple ({ $($param:ident)* } => {
    impl<Func, Ret, $($param,)*> Callable<($($param,)*), Ret> for Func
    where
        Func: Fn($($param),*) -> Ret,
    {
        #[inline]
        #[allow(non_snake_case)]
        fn call(&self, ($($param,)*): ($($param,)*)) -> Ret {
            (self)($($param,)*)
        }
    }

    #[allow(clippy::unused_unit)]
    impl<$($param: Request,)*> Arguments for ($($param,)*) {
        const ARITY: usize = 0 $(+ count_one!($param))*;

        #[inline]
        fn resolvable(_cx: &mut Context<'_>) -> bool {
            true $(&& _cx.resolvable::<$param>())*
        }

        #[inline]
        fn resolve(_cx: &mut Context<'_>) -> Result<Self, InjectError> {
            Ok(($(_cx.create::<$param>()?,)*))
        }
    }
});

macro_rules! count_one {
    ($param:ident) => {
        1
    };
}

callable_tuple! {}
callable_tuple! { A }
callable_tuple! { A B }
callable_tuple! { A B C }
callable_tuple! { A B C D }
callable_tuple! { A B C D E }
callable_tuple! { A B C D E F }
callable_tuple! { A B C D E F G }
callable_tuple! { A B C D E F G H }
callable_tuple! { A B C D E F G H I }
callable_tuple! { A B C D E F G H I J }

/// One constructor of `G`
pub struct Ctor<G> {
    arity: usize,
    resolvable: fn(&mut Context<'_>) -> bool,
    build: fn(&mut Context<'_>) -> Result<G, InjectError>,
}

impl<G> Clone for Ctor<G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G> Copy for Ctor<G> {}

impl<G> Ctor<G> {
    pub fn new(
        arity: usize,
        resolvable: fn(&mut Context<'_>) -> bool,
        build: fn(&mut Context<'_>) -> Result<G, InjectError>,
    ) -> Self {
        Self {
            arity,
            resolvable,
            build,
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn resolvable(&self, cx: &mut Context<'_>) -> bool {
        (self.resolvable)(cx)
    }

    pub fn build(&self, cx: &mut Context<'_>) -> Result<G, InjectError> {
        (self.build)(cx)
    }
}

/// The constructors an injector may use for a type
pub enum Signature<G> {
    /// Injection signature declared explicitly, used verbatim
    Explicit(Ctor<G>),
    /// Candidates; the one with the most parameters that can all be satisfied wins
    Probe(Vec<Ctor<G>>),
}

impl<G> Signature<G> {
    /// Pick the constructor to use under the given arity limit
    pub fn select(&self, cx: &mut Context<'_>, limit: usize) -> Option<Ctor<G>> {
        match self {
            Signature::Explicit(ctor) => (ctor.arity <= limit).then_some(*ctor),
            Signature::Probe(candidates) => {
                let mut candidates: Vec<Ctor<G>> = candidates
                    .iter()
                    .filter(|ctor| ctor.arity <= limit)
                    .copied()
                    .collect();
                candidates.sort_by(|a, b| b.arity.cmp(&a.arity));
                candidates.into_iter().find(|ctor| ctor.resolvable(cx))
            }
        }
    }

    /// Whether some constructor can be used
    pub fn constructible(&self, cx: &mut Context<'_>, limit: usize) -> bool {
        match self {
            Signature::Explicit(ctor) => ctor.arity <= limit && ctor.resolvable(cx),
            Signature::Probe(_) => self.select(cx, limit).is_some(),
        }
    }
}

/// A concrete type the injector knows how to construct
pub trait Injectable: Sized + Send + Sync + 'static {
    fn signature() -> Signature<Self>;
}

#[doc(hidden)]
pub fn arity_of<A: Arguments, F: Callable<A, G>, G>(_ctor: &F) -> usize {
    A::ARITY
}

#[doc(hidden)]
pub fn probe<A: Arguments, F: Callable<A, G>, G>(cx: &mut Context<'_>, _ctor: &F) -> bool {
    A::resolvable(cx)
}

/// Resolve the parameters of a constructor, then call it.
///
/// The provider is only consulted once every argument has been resolved.
#[doc(hidden)]
pub fn inject_and_call<A: Arguments, F: Callable<A, G>, G: 'static>(
    cx: &mut Context<'_>,
    ctor: &F,
) -> Result<G, InjectError> {
    let args = A::resolve(cx)?;
    cx.allocate::<G>()?;
    Ok(ctor.call(args))
}

#[doc(hidden)]
#[macro_export]
macro_rules! __ctor {
    ($ctor:expr) => {
        $crate::ctor::Ctor::new(
            $crate::ctor::arity_of::<_, _, Self>(&$ctor),
            |cx| $crate::ctor::probe::<_, _, Self>(cx, &$ctor),
            |cx| $crate::ctor::inject_and_call::<_, _, Self>(cx, &$ctor),
        )
    };
}

/// Declare how the injector constructs a concrete type.
///
/// * `injectable!(T)` constructs through [Default].
/// * `injectable!(T => T::new)` uses `T::new` verbatim as the injection signature.
/// * `injectable!(T => [T::new, T::with_cache])` lets the injector pick the candidate with the
///   most parameters that can all be satisfied by the current bindings.
///
/// The type can then be requested by value, bound to itself implicitly, and used as the given
/// type of other bindings.
#[macro_export]
macro_rules! injectable {
    (@impl $Type:ty, $signature:expr) => {
        impl $crate::ctor::Injectable for $Type {
            fn signature() -> $crate::ctor::Signature<Self> {
                $signature
            }
        }

        impl $crate::Component for $Type {
            fn self_binding() -> ::std::option::Option<::std::sync::Arc<dyn $crate::Binding<Self>>> {
                ::std::option::Option::Some($crate::bind::<$Type>().into_binding())
            }
        }

        impl $crate::Request for $Type {
            type Plain = $Type;
            type Name = $crate::NoName;
            const SHAPE: $crate::Shape = $crate::Shape::Value;

            fn adapt(wrapped: $crate::Wrapped<Self>) -> ::std::result::Result<Self, $crate::InjectError> {
                wrapped.into_value()
            }
        }
    };
    ($Type:ty) => {
        $crate::injectable!($Type => <$Type as ::std::default::Default>::default);
    };
    ($Type:ty => [$($ctor:expr),+ $(,)?]) => {
        $crate::injectable!(@impl $Type, $crate::ctor::Signature::Probe(::std::vec![$($crate::__ctor!($ctor)),+]));
    };
    ($Type:ty => $ctor:expr) => {
        $crate::injectable!(@impl $Type, $crate::ctor::Signature::Explicit($crate::__ctor!($ctor)));
    };
}
