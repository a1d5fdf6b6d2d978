//! Dependency injection with bindings checked by the type system.
//!
//! # Simple use case
//!
//! ```
//! # use std::sync::Arc;
//! # use musubi::*;
//! // Define traits and implementors
//! trait Shape: Send + Sync {
//!     fn area(&self) -> f64;
//! }
//!
//! struct Circle {
//!     radius: f64,
//! }
//!
//! impl Circle {
//!     fn new(radius: f64) -> Self {
//!         Self { radius }
//!     }
//! }
//!
//! impl Shape for Circle {
//!     fn area(&self) -> f64 {
//!         std::f64::consts::PI * self.radius * self.radius
//!     }
//! }
//!
//! // Declare how to construct the implementor and what it implements
//! injectable!(Circle => Circle::new);
//! interface!(dyn Shape => Circle);
//!
//! # fn main() -> Result<(), InjectError> {
//! // Create and use an injector with our bindings
//! let injector = make_injector!(
//!     bind::<dyn Shape>().to_type::<Circle>().in_scope(Singleton),
//!     bind::<f64>().to(5.0_f64),
//! );
//! let a: Arc<dyn Shape> = injector.create()?;
//! let b: Arc<dyn Shape> = injector.create()?;
//! assert!(Arc::ptr_eq(&a, &b));
//! assert_eq!(a.area(), std::f64::consts::PI * 5.0 * 5.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Mechanism
//!
//! A binding maps a key, the pair (expected type, name), to a scope and a given type.
//! Requesting a type goes through the following steps:
//!
//! * The requested type is a [Request]: its shape (value, `Box`, [Ref], `Arc`, `Weak`,
//!   `&'static`, [Named], `Option`) determines the key to look up and how the result is adapted.
//! * The binding is found among the request arguments, then the injector's bindings, else the
//!   type binds to itself with the [Deduce] scope (concrete types only).
//! * The [Scope] of the binding decides whether a fresh instance is needed. Fresh instances are
//!   built through the constructor selected by [Injectable::signature], whose parameters are
//!   themselves requests, resolved recursively from left to right.
//! * The scope's [Wrapped] result is adapted to the requested shape.
//!
//! What can be checked by the compiler is: binding a trait object to a type that does not
//! implement it, requesting a trait object by value, using a constructor whose parameters are
//! not requests. Everything else (missing bindings, cycles, shapes a scope cannot serve) is
//! reported as an [InjectError].

mod config;
pub mod ctor;
mod dependency;
mod error;
mod inject;
mod named;
mod pool;
mod provider;
pub mod scopes;
mod shape;
mod wrapper;

pub use config::{Config, MAX_CTOR_ARITY};
pub use ctor::{Callable, Ctor, Injectable, Signature};
pub use dependency::{bind, Binding, Dependency};
pub use error::{AllocError, InjectError};
pub use inject::{Args, Context, Injector, InjectorBuilder, Module};
pub use named::{Named, NoName};
pub use pool::{BindingKey, Bindings, TypeInfo};
pub use provider::{Arena, Creator, Heap, Provider};
pub use scopes::{
    session, Deduce, Exposed, External, Scope, Session, SessionEntry, SessionExit, Shared,
    Singleton, Unique,
};
pub use shape::{Component, Deduced, Request, Shape};
pub use wrapper::{Ref, Upcast, Wrapped};

#[cfg(test)]
mod tests;
