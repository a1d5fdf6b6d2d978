//! Bindings pool
//!
//! Bindings are stored in declaration order and indexed by their key, the pair
//! (expected type, name). A later declaration for the same key shadows the earlier one.
//! Each entry keeps the binding twice: once behind its expected type (for lookups, which
//! downcast through [Any]) and once behind an untyped face used to broadcast actions and to
//! re-derive the entry in another injector.

use std::any::{Any, TypeId};
use std::collections::hash_map::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::dependency::Binding;
use crate::inject::Core;
use crate::named::NoName;
use crate::shape::Component;

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// Key of a binding: expected type and name
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct BindingKey {
    pub expected: TypeInfo,
    pub name: TypeInfo,
}

impl BindingKey {
    pub fn of<E: ?Sized + 'static, N: 'static>() -> Self {
        Self {
            expected: TypeInfo::of::<E>(),
            name: TypeInfo::of::<N>(),
        }
    }

    pub fn is_named(&self) -> bool {
        self.name.type_id != TypeId::of::<NoName>()
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_named() {
            write!(f, "{} named {}", self.expected, self.name)
        } else {
            write!(f, "{}", self.expected)
        }
    }
}

/// Untyped face of a pooled binding
pub(crate) trait Entry: Send + Sync {
    /// Deliver an action to the scope, which ignores the ones it has no interest in
    fn call(&self, action: &dyn Any);

    /// Re-derive this binding for an injector composed from `source`
    fn forward(self: Arc<Self>, source: &Arc<Core>) -> PoolEntry;
}

pub(crate) struct PoolEntry {
    key: BindingKey,
    /// `Arc<dyn Binding<E>>` where `E` is the expected type of the key
    typed: Box<dyn Any + Send + Sync>,
    entry: Arc<dyn Entry>,
}

impl PoolEntry {
    pub(crate) fn new<E, B>(key: BindingKey, binding: Arc<B>) -> Self
    where
        E: ?Sized + 'static,
        B: Binding<E> + Entry + 'static,
    {
        let typed: Arc<dyn Binding<E>> = binding.clone();
        Self {
            key,
            typed: Box::new(typed),
            entry: binding,
        }
    }

    pub(crate) fn key(&self) -> BindingKey {
        self.key
    }
}

/// Ordered, keyed collection of bindings
#[derive(Default)]
pub struct Bindings {
    entries: Vec<PoolEntry>,
    index: HashMap<BindingKey, usize>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: PoolEntry) {
        let key = entry.key();
        if self.index.insert(key, self.entries.len()).is_some() {
            tracing::debug!(key = %key, "binding shadows an earlier declaration");
        } else {
            tracing::debug!(key = %key, "binding registered");
        }
        self.entries.push(entry);
    }

    /// Binding currently registered for the key
    pub fn get<E: ?Sized + 'static>(&self, key: &BindingKey) -> Option<Arc<dyn Binding<E>>> {
        let position = *self.index.get(key)?;
        self.entries[position]
            .typed
            .downcast_ref::<Arc<dyn Binding<E>>>()
            .cloned()
    }

    pub fn contains(&self, key: &BindingKey) -> bool {
        self.index.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Keys in declaration order, shadowed declarations excluded
    pub fn keys(&self) -> impl Iterator<Item = BindingKey> + '_ {
        self.active().map(PoolEntry::key)
    }

    fn active(&self) -> impl Iterator<Item = &PoolEntry> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(position, entry)| self.index.get(&entry.key) == Some(position))
            .map(|(_, entry)| entry)
    }

    pub(crate) fn call(&self, action: &dyn Any) {
        for entry in self.active() {
            entry.entry.call(action);
        }
    }

    /// Forwarding entries for every active binding, calling back into `source`
    pub(crate) fn forward(&self, source: &Arc<Core>) -> Vec<PoolEntry> {
        self.active()
            .map(|entry| entry.entry.clone().forward(source))
            .collect()
    }
}

/// Lazily created self-bindings of types requested without an explicit binding
#[derive(Default)]
pub(crate) struct TypeMap(Mutex<HashMap<BindingKey, Box<dyn Any + Send + Sync>>>);

impl TypeMap {
    /// Retrieve the self-binding for the key, creating it on first use
    pub(crate) fn get_or_insert<E: ?Sized + Component>(
        &self,
        key: &BindingKey,
    ) -> Option<Arc<dyn Binding<E>>> {
        let mut map = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(stored) = map.get(key) {
            return stored.downcast_ref::<Arc<dyn Binding<E>>>().cloned();
        }
        let binding = E::self_binding()?;
        tracing::debug!(key = %key, "implicit self-binding");
        map.insert(*key, Box::new(binding.clone()));
        Some(binding)
    }
}
