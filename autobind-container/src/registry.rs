//! Registration registry — what a container has been told.
//!
//! Maps each contract to the ordered sequence of registrations filed
//! under it, and keeps the global order for introspection. Order is
//! significant: decorators apply in the order they were registered.

use std::collections::HashMap;

use tracing::debug;

use crate::contract::{FactoryFn, RegisteredType, RegistrationKind};
use crate::key::TypeKey;

/// One stored registration.
#[derive(Clone)]
pub(crate) struct Registration {
    pub registered: RegisteredType,
    pub factory: Option<FactoryFn>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("registered", &self.registered)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

/// Stores registrations in arrival order.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    registrations: Vec<Registration>,
    by_plugin: HashMap<TypeKey, Vec<usize>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a registration. Repeated contracts are kept: several
    /// implementations may be filed under one contract.
    pub fn register(&mut self, registered: RegisteredType, factory: Option<FactoryFn>) {
        debug!(
            plugin = %registered.plugin,
            kind = ?registered.kind,
            implementation = ?registered.implementation,
            lifecycle = ?registered.lifecycle,
            "Registered"
        );

        self.by_plugin
            .entry(registered.plugin)
            .or_default()
            .push(self.registrations.len());
        self.registrations.push(Registration { registered, factory });
    }

    /// Registrations filed under `plugin`, in order.
    pub fn entries_for(&self, plugin: &TypeKey) -> Vec<&Registration> {
        self.by_plugin
            .get(plugin)
            .map(|indices| indices.iter().map(|&i| &self.registrations[i]).collect())
            .unwrap_or_default()
    }

    /// Returns `true` if `plugin` can be resolved: it has a concrete or
    /// factory registration. Decorators alone do not count.
    pub fn is_bound(&self, plugin: &TypeKey) -> bool {
        self.entries_for(plugin).iter().any(|registration| {
            matches!(
                registration.registered.kind,
                RegistrationKind::Concrete | RegistrationKind::Factory
            )
        })
    }

    /// Latest factory registered for `plugin`.
    pub fn factory(&self, plugin: &TypeKey) -> Option<FactoryFn> {
        self.entries_for(plugin)
            .iter()
            .rev()
            .find_map(|registration| registration.factory.clone())
    }

    /// All registrations, in order.
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.iter()
    }

    /// Returns the number of registrations.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
