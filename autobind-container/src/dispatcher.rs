//! Registration entry-point selection.
//!
//! Containers overload `register_instance`: one form takes no runtime
//! arguments, another takes a lifecycle. The dispatcher never trusts the
//! name alone. It keeps entry points whose type parameters are exactly
//! `plugin` and `concrete`, picks the one whose declared parameters fit
//! the call, binds the keys to the type parameters by name and invokes
//! it.

use std::any::type_name;
use std::fmt;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::contract::{
    Argument, CONCRETE, Entrypoint, IocContainer, PLUGIN, ParameterKind, REGISTER_INSTANCE,
};
use crate::error::{AutobindError, EntrypointError, Result};
use crate::key::TypeKey;
use crate::lifecycle::Lifecycle;

/// Runtime parameters a registration call carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallShape {
    /// No runtime arguments.
    Plain,
    /// A single lifecycle argument.
    WithLifecycle,
}

impl CallShape {
    /// Does an entry point declaring `parameters` accept this call?
    pub fn accepts(&self, parameters: &[ParameterKind]) -> bool {
        match self {
            CallShape::Plain => parameters.is_empty(),
            CallShape::WithLifecycle => parameters == [ParameterKind::Lifecycle],
        }
    }

    pub(crate) fn requirement(&self) -> &'static str {
        match self {
            CallShape::Plain => "taking no arguments",
            CallShape::WithLifecycle => "taking a single lifecycle argument",
        }
    }
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallShape::Plain => write!(f, "plain"),
            CallShape::WithLifecycle => write!(f, "lifecycle-qualified"),
        }
    }
}

/// One binding the resolver asks the container for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RegistrationEntry {
    /// Contract to bind under
    pub plugin: TypeKey,
    /// Implementation to bind
    pub concrete: TypeKey,
    /// Requested lifecycle; `None` leaves it to the container's default
    pub lifecycle: Option<Lifecycle>,
}

impl RegistrationEntry {
    pub fn new(plugin: TypeKey, concrete: TypeKey, lifecycle: Option<Lifecycle>) -> Self {
        Self { plugin, concrete, lifecycle }
    }

    pub fn shape(&self) -> CallShape {
        match self.lifecycle {
            Some(_) => CallShape::WithLifecycle,
            None => CallShape::Plain,
        }
    }

    fn arguments(&self) -> Vec<Argument> {
        self.lifecycle.map(Argument::Lifecycle).into_iter().collect()
    }
}

impl fmt::Display for RegistrationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ← {}", self.plugin, self.concrete)?;
        if let Some(lifecycle) = self.lifecycle {
            write!(f, " ({lifecycle})")?;
        }
        Ok(())
    }
}

/// An entry whose entry point has already been selected.
pub struct PlannedRegistration<C> {
    entry: RegistrationEntry,
    entrypoint: Entrypoint<C>,
}

impl<C> PlannedRegistration<C> {
    pub fn entry(&self) -> &RegistrationEntry {
        &self.entry
    }

    /// Performs the registration.
    pub fn invoke(&self, container: &C) -> Result<()> {
        let types: Vec<TypeKey> = self
            .entrypoint
            .type_parameters
            .iter()
            .filter_map(|name| match *name {
                PLUGIN => Some(self.entry.plugin),
                CONCRETE => Some(self.entry.concrete),
                _ => None,
            })
            .collect();

        trace!(entry = %self.entry, ?types, "Invoking entrypoint");
        (self.entrypoint.invoke)(container, &types, &self.entry.arguments())
    }
}

impl<C> fmt::Debug for PlannedRegistration<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannedRegistration")
            .field("entry", &self.entry)
            .field("entrypoint", &self.entrypoint)
            .finish()
    }
}

/// Selects and invokes `register_instance` entry points.
///
/// # Examples
/// ```rust
/// use autobind_container::prelude::*;
///
/// trait IFoo {}
/// struct Foo;
///
/// let container = InMemoryContainer::new();
/// let dispatcher = RegistrationDispatcher::<InMemoryContainer>::new();
///
/// dispatcher
///     .register(&container, TypeKey::of::<dyn IFoo>(), TypeKey::of::<Foo>())
///     .unwrap();
/// assert_eq!(container.registered_types().len(), 1);
/// ```
pub struct RegistrationDispatcher<C> {
    entrypoints: Vec<Entrypoint<C>>,
}

impl<C: IocContainer> RegistrationDispatcher<C> {
    /// Uses the table `C` publishes.
    pub fn new() -> Self {
        Self::with_entrypoints(C::entrypoints())
    }
}

impl<C: IocContainer> Default for RegistrationDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> RegistrationDispatcher<C> {
    /// Uses an explicit entry-point table.
    pub fn with_entrypoints(entrypoints: Vec<Entrypoint<C>>) -> Self {
        Self { entrypoints }
    }

    /// Selects the single entry point able to perform `entry`.
    ///
    /// # Errors
    /// [`AutobindError::AmbiguousOrMissingEntrypoint`] unless exactly one
    /// entry point matches.
    pub fn select(&self, entry: &RegistrationEntry) -> Result<Entrypoint<C>> {
        let shape = entry.shape();
        let matching: Vec<&Entrypoint<C>> = self
            .entrypoints
            .iter()
            .filter(|entrypoint| entrypoint.name == REGISTER_INSTANCE)
            .filter(|entrypoint| has_type_parameters(entrypoint, &[PLUGIN, CONCRETE]))
            .filter(|entrypoint| shape.accepts(entrypoint.parameters))
            .collect();

        match matching.as_slice() {
            [entrypoint] => Ok(**entrypoint),
            _ => {
                warn!(
                    entry = %entry,
                    %shape,
                    matches = matching.len(),
                    "No single registration entrypoint for call shape"
                );
                Err(AutobindError::AmbiguousOrMissingEntrypoint(EntrypointError {
                    container: type_name::<C>(),
                    shape,
                    matches: matching.len(),
                    plugin: entry.plugin,
                    concrete: entry.concrete,
                }))
            }
        }
    }

    /// Selects the entry point for `entry` without invoking it.
    pub fn plan(&self, entry: RegistrationEntry) -> Result<PlannedRegistration<C>> {
        let entrypoint = self.select(&entry)?;
        Ok(PlannedRegistration { entry, entrypoint })
    }

    /// Binds `plugin` to `concrete` through the plain entry point.
    pub fn register(&self, container: &C, plugin: TypeKey, concrete: TypeKey) -> Result<RegistrationEntry> {
        self.dispatch(container, RegistrationEntry::new(plugin, concrete, None))
    }

    /// Binds `plugin` to `concrete` through the lifecycle entry point.
    pub fn register_with(
        &self,
        container: &C,
        plugin: TypeKey,
        concrete: TypeKey,
        lifecycle: Lifecycle,
    ) -> Result<RegistrationEntry> {
        self.dispatch(container, RegistrationEntry::new(plugin, concrete, Some(lifecycle)))
    }

    fn dispatch(&self, container: &C, entry: RegistrationEntry) -> Result<RegistrationEntry> {
        self.plan(entry)?.invoke(container)?;
        debug!(entry = %entry, "Dispatched registration");
        Ok(entry)
    }
}

/// Same parameter count, each expected name declared exactly once.
fn has_type_parameters<C>(entrypoint: &Entrypoint<C>, names: &[&str]) -> bool {
    let declared = entrypoint.type_parameters;
    declared.len() == names.len()
        && names
            .iter()
            .all(|name| declared.iter().filter(|parameter| *parameter == name).count() == 1)
}
