//! # InMemoryContainer — a recording container
//!
//! The resolver only talks to [`IocContainer`]. `InMemoryContainer` is a
//! complete implementation of that contract that records every
//! registration in an ordered registry instead of building objects. It
//! is what the tests and the demo register into, and a reference for
//! adapting a real container.
//!
//! # Examples
//! ```rust
//! use autobind_container::prelude::*;
//!
//! trait Logger {}
//! struct ConsoleLogger;
//!
//! let container = InMemoryContainer::builder()
//!     .default_lifecycle(Lifecycle::Transient)
//!     .build();
//!
//! container.bind::<dyn Logger, ConsoleLogger>().unwrap();
//! assert_eq!(container.registered_types()[0].lifecycle, Some(Lifecycle::Transient));
//! ```

use std::fmt;

use autobind_support::rendering::render_binding;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::contract::{FactoryFn, IocContainer, RegisteredType, RegistrationKind};
use crate::error::{AutobindError, Result};
use crate::key::TypeKey;
use crate::lifecycle::Lifecycle;
use crate::registry::Registry;

// ============================================================
// InMemoryContainerBuilder
// ============================================================

/// Configures an [`InMemoryContainer`].
#[derive(Debug, Default)]
pub struct InMemoryContainerBuilder {
    default_lifecycle: Lifecycle,
}

impl InMemoryContainerBuilder {
    /// Lifecycle used when a registration does not ask for one.
    pub fn default_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.default_lifecycle = lifecycle;
        self
    }

    pub fn build(self) -> InMemoryContainer {
        debug!(default_lifecycle = %self.default_lifecycle, "Creating in-memory container");
        InMemoryContainer {
            registry: RwLock::new(Registry::new()),
            default_lifecycle: self.default_lifecycle,
        }
    }
}

// ═══════════════════════════════════════════
// InMemoryContainer
// ═══════════════════════════════════════════

/// Thread-safe container that records registrations.
pub struct InMemoryContainer {
    registry: RwLock<Registry>,
    default_lifecycle: Lifecycle,
}

impl InMemoryContainer {
    /// Container with the default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new builder.
    pub fn builder() -> InMemoryContainerBuilder {
        InMemoryContainerBuilder::default()
    }

    pub fn default_lifecycle(&self) -> Lifecycle {
        self.default_lifecycle
    }

    /// Registrations filed under `plugin`, in order.
    pub fn entries_for(&self, plugin: &TypeKey) -> Vec<RegisteredType> {
        self.registry
            .read()
            .entries_for(plugin)
            .into_iter()
            .map(|registration| registration.registered.clone())
            .collect()
    }

    /// Latest factory bound to `plugin`.
    pub fn factory(&self, plugin: &TypeKey) -> Option<FactoryFn> {
        self.registry.read().factory(plugin)
    }

    /// Returns the number of registrations.
    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }

    fn record(&self, registered: RegisteredType, factory: Option<FactoryFn>) -> Result<()> {
        self.registry.write().register(registered, factory);
        Ok(())
    }
}

impl Default for InMemoryContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl IocContainer for InMemoryContainer {
    fn register_factory(&self, plugin: TypeKey, factory: FactoryFn) -> Result<()> {
        self.record(
            RegisteredType {
                plugin,
                kind: RegistrationKind::Factory,
                implementation: None,
                lifecycle: Some(self.default_lifecycle),
            },
            Some(factory),
        )
    }

    fn register_instance(&self, plugin: TypeKey, concrete: TypeKey) -> Result<()> {
        self.register_instance_with(plugin, concrete, self.default_lifecycle)
    }

    fn register_instance_with(
        &self,
        plugin: TypeKey,
        concrete: TypeKey,
        lifecycle: Lifecycle,
    ) -> Result<()> {
        self.record(
            RegisteredType {
                plugin,
                kind: RegistrationKind::Concrete,
                implementation: Some(concrete),
                lifecycle: Some(lifecycle),
            },
            None,
        )
    }

    fn register_decorator(&self, decorator: TypeKey, component: TypeKey) -> Result<()> {
        self.record(
            RegisteredType {
                plugin: component,
                kind: RegistrationKind::Decorator,
                implementation: Some(decorator),
                lifecycle: None,
            },
            None,
        )
    }

    fn register_open_type_decorator(&self, open: TypeKey, open_decorator: TypeKey) -> Result<()> {
        self.record(
            RegisteredType {
                plugin: open,
                kind: RegistrationKind::OpenTypeDecorator,
                implementation: Some(open_decorator),
                lifecycle: None,
            },
            None,
        )
    }

    fn registered_types(&self) -> Vec<RegisteredType> {
        self.registry
            .read()
            .iter()
            .map(|registration| registration.registered.clone())
            .collect()
    }

    /// Checks that every decorator wraps a bound contract.
    ///
    /// Open-type decorators are not checked: which closed contracts they
    /// cover is only known at resolve time.
    fn verify(&self) -> Result<()> {
        let registry = self.registry.read();

        for registration in registry.iter() {
            let registered = &registration.registered;
            if registered.kind != RegistrationKind::Decorator {
                continue;
            }
            if !registry.is_bound(&registered.plugin) {
                let decorator = registered.implementation.unwrap_or(registered.plugin);
                warn!(decorator = %decorator, component = %registered.plugin, "Decorator without component");
                return Err(AutobindError::UndecoratedComponent {
                    decorator,
                    component: registered.plugin,
                });
            }
        }

        info!(registrations = registry.len(), "Container verified ✓");
        Ok(())
    }

    fn describe(&self) -> String {
        let registry = self.registry.read();
        let mut out = format!("InMemoryContainer: {} registration(s)", registry.len());

        for registration in registry.iter() {
            let registered = &registration.registered;
            let implementation = registered
                .implementation
                .map(|key| key.type_name())
                .unwrap_or("<factory>");
            let annotation = match (registered.kind, registered.lifecycle) {
                (RegistrationKind::Decorator, _) => "decorator".to_string(),
                (RegistrationKind::OpenTypeDecorator, _) => "open decorator".to_string(),
                (_, Some(lifecycle)) => lifecycle.to_string(),
                (_, None) => "-".to_string(),
            };

            out.push_str("\n  ");
            out.push_str(&render_binding(
                registered.plugin.type_name(),
                implementation,
                &annotation,
            ));
        }

        out
    }
}

impl fmt::Debug for InMemoryContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryContainer")
            .field("registered", &self.len())
            .field("default_lifecycle", &self.default_lifecycle)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{InMemoryContainer, InMemoryContainerBuilder};
    pub use crate::batch::{AutoRegistration, FilteredRegistration, RegistrationReport};
    pub use crate::contract::{IocContainer, IocContainerExt, RegisteredType, RegistrationKind};
    pub use crate::descriptor::TypeDescriptor;
    pub use crate::dispatcher::{RegistrationDispatcher, RegistrationEntry};
    pub use crate::error::{AutobindError, Result};
    pub use crate::key::TypeKey;
    pub use crate::lifecycle::Lifecycle;
    pub use crate::universe::TypeUniverse;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::IocContainerExt;

    trait Greeter: Send + Sync {}
    struct English;
    struct LoudGreeter;
    struct HandlerDef;
    struct LoggingHandler;

    #[test]
    fn records_in_registration_order() {
        let container = InMemoryContainer::new();
        container.bind::<English, English>().unwrap();
        container.bind::<dyn Greeter, English>().unwrap();

        let registered = container.registered_types();
        assert_eq!(registered.len(), 2);
        assert_eq!(registered[0].plugin, TypeKey::of::<English>());
        assert_eq!(registered[1].plugin, TypeKey::of::<dyn Greeter>());
    }

    #[test]
    fn configured_default_lifecycle() {
        let container = InMemoryContainer::builder()
            .default_lifecycle(Lifecycle::Scoped)
            .build();
        container.bind::<English, English>().unwrap();
        assert_eq!(container.registered_types()[0].lifecycle, Some(Lifecycle::Scoped));
    }

    #[test]
    fn factory_is_kept() {
        let container = InMemoryContainer::new();
        container
            .bind_factory::<String, _, _>(|| String::from("hello"))
            .unwrap();

        let factory = container.factory(&TypeKey::of::<String>()).unwrap();
        let value = factory().downcast::<String>().unwrap();
        assert_eq!(*value, "hello");
        assert_eq!(container.registered_types()[0].kind, RegistrationKind::Factory);
    }

    #[test]
    fn decorators_filed_under_component() {
        let container = InMemoryContainer::new();
        container.bind::<dyn Greeter, English>().unwrap();
        container.decorate::<LoudGreeter, dyn Greeter>().unwrap();

        let entries = container.entries_for(&TypeKey::of::<dyn Greeter>());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].kind, RegistrationKind::Decorator);
        assert_eq!(entries[1].implementation, Some(TypeKey::of::<LoudGreeter>()));
        assert!(container.verify().is_ok());
    }

    #[test]
    fn verify_rejects_decorator_without_component() {
        let container = InMemoryContainer::new();
        container.decorate::<LoudGreeter, dyn Greeter>().unwrap();

        match container.verify().unwrap_err() {
            AutobindError::UndecoratedComponent { decorator, component } => {
                assert_eq!(decorator, TypeKey::of::<LoudGreeter>());
                assert_eq!(component, TypeKey::of::<dyn Greeter>());
            }
            other => panic!("Expected UndecoratedComponent, got: {other:?}"),
        }
    }

    #[test]
    fn open_decorator_recorded() {
        let container = InMemoryContainer::new();
        container
            .register_open_type_decorator(TypeKey::of::<HandlerDef>(), TypeKey::of::<LoggingHandler>())
            .unwrap();

        let registered = container.registered_types();
        assert_eq!(registered[0].kind, RegistrationKind::OpenTypeDecorator);
        assert!(container.verify().is_ok());
    }

    #[test]
    fn describe_lists_registrations() {
        let container = InMemoryContainer::new();
        container.bind::<dyn Greeter, English>().unwrap();
        container.decorate::<LoudGreeter, dyn Greeter>().unwrap();

        let text = container.describe();
        assert!(text.starts_with("InMemoryContainer: 2 registration(s)"));
        assert!(text.contains("dyn Greeter ← English [Singleton]"));
        assert!(text.contains("dyn Greeter ← LoudGreeter [decorator]"));
    }

    #[test]
    fn registrations_serialize_with_type_names() {
        let container = InMemoryContainer::new();
        container.bind_with::<dyn Greeter, English>(Lifecycle::Transient).unwrap();

        let json = serde_json::to_value(container.registered_types()).unwrap();
        let first = &json[0];
        assert!(first["plugin"].as_str().unwrap().contains("Greeter"));
        assert!(first["implementation"].as_str().unwrap().contains("English"));
        assert_eq!(first["kind"], "Concrete");
        assert_eq!(first["lifecycle"], "Transient");
    }

    #[test]
    fn debug_display() {
        let container = InMemoryContainer::new();
        container.bind::<English, English>().unwrap();

        let debug = format!("{container:?}");
        assert!(debug.contains("InMemoryContainer"));
        assert!(debug.contains("1"));
    }
}
