//! # Batch registration
//!
//! [`AutoRegistration`] fixes the candidate scope (an explicit list, or
//! the types declared in a module), a filter narrows it to a
//! [`FilteredRegistration`], and a terminal policy registers what is
//! left:
//!
//! ```text
//! AutoRegistration::in_module(&container, &universe, "app::services")
//!     .that_implement_type::<dyn Handler>()
//!     .by_class_and_interface()?
//! ```
//!
//! Every filter starts from the eligible candidates: non-abstract,
//! closed classes. [`by_class_and_interface`](FilteredRegistration::by_class_and_interface)
//! binds each type to itself and then to its first directly declared
//! interface. Entry points are selected for the whole batch before the
//! first registration runs, so a container that cannot perform one of
//! them is left untouched.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::classifier::TypeClassifier;
use crate::contract::IocContainer;
use crate::dispatcher::{PlannedRegistration, RegistrationDispatcher, RegistrationEntry};
use crate::error::{AutobindError, Result};
use crate::interfaces::InterfaceSetResolver;
use crate::key::TypeKey;
use crate::lifecycle::Lifecycle;
use crate::open_generic::OpenGenericMatcher;
use crate::universe::TypeUniverse;

// ═══════════════════════════════════════════
// AutoRegistration
// ═══════════════════════════════════════════

/// Candidate scope for a batch registration.
pub struct AutoRegistration<'a, C: IocContainer> {
    container: &'a C,
    universe: &'a TypeUniverse,
    candidates: Vec<TypeKey>,
    dispatcher: RegistrationDispatcher<C>,
}

impl<'a, C: IocContainer> AutoRegistration<'a, C> {
    /// Scope over an explicit candidate list.
    pub fn new(container: &'a C, universe: &'a TypeUniverse, candidates: Vec<TypeKey>) -> Self {
        Self {
            container,
            universe,
            candidates,
            dispatcher: RegistrationDispatcher::new(),
        }
    }

    /// Scope over every type declared in `module` or its sub-modules.
    pub fn in_module(container: &'a C, universe: &'a TypeUniverse, module: &str) -> Self {
        let candidates = universe.types_in_module(module);
        debug!(module, candidates = candidates.len(), "Scoped batch to module");
        Self::new(container, universe, candidates)
    }

    /// Scope over the module that declares `T`.
    ///
    /// # Errors
    /// - [`AutobindError::UnknownType`] if `T` was never described
    /// - [`AutobindError::InvalidDeclaration`] if `T` was described
    ///   without a module
    pub fn in_module_of<T: ?Sized + 'static>(
        container: &'a C,
        universe: &'a TypeUniverse,
    ) -> Result<Self> {
        let key = TypeKey::of::<T>();
        universe.require(&key)?;

        let module = universe
            .module_of(&key)
            .ok_or_else(|| AutobindError::InvalidDeclaration {
                key,
                reason: "type was described without a module".to_string(),
            })?;

        Ok(Self::in_module(container, universe, module))
    }

    /// Replaces the dispatcher, e.g. to use a custom entry-point table.
    pub fn with_dispatcher(mut self, dispatcher: RegistrationDispatcher<C>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Every eligible candidate.
    pub fn all_types(self) -> FilteredRegistration<'a, C> {
        let types = self.eligible();
        self.narrow(types)
    }

    /// Eligible candidates implementing `T`.
    pub fn that_implement_type<T: ?Sized + 'static>(self) -> FilteredRegistration<'a, C> {
        self.that_implement(TypeKey::of::<T>())
    }

    /// Eligible candidates implementing `contract`, directly or through
    /// a base type.
    pub fn that_implement(self, contract: TypeKey) -> FilteredRegistration<'a, C> {
        let types = InterfaceSetResolver::new(self.universe).where_implements(&self.eligible(), &contract);
        self.narrow(types)
    }

    /// Eligible candidates implementing any instantiation of `open`.
    pub fn that_implement_open_type(self, open: TypeKey) -> FilteredRegistration<'a, C> {
        let types = OpenGenericMatcher::new(self.universe).where_implements_open_type(&self.eligible(), &open);
        self.narrow(types)
    }

    fn eligible(&self) -> Vec<TypeKey> {
        TypeClassifier::new(self.universe).filter_eligible(&self.candidates)
    }

    fn narrow(self, types: Vec<TypeKey>) -> FilteredRegistration<'a, C> {
        debug!(candidates = self.candidates.len(), selected = types.len(), "Filtered batch candidates");
        FilteredRegistration {
            container: self.container,
            universe: self.universe,
            types,
            dispatcher: self.dispatcher,
        }
    }
}

impl<C: IocContainer> fmt::Debug for AutoRegistration<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoRegistration")
            .field("candidates", &self.candidates)
            .finish()
    }
}

// ═══════════════════════════════════════════
// FilteredRegistration
// ═══════════════════════════════════════════

/// Filtered types, ready for a registration policy.
pub struct FilteredRegistration<'a, C: IocContainer> {
    container: &'a C,
    universe: &'a TypeUniverse,
    types: Vec<TypeKey>,
    dispatcher: RegistrationDispatcher<C>,
}

impl<C: IocContainer> FilteredRegistration<'_, C> {
    /// Types the policy will register, in order.
    pub fn types(&self) -> &[TypeKey] {
        &self.types
    }

    /// Binds every type to itself, then to its first directly declared
    /// interface, using the container's default lifecycle.
    ///
    /// # Errors
    /// [`AutobindError::AmbiguousOrMissingEntrypoint`] if the container
    /// cannot perform a plain registration; nothing is registered then.
    /// [`AutobindError::RegistrationFailed`] if the container rejects a
    /// registration; the remaining ones are not attempted.
    #[instrument(skip(self), name = "batch_register")]
    pub fn by_class_and_interface(&self) -> Result<RegistrationReport> {
        self.register_all(None)
    }

    /// Like [`by_class_and_interface`](Self::by_class_and_interface), with
    /// an explicit lifecycle for every binding.
    #[instrument(skip(self), name = "batch_register")]
    pub fn by_class_and_interface_with(&self, lifecycle: Lifecycle) -> Result<RegistrationReport> {
        self.register_all(Some(lifecycle))
    }

    fn register_all(&self, lifecycle: Option<Lifecycle>) -> Result<RegistrationReport> {
        let plan = self.plan(lifecycle)?;

        info!(types = self.types.len(), registrations = plan.len(), "Registering batch");

        let mut entries = Vec::with_capacity(plan.len());
        for planned in plan {
            let entry = planned.entry();
            if let Err(e) = planned.invoke(self.container) {
                warn!(entry = %entry, error = %e, registered = entries.len(), "Batch registration aborted");
                return Err(AutobindError::RegistrationFailed {
                    plugin: entry.plugin,
                    concrete: entry.concrete,
                    source: Box::new(e),
                });
            }
            debug!(entry = %entry, "Registered");
            entries.push(*entry);
        }

        info!(registered = entries.len(), "Batch registered ✓");
        Ok(RegistrationReport { entries })
    }

    fn plan(&self, lifecycle: Option<Lifecycle>) -> Result<Vec<PlannedRegistration<C>>> {
        let resolver = InterfaceSetResolver::new(self.universe);
        let mut plan = Vec::with_capacity(self.types.len() * 2);

        for concrete in &self.types {
            plan.push(self.dispatcher.plan(RegistrationEntry::new(*concrete, *concrete, lifecycle))?);

            if let Some(interface) = resolver.first_direct_interface(concrete) {
                plan.push(self.dispatcher.plan(RegistrationEntry::new(interface, *concrete, lifecycle))?);
            }
        }

        Ok(plan)
    }
}

impl<C: IocContainer> fmt::Debug for FilteredRegistration<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredRegistration")
            .field("types", &self.types)
            .finish()
    }
}

// ═══════════════════════════════════════════
// RegistrationReport
// ═══════════════════════════════════════════

/// Registrations performed by a batch, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationReport {
    entries: Vec<RegistrationEntry>,
}

impl RegistrationReport {
    pub fn entries(&self) -> &[RegistrationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for RegistrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} registration(s)", self.entries.len())?;
        for entry in &self.entries {
            write!(f, "\n  {entry}")?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::InMemoryContainer;
    use crate::contract::{Argument, ParameterKind, RegisteredType, invoke_register_instance, standard_entrypoints};
    use crate::descriptor::TypeDescriptor;

    trait IFoo {}
    trait IBar {}
    trait Handler<T> {}

    struct Foo;
    struct Bar;
    struct Empty;
    struct AbstractBase;
    struct HandlerDef;
    struct IntHandler;

    fn key<T: ?Sized + 'static>() -> TypeKey {
        TypeKey::of::<T>()
    }

    fn universe() -> TypeUniverse {
        TypeUniverse::builder()
            .describe_in("app::contracts", TypeDescriptor::interface::<dyn IFoo>())
            .describe_in("app::contracts", TypeDescriptor::interface::<dyn IBar>())
            .describe_in("app::contracts", TypeDescriptor::open_interface::<HandlerDef>(1))
            .describe_in(
                "app::contracts",
                TypeDescriptor::interface::<dyn Handler<i32>>().instantiates::<HandlerDef>([key::<i32>()]),
            )
            .describe_in("app::services", TypeDescriptor::class::<Foo>().implements::<dyn IFoo>())
            .describe_in(
                "app::services",
                TypeDescriptor::class::<Bar>().extends::<Foo>().implements::<dyn IBar>(),
            )
            .describe_in("app::services", TypeDescriptor::abstract_class::<AbstractBase>())
            .describe_in(
                "app::handlers",
                TypeDescriptor::class::<IntHandler>().implements::<dyn Handler<i32>>(),
            )
            .describe_in("app::misc", TypeDescriptor::class::<Empty>())
            .build()
            .unwrap()
    }

    fn concrete(plugin: TypeKey, implementation: TypeKey) -> (TypeKey, Option<TypeKey>) {
        (plugin, Some(implementation))
    }

    fn bindings(container: &InMemoryContainer) -> Vec<(TypeKey, Option<TypeKey>)> {
        container
            .registered_types()
            .into_iter()
            .map(|RegisteredType { plugin, implementation, .. }| (plugin, implementation))
            .collect()
    }

    #[test]
    fn binds_class_then_first_direct_interface() {
        let universe = universe();
        let container = InMemoryContainer::new();

        let report = AutoRegistration::new(&container, &universe, vec![key::<Foo>(), key::<Bar>()])
            .all_types()
            .by_class_and_interface()
            .unwrap();

        assert_eq!(report.len(), 4);
        assert_eq!(
            bindings(&container),
            vec![
                concrete(key::<Foo>(), key::<Foo>()),
                concrete(key::<dyn IFoo>(), key::<Foo>()),
                concrete(key::<Bar>(), key::<Bar>()),
                concrete(key::<dyn IBar>(), key::<Bar>()),
            ]
        );
    }

    #[test]
    fn type_without_interfaces_binds_to_itself() {
        let universe = universe();
        let container = InMemoryContainer::new();

        let report = AutoRegistration::new(&container, &universe, vec![key::<Empty>()])
            .all_types()
            .by_class_and_interface()
            .unwrap();

        assert_eq!(report.entries(), &[RegistrationEntry::new(key::<Empty>(), key::<Empty>(), None)]);
        assert_eq!(bindings(&container), vec![concrete(key::<Empty>(), key::<Empty>())]);
    }

    #[test]
    fn ineligible_candidates_are_skipped() {
        let universe = universe();
        let container = InMemoryContainer::new();

        let filtered = AutoRegistration::new(
            &container,
            &universe,
            vec![key::<dyn IFoo>(), key::<AbstractBase>(), key::<HandlerDef>(), key::<String>(), key::<Foo>()],
        )
        .all_types();

        assert_eq!(filtered.types(), &[key::<Foo>()]);
    }

    #[test]
    fn module_scope() {
        let universe = universe();
        let container = InMemoryContainer::new();

        let filtered = AutoRegistration::in_module(&container, &universe, "app::services").all_types();
        assert_eq!(filtered.types(), &[key::<Foo>(), key::<Bar>()]);

        let filtered = AutoRegistration::in_module_of::<IntHandler>(&container, &universe)
            .unwrap()
            .all_types();
        assert_eq!(filtered.types(), &[key::<IntHandler>()]);
    }

    #[test]
    fn module_of_undescribed_type_fails() {
        let universe = universe();
        let container = InMemoryContainer::new();

        match AutoRegistration::in_module_of::<String>(&container, &universe).unwrap_err() {
            AutobindError::UnknownType(e) => assert_eq!(e.requested, key::<String>()),
            other => panic!("Expected UnknownType, got: {other:?}"),
        }
    }

    #[test]
    fn module_of_type_without_module_fails() {
        let universe = TypeUniverse::builder()
            .describe(TypeDescriptor::class::<Foo>())
            .build()
            .unwrap();
        let container = InMemoryContainer::new();

        assert!(matches!(
            AutoRegistration::in_module_of::<Foo>(&container, &universe),
            Err(AutobindError::InvalidDeclaration { .. })
        ));
    }

    #[test]
    fn contract_filter_includes_inherited_implementations() {
        let universe = universe();
        let container = InMemoryContainer::new();

        let filtered = AutoRegistration::in_module(&container, &universe, "app")
            .that_implement_type::<dyn IFoo>();
        assert_eq!(filtered.types(), &[key::<Foo>(), key::<Bar>()]);

        let filtered = AutoRegistration::in_module(&container, &universe, "app").that_implement(key::<dyn IBar>());
        assert_eq!(filtered.types(), &[key::<Bar>()]);
    }

    #[test]
    fn open_type_filter() {
        let universe = universe();
        let container = InMemoryContainer::new();

        let report = AutoRegistration::in_module(&container, &universe, "app")
            .that_implement_open_type(key::<HandlerDef>())
            .by_class_and_interface()
            .unwrap();

        assert_eq!(
            bindings(&container),
            vec![
                concrete(key::<IntHandler>(), key::<IntHandler>()),
                concrete(key::<dyn Handler<i32>>(), key::<IntHandler>()),
            ]
        );
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn empty_filter_registers_nothing() {
        let universe = universe();
        let container = InMemoryContainer::new();

        let report = AutoRegistration::in_module(&container, &universe, "app::misc")
            .that_implement_type::<dyn IFoo>()
            .by_class_and_interface()
            .unwrap();

        assert!(report.is_empty());
        assert!(container.is_empty());
    }

    #[test]
    fn lifecycle_batch() {
        let universe = universe();
        let container = InMemoryContainer::new();

        AutoRegistration::new(&container, &universe, vec![key::<Foo>()])
            .all_types()
            .by_class_and_interface_with(Lifecycle::Transient)
            .unwrap();

        assert!(container
            .registered_types()
            .iter()
            .all(|registered| registered.lifecycle == Some(Lifecycle::Transient)));
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn missing_entrypoint_leaves_container_untouched() {
        let universe = universe();
        let container = InMemoryContainer::new();
        let plain_only = standard_entrypoints::<InMemoryContainer>()
            .into_iter()
            .filter(|entrypoint| !entrypoint.parameters.contains(&ParameterKind::Lifecycle))
            .collect();

        let result = AutoRegistration::new(&container, &universe, vec![key::<Foo>(), key::<Bar>()])
            .with_dispatcher(RegistrationDispatcher::with_entrypoints(plain_only))
            .all_types()
            .by_class_and_interface_with(Lifecycle::Scoped);

        match result.unwrap_err() {
            AutobindError::AmbiguousOrMissingEntrypoint(e) => {
                assert_eq!(e.matches, 0);
                assert_eq!(e.plugin, key::<Foo>());
                assert_eq!(e.concrete, key::<Foo>());
            }
            other => panic!("Expected AmbiguousOrMissingEntrypoint, got: {other:?}"),
        }
        assert!(container.is_empty());
    }

    #[test]
    fn container_error_names_failing_registration() {
        fn reject_interfaces(
            container: &InMemoryContainer,
            types: &[TypeKey],
            arguments: &[Argument],
        ) -> Result<()> {
            match types {
                [plugin, _] if *plugin == TypeKey::of::<dyn IFoo>() => Err(AutobindError::ArgumentMismatch {
                    entrypoint: "register_instance",
                    expected: 0,
                    found: 0,
                }),
                _ => invoke_register_instance(container, types, arguments),
            }
        }

        let universe = universe();
        let container = InMemoryContainer::new();
        let mut table = standard_entrypoints::<InMemoryContainer>();
        table[0].invoke = reject_interfaces;

        let result = AutoRegistration::new(&container, &universe, vec![key::<Foo>(), key::<Bar>()])
            .with_dispatcher(RegistrationDispatcher::with_entrypoints(table))
            .all_types()
            .by_class_and_interface();

        match result.unwrap_err() {
            AutobindError::RegistrationFailed { plugin, concrete, source } => {
                assert_eq!(plugin, key::<dyn IFoo>());
                assert_eq!(concrete, key::<Foo>());
                assert!(matches!(*source, AutobindError::ArgumentMismatch { .. }));
            }
            other => panic!("Expected RegistrationFailed, got: {other:?}"),
        }
        // Foo → Foo went through before the failure
        assert_eq!(bindings(&container), vec![concrete(key::<Foo>(), key::<Foo>())]);
    }

    #[test]
    fn repeated_batches_register_the_same_entries() {
        let universe = universe();
        let first = InMemoryContainer::new();
        let second = InMemoryContainer::new();

        let a = AutoRegistration::in_module(&first, &universe, "app").all_types().by_class_and_interface().unwrap();
        let b = AutoRegistration::in_module(&second, &universe, "app").all_types().by_class_and_interface().unwrap();

        assert_eq!(a, b);
        assert_eq!(first.registered_types(), second.registered_types());
    }

    #[test]
    fn report_display() {
        let universe = universe();
        let container = InMemoryContainer::new();

        let report = AutoRegistration::new(&container, &universe, vec![key::<Empty>()])
            .all_types()
            .by_class_and_interface()
            .unwrap();

        let text = report.to_string();
        assert!(text.starts_with("1 registration(s)"));
        assert!(text.contains("Empty"));
    }
}
