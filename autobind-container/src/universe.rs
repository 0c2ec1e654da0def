//! The type universe — every type the resolver may look at.
//!
//! A [`TypeUniverse`] is an immutable, validated set of
//! [`TypeDescriptor`]s. It is built either explicitly through
//! [`TypeUniverse::builder`] or from descriptors submitted at build time
//! with [`register_type!`](crate::register_type), collected by
//! [`TypeUniverse::discover`].
//!
//! # Enumeration order
//! Builder universes enumerate types in the order they were described.
//! Discovered universes have no natural order (link order is not
//! stable), so they are sorted by module path, then type name.

use std::collections::HashMap;

use tracing::{debug, info, instrument, trace};

use crate::descriptor::TypeDescriptor;
use crate::error::{AutobindError, Result, UnknownTypeError};
use crate::graph::HierarchyValidator;
use crate::key::TypeKey;

/// A descriptor submitted at build time.
///
/// Created by [`register_type!`](crate::register_type); you rarely build
/// one by hand.
pub struct DiscoveredType {
    module: &'static str,
    describe: fn() -> TypeDescriptor,
}

impl DiscoveredType {
    pub const fn new(module: &'static str, describe: fn() -> TypeDescriptor) -> Self {
        Self { module, describe }
    }

    /// Module path of the submitting code.
    pub fn module(&self) -> &'static str {
        self.module
    }

    pub fn descriptor(&self) -> TypeDescriptor {
        (self.describe)()
    }
}

inventory::collect!(DiscoveredType);

/// Submits a type descriptor for [`TypeUniverse::discover`].
///
/// Takes a path to a `fn() -> TypeDescriptor`. The submitting module
/// becomes the type's module.
///
/// ```rust,ignore
/// fn describe_foo() -> TypeDescriptor {
///     TypeDescriptor::class::<Foo>().implements::<dyn IFoo>()
/// }
/// autobind_container::register_type!(describe_foo);
/// ```
#[macro_export]
macro_rules! register_type {
    ($describe:path) => {
        $crate::inventory::submit! {
            $crate::universe::DiscoveredType::new(module_path!(), $describe)
        }
    };
}

/// Immutable, validated collection of type descriptors.
#[derive(Debug, Clone)]
pub struct TypeUniverse {
    descriptors: HashMap<TypeKey, TypeDescriptor>,
    modules: HashMap<TypeKey, &'static str>,
    order: Vec<TypeKey>,
}

impl TypeUniverse {
    /// Create a new builder.
    pub fn builder() -> TypeUniverseBuilder {
        TypeUniverseBuilder::new()
    }

    /// Builds a universe from every descriptor submitted with
    /// [`register_type!`](crate::register_type) in this binary.
    ///
    /// # Errors
    /// Same as [`TypeUniverseBuilder::build`].
    pub fn discover() -> Result<TypeUniverse> {
        let mut discovered: Vec<(&'static str, TypeDescriptor)> = Vec::new();
        for entry in inventory::iter::<DiscoveredType> {
            discovered.push((entry.module(), entry.descriptor()));
        }

        discovered.sort_by(|a, b| {
            a.0.cmp(b.0)
                .then_with(|| a.1.key().type_name().cmp(b.1.key().type_name()))
        });

        debug!(discovered = discovered.len(), "Collected submitted type descriptors");

        discovered
            .into_iter()
            .fold(TypeUniverse::builder(), |builder, (module, descriptor)| {
                builder.describe_in(module, descriptor)
            })
            .build()
    }

    /// Looks up a descriptor.
    pub fn get(&self, key: &TypeKey) -> Option<&TypeDescriptor> {
        self.descriptors.get(key)
    }

    /// Looks up a descriptor that must exist.
    ///
    /// # Errors
    /// [`AutobindError::UnknownType`] if `key` was never described.
    pub fn require(&self, key: &TypeKey) -> Result<&TypeDescriptor> {
        self.get(key).ok_or_else(|| {
            AutobindError::UnknownType(UnknownTypeError {
                requested: *key,
                referenced_by: None,
                suggestions: Vec::new(),
            })
        })
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.descriptors.contains_key(key)
    }

    /// Descriptors in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.order.iter().map(|key| &self.descriptors[key])
    }

    /// Keys in enumeration order.
    pub fn keys(&self) -> &[TypeKey] {
        &self.order
    }

    /// Module a type was described in, if one was given.
    pub fn module_of(&self, key: &TypeKey) -> Option<&'static str> {
        self.modules.get(key).copied()
    }

    /// Keys of every type declared in `module` or one of its
    /// sub-modules, in enumeration order.
    pub fn types_in_module(&self, module: &str) -> Vec<TypeKey> {
        self.order
            .iter()
            .filter(|key| {
                self.modules
                    .get(*key)
                    .is_some_and(|declared| module_contains(module, declared))
            })
            .copied()
            .collect()
    }

    /// Returns the number of described types.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no types are described.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// `app::services` contains `app::services` and `app::services::mail`,
/// but not `app::services_old`.
fn module_contains(module: &str, declared: &str) -> bool {
    declared
        .strip_prefix(module)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Builds a [`TypeUniverse`].
///
/// # Examples
/// ```
/// use autobind_container::descriptor::TypeDescriptor;
/// use autobind_container::universe::TypeUniverse;
///
/// trait IFoo {}
/// struct Foo;
///
/// let universe = TypeUniverse::builder()
///     .describe(TypeDescriptor::interface::<dyn IFoo>())
///     .describe(TypeDescriptor::class::<Foo>().implements::<dyn IFoo>())
///     .build()
///     .expect("valid hierarchy");
///
/// assert_eq!(universe.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct TypeUniverseBuilder {
    descriptors: Vec<(Option<&'static str>, TypeDescriptor)>,
}

impl TypeUniverseBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor with no module.
    pub fn describe(mut self, descriptor: TypeDescriptor) -> Self {
        self.descriptors.push((None, descriptor));
        self
    }

    /// Adds a descriptor declared in `module`.
    pub fn describe_in(mut self, module: &'static str, descriptor: TypeDescriptor) -> Self {
        self.descriptors.push((Some(module), descriptor));
        self
    }

    /// Build the universe, validating the hierarchy.
    ///
    /// # Errors
    /// - [`AutobindError::DuplicateType`] — a type described twice
    /// - [`AutobindError::UnknownType`] — a link to an undescribed type
    /// - [`AutobindError::InvalidDeclaration`] — a link to the wrong kind
    /// - [`AutobindError::CyclicHierarchy`] — an inheritance cycle
    #[instrument(skip(self), name = "universe_build")]
    pub fn build(self) -> Result<TypeUniverse> {
        info!(described = self.descriptors.len(), "Building type universe");

        let mut descriptors = HashMap::with_capacity(self.descriptors.len());
        let mut modules = HashMap::new();
        let mut order = Vec::with_capacity(self.descriptors.len());

        for (module, descriptor) in self.descriptors {
            let key = descriptor.key();
            if descriptors.contains_key(&key) {
                return Err(AutobindError::DuplicateType(key));
            }

            trace!(key = %key, module = ?module, "Described type");
            if let Some(module) = module {
                modules.insert(key, module);
            }
            order.push(key);
            descriptors.insert(key, descriptor);
        }

        HierarchyValidator::new(&descriptors, &order).validate()?;

        info!("Type universe built successfully ✓");
        Ok(TypeUniverse {
            descriptors,
            modules,
            order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait IFoo {}
    struct Foo;
    struct Bar;

    fn universe() -> TypeUniverse {
        TypeUniverse::builder()
            .describe_in("app::contracts", TypeDescriptor::interface::<dyn IFoo>())
            .describe_in(
                "app::services",
                TypeDescriptor::class::<Foo>().implements::<dyn IFoo>(),
            )
            .describe_in("app::services::extra", TypeDescriptor::class::<Bar>())
            .build()
            .unwrap()
    }

    #[test]
    fn keeps_description_order() {
        let universe = universe();
        assert_eq!(
            universe.keys(),
            &[
                TypeKey::of::<dyn IFoo>(),
                TypeKey::of::<Foo>(),
                TypeKey::of::<Bar>()
            ]
        );
        let from_iter: Vec<TypeKey> = universe.iter().map(|d| d.key()).collect();
        assert_eq!(from_iter, universe.keys());
    }

    #[test]
    fn module_lookup() {
        let universe = universe();
        assert_eq!(universe.module_of(&TypeKey::of::<Foo>()), Some("app::services"));
        assert_eq!(
            universe.types_in_module("app::services"),
            vec![TypeKey::of::<Foo>(), TypeKey::of::<Bar>()]
        );
        assert_eq!(
            universe.types_in_module("app::services::extra"),
            vec![TypeKey::of::<Bar>()]
        );
        assert!(universe.types_in_module("app::serv").is_empty());
    }

    #[test]
    fn duplicate_description_fails() {
        let result = TypeUniverse::builder()
            .describe(TypeDescriptor::class::<Foo>())
            .describe(TypeDescriptor::class::<Foo>())
            .build();

        match result.unwrap_err() {
            AutobindError::DuplicateType(key) => assert_eq!(key, TypeKey::of::<Foo>()),
            other => panic!("Expected DuplicateType, got: {other:?}"),
        }
    }

    #[test]
    fn require_unknown_type_fails() {
        let universe = universe();
        assert!(universe.require(&TypeKey::of::<Foo>()).is_ok());
        assert!(matches!(
            universe.require(&TypeKey::of::<String>()),
            Err(AutobindError::UnknownType(_))
        ));
    }

    #[test]
    fn empty_universe() {
        let universe = TypeUniverse::builder().build().unwrap();
        assert!(universe.is_empty());
        assert_eq!(universe.len(), 0);
    }

    #[test]
    fn module_prefix_matching() {
        assert!(module_contains("app", "app"));
        assert!(module_contains("app", "app::inner"));
        assert!(!module_contains("app", "application"));
    }
}
