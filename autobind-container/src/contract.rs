//! The container contract the resolver drives.
//!
//! [`IocContainer`] is the boundary between the resolver and whatever
//! container actually builds objects. Besides its operations, a
//! container publishes a table of [`Entrypoint`]s: the same operations
//! described by name, named type parameters and declared argument kinds.
//! The dispatcher picks registration operations from that table by shape
//! instead of calling them directly, so a container that does not
//! support a shape says so by leaving it out of the table.
//!
//! # Examples
//! ```rust
//! use autobind_container::prelude::*;
//!
//! trait Greeter {}
//! struct English;
//!
//! let container = InMemoryContainer::new();
//! container.bind::<dyn Greeter, English>().unwrap();
//! container.bind_with::<English, English>(Lifecycle::Transient).unwrap();
//!
//! assert_eq!(container.registered_types().len(), 2);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{AutobindError, Result};
use crate::key::TypeKey;
use crate::lifecycle::Lifecycle;

/// Factory bound to a contract by [`IocContainer::register_factory`].
pub type FactoryFn = Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// Name of the binding entry points.
pub const REGISTER_INSTANCE: &str = "register_instance";
/// Name of the decorator entry point.
pub const REGISTER_DECORATOR: &str = "register_decorator";
/// Name of the open-generic decorator entry point.
pub const REGISTER_OPEN_TYPE_DECORATOR: &str = "register_open_type_decorator";

/// Type parameter holding the contract.
pub const PLUGIN: &str = "plugin";
/// Type parameter holding the implementation.
pub const CONCRETE: &str = "concrete";
/// Type parameter holding the decorator.
pub const DECORATOR: &str = "decorator";
/// Type parameter holding the decorated contract.
pub const COMPONENT: &str = "component";

/// Declared kind of an entry point's runtime argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Lifecycle,
    Type,
}

/// A runtime argument passed to an entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    Lifecycle(Lifecycle),
    Type(TypeKey),
}

/// Invokes an entry point with bound type parameters and arguments.
pub type InvokeFn<C> = fn(&C, &[TypeKey], &[Argument]) -> Result<()>;

/// One registration operation as published by a container.
pub struct Entrypoint<C> {
    /// Operation name; overloads share it.
    pub name: &'static str,
    /// Named type parameters, in binding order.
    pub type_parameters: &'static [&'static str],
    /// Declared runtime parameters.
    pub parameters: &'static [ParameterKind],
    pub invoke: InvokeFn<C>,
}

impl<C> Clone for Entrypoint<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Entrypoint<C> {}

impl<C> fmt::Debug for Entrypoint<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entrypoint")
            .field("name", &self.name)
            .field("type_parameters", &self.type_parameters)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// What a registration binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegistrationKind {
    /// Contract → implementation type.
    Concrete,
    /// Contract → factory function.
    Factory,
    /// Decorator layered over a contract.
    Decorator,
    /// Decorator layered over every instantiation of an open contract.
    OpenTypeDecorator,
}

/// Introspection record for one registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredType {
    /// Contract the registration is filed under
    pub plugin: TypeKey,
    pub kind: RegistrationKind,
    /// Implementing or decorating type; `None` for factories
    pub implementation: Option<TypeKey>,
    /// `None` for decorators, which follow the decorated binding
    pub lifecycle: Option<Lifecycle>,
}

/// Operations a container exposes to the resolver.
///
/// All operations take `&self`; containers keep their registry behind
/// interior mutability so registrations can be inspected while a
/// composition root is still running.
pub trait IocContainer {
    /// Bind `plugin` to a factory.
    fn register_factory(&self, plugin: TypeKey, factory: FactoryFn) -> Result<()>;

    /// Bind `plugin` to `concrete` with the container's default lifecycle.
    fn register_instance(&self, plugin: TypeKey, concrete: TypeKey) -> Result<()>;

    /// Bind `plugin` to `concrete` with an explicit lifecycle.
    fn register_instance_with(
        &self,
        plugin: TypeKey,
        concrete: TypeKey,
        lifecycle: Lifecycle,
    ) -> Result<()>;

    /// Layer `decorator` over the bindings of `component`.
    fn register_decorator(&self, decorator: TypeKey, component: TypeKey) -> Result<()>;

    /// Layer `open_decorator` over every instantiation of `open`.
    fn register_open_type_decorator(&self, open: TypeKey, open_decorator: TypeKey) -> Result<()>;

    /// All registrations, in registration order.
    fn registered_types(&self) -> Vec<RegisteredType>;

    /// Container self-check.
    fn verify(&self) -> Result<()>;

    /// Human-readable dump.
    fn describe(&self) -> String;

    /// Registration operations this container publishes.
    fn entrypoints() -> Vec<Entrypoint<Self>>
    where
        Self: Sized,
    {
        standard_entrypoints()
    }
}

/// The entry-point table of a container supporting every operation of
/// [`IocContainer`].
pub fn standard_entrypoints<C: IocContainer>() -> Vec<Entrypoint<C>> {
    vec![
        Entrypoint {
            name: REGISTER_INSTANCE,
            type_parameters: &[PLUGIN, CONCRETE],
            parameters: &[],
            invoke: invoke_register_instance::<C>,
        },
        Entrypoint {
            name: REGISTER_INSTANCE,
            type_parameters: &[PLUGIN, CONCRETE],
            parameters: &[ParameterKind::Lifecycle],
            invoke: invoke_register_instance_with::<C>,
        },
        Entrypoint {
            name: REGISTER_DECORATOR,
            type_parameters: &[DECORATOR, COMPONENT],
            parameters: &[],
            invoke: invoke_register_decorator::<C>,
        },
        Entrypoint {
            name: REGISTER_OPEN_TYPE_DECORATOR,
            type_parameters: &[],
            parameters: &[ParameterKind::Type, ParameterKind::Type],
            invoke: invoke_register_open_type_decorator::<C>,
        },
    ]
}

/// Invoke function for a plain `register_instance<plugin, concrete>()`.
pub fn invoke_register_instance<C: IocContainer>(
    container: &C,
    types: &[TypeKey],
    arguments: &[Argument],
) -> Result<()> {
    match (types, arguments) {
        ([plugin, concrete], []) => container.register_instance(*plugin, *concrete),
        _ => Err(mismatch(REGISTER_INSTANCE, 2, types, arguments)),
    }
}

/// Invoke function for `register_instance<plugin, concrete>(lifecycle)`.
pub fn invoke_register_instance_with<C: IocContainer>(
    container: &C,
    types: &[TypeKey],
    arguments: &[Argument],
) -> Result<()> {
    match (types, arguments) {
        ([plugin, concrete], [Argument::Lifecycle(lifecycle)]) => {
            container.register_instance_with(*plugin, *concrete, *lifecycle)
        }
        _ => Err(mismatch(REGISTER_INSTANCE, 3, types, arguments)),
    }
}

fn invoke_register_decorator<C: IocContainer>(
    container: &C,
    types: &[TypeKey],
    arguments: &[Argument],
) -> Result<()> {
    match (types, arguments) {
        ([decorator, component], []) => container.register_decorator(*decorator, *component),
        _ => Err(mismatch(REGISTER_DECORATOR, 2, types, arguments)),
    }
}

fn invoke_register_open_type_decorator<C: IocContainer>(
    container: &C,
    types: &[TypeKey],
    arguments: &[Argument],
) -> Result<()> {
    match (types, arguments) {
        ([], [Argument::Type(open), Argument::Type(open_decorator)]) => {
            container.register_open_type_decorator(*open, *open_decorator)
        }
        _ => Err(mismatch(REGISTER_OPEN_TYPE_DECORATOR, 2, types, arguments)),
    }
}

fn mismatch(
    entrypoint: &'static str,
    expected: usize,
    types: &[TypeKey],
    arguments: &[Argument],
) -> AutobindError {
    AutobindError::ArgumentMismatch {
        entrypoint,
        expected,
        found: types.len() + arguments.len(),
    }
}

/// Typed wrappers over [`IocContainer`].
pub trait IocContainerExt: IocContainer {
    /// Bind contract `P` to implementation `C`.
    fn bind<P: ?Sized + 'static, C: 'static>(&self) -> Result<()> {
        self.register_instance(TypeKey::of::<P>(), TypeKey::of::<C>())
    }

    /// Bind contract `P` to implementation `C` with `lifecycle`.
    fn bind_with<P: ?Sized + 'static, C: 'static>(&self, lifecycle: Lifecycle) -> Result<()> {
        self.register_instance_with(TypeKey::of::<P>(), TypeKey::of::<C>(), lifecycle)
    }

    /// Bind contract `P` to a factory producing `T`.
    fn bind_factory<P, T, F>(&self, factory: F) -> Result<()>
    where
        P: ?Sized + 'static,
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register_factory(
            TypeKey::of::<P>(),
            Arc::new(move || Box::new(factory()) as Box<dyn Any + Send + Sync>),
        )
    }

    /// Layer decorator `D` over contract `Cmp`.
    fn decorate<D: 'static, Cmp: ?Sized + 'static>(&self) -> Result<()> {
        self.register_decorator(TypeKey::of::<D>(), TypeKey::of::<Cmp>())
    }
}

impl<T: IocContainer + ?Sized> IocContainerExt for T {}
