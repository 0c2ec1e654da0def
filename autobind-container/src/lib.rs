//! Type discovery and auto-registration for IoC containers.

pub mod batch;
pub mod classifier;
pub mod container;
pub mod contract;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
mod graph;
pub mod interfaces;
pub mod key;
pub mod lifecycle;
pub mod open_generic;
mod registry;
pub mod universe;

#[doc(hidden)]
pub use inventory;

pub use batch::{AutoRegistration, FilteredRegistration, RegistrationReport};
pub use container::{InMemoryContainer, prelude};
pub use contract::{IocContainer, IocContainerExt};
pub use descriptor::{GenericShape, TypeDescriptor, TypeKind};
pub use dispatcher::{RegistrationDispatcher, RegistrationEntry};
pub use error::{AutobindError, Result};
pub use key::TypeKey;
pub use lifecycle::Lifecycle;
pub use universe::TypeUniverse;
