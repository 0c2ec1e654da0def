//! # Autobind — type discovery and auto-registration for IoC containers
//!
//! Describe your types once, then let the resolver bind every concrete
//! class to itself and to its first directly declared interface.
//!
//! ```rust
//! use autobind::prelude::*;
//!
//! trait IFoo {}
//! trait IBar {}
//! struct Foo;
//! struct Bar;
//!
//! let universe = TypeUniverse::builder()
//!     .describe(TypeDescriptor::interface::<dyn IFoo>())
//!     .describe(TypeDescriptor::interface::<dyn IBar>())
//!     .describe(TypeDescriptor::class::<Foo>().implements::<dyn IFoo>())
//!     .describe(TypeDescriptor::class::<Bar>().extends::<Foo>().implements::<dyn IBar>())
//!     .build()?;
//!
//! let container = InMemoryContainer::new();
//! let report = AutoRegistration::new(&container, &universe, universe.keys().to_vec())
//!     .all_types()
//!     .by_class_and_interface()?;
//!
//! // Foo → Foo, IFoo → Foo, Bar → Bar, IBar → Bar
//! assert_eq!(report.len(), 4);
//! # Ok::<(), AutobindError>(())
//! ```

pub use autobind_container::*;
pub use autobind_support::*;
