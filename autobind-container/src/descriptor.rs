//! Type descriptors — the static stand-in for runtime type metadata.
//!
//! A [`TypeDescriptor`] states what a type is (class or interface), what
//! it extends and which interfaces it declares. Interface sets and
//! generic matches are computed from these declarations, never from
//! runtime introspection.
//!
//! # Mapping to Rust
//! - a *class* is a concrete struct (or an abstract base used only for
//!   its declared interfaces)
//! - an *interface* is a `dyn Trait` contract
//! - an *open definition* is a marker type standing for a generic
//!   contract with unbound parameters, e.g. `Handler<_>`
//!
//! # Examples
//! ```
//! use autobind_container::descriptor::TypeDescriptor;
//!
//! trait IFoo {}
//! trait IBar {}
//! struct Foo;
//! struct Bar;
//!
//! let foo = TypeDescriptor::class::<Foo>().implements::<dyn IFoo>();
//! let bar = TypeDescriptor::class::<Bar>()
//!     .extends::<Foo>()
//!     .implements::<dyn IBar>();
//!
//! assert_eq!(bar.base(), Some(foo.key()));
//! assert_eq!(bar.interfaces().len(), 1);
//! ```

use crate::key::TypeKey;

/// Whether a type can be instantiated or only implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A struct-like type with an implementation.
    Class,
    /// A contract (`dyn Trait`).
    Interface,
}

/// Generic identity of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenericShape {
    /// Not generic, or generic with all parameters fixed and no interest
    /// in its definition.
    Closed,
    /// A generic definition with `arity` unbound parameters.
    OpenDefinition { arity: usize },
    /// A closed instantiation of `definition`.
    Instantiation {
        definition: TypeKey,
        arguments: Vec<TypeKey>,
    },
}

/// Declared metadata for one type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    key: TypeKey,
    kind: TypeKind,
    is_abstract: bool,
    base: Option<TypeKey>,
    interfaces: Vec<TypeKey>,
    generic: GenericShape,
}

impl TypeDescriptor {
    /// Creates a descriptor from a key and kind. No base, no interfaces.
    pub fn new(key: TypeKey, kind: TypeKind) -> Self {
        Self {
            key,
            kind,
            is_abstract: false,
            base: None,
            interfaces: Vec::new(),
            generic: GenericShape::Closed,
        }
    }

    /// Describes a concrete class `T`.
    pub fn class<T: ?Sized + 'static>() -> Self {
        Self::new(TypeKey::of::<T>(), TypeKind::Class)
    }

    /// Describes an abstract class `T`: it can be extended but is never
    /// registered itself.
    pub fn abstract_class<T: ?Sized + 'static>() -> Self {
        Self::class::<T>().into_abstract()
    }

    /// Describes an interface `T`, normally `dyn Trait`.
    pub fn interface<T: ?Sized + 'static>() -> Self {
        Self::new(TypeKey::of::<T>(), TypeKind::Interface)
    }

    /// Describes an open generic interface definition identified by the
    /// marker `M`.
    pub fn open_interface<M: ?Sized + 'static>(arity: usize) -> Self {
        Self::interface::<M>().with_generic(GenericShape::OpenDefinition { arity })
    }

    /// Describes an open generic class definition identified by the
    /// marker `M`.
    pub fn open_class<M: ?Sized + 'static>(arity: usize) -> Self {
        Self::class::<M>().with_generic(GenericShape::OpenDefinition { arity })
    }

    /// Marks the type abstract.
    pub fn into_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Sets the base class to `B`.
    pub fn extends<B: ?Sized + 'static>(self) -> Self {
        self.with_base(TypeKey::of::<B>())
    }

    /// Sets the base class by key.
    pub fn with_base(mut self, base: TypeKey) -> Self {
        self.base = Some(base);
        self
    }

    /// Declares interface `I`. Declaration order is kept; it decides which
    /// interface a type is bound under.
    pub fn implements<I: ?Sized + 'static>(self) -> Self {
        self.with_interface(TypeKey::of::<I>())
    }

    /// Declares an interface by key. Repeated declarations are ignored.
    pub fn with_interface(mut self, interface: TypeKey) -> Self {
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
        self
    }

    /// Marks this type as a closed instantiation of the open definition
    /// `D` with the given type arguments.
    pub fn instantiates<D: ?Sized + 'static>(
        self,
        arguments: impl IntoIterator<Item = TypeKey>,
    ) -> Self {
        self.with_generic(GenericShape::Instantiation {
            definition: TypeKey::of::<D>(),
            arguments: arguments.into_iter().collect(),
        })
    }

    /// Sets the generic shape.
    pub fn with_generic(mut self, generic: GenericShape) -> Self {
        self.generic = generic;
        self
    }

    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Base class, `None` at the root of the hierarchy.
    #[inline]
    pub fn base(&self) -> Option<TypeKey> {
        self.base
    }

    /// Interfaces declared on this type, in declaration order. For an
    /// interface these are its super-interfaces.
    #[inline]
    pub fn interfaces(&self) -> &[TypeKey] {
        &self.interfaces
    }

    #[inline]
    pub fn generic(&self) -> &GenericShape {
        &self.generic
    }

    #[inline]
    pub fn is_open_definition(&self) -> bool {
        matches!(self.generic, GenericShape::OpenDefinition { .. })
    }

    /// The open definition this type instantiates, if any.
    pub fn generic_definition(&self) -> Option<TypeKey> {
        match &self.generic {
            GenericShape::Instantiation { definition, .. } => Some(*definition),
            _ => None,
        }
    }

    /// Number of generic parameters; `0` for closed types.
    pub fn arity(&self) -> usize {
        match &self.generic {
            GenericShape::Closed => 0,
            GenericShape::OpenDefinition { arity } => *arity,
            GenericShape::Instantiation { arguments, .. } => arguments.len(),
        }
    }
}
