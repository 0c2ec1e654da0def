//! Type tokens.
//!
//! [`TypeKey`] identifies a type in the type universe and in the
//! container registry. It combines a [`TypeId`] with the type's name,
//! which is only used for messages.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

/// Identifies a type: a concrete struct, a `dyn Trait` contract, or a
/// marker standing for an open generic definition.
///
/// # Examples
/// ```
/// use autobind_container::key::TypeKey;
///
/// trait Greeter {}
/// struct English;
///
/// let contract = TypeKey::of::<dyn Greeter>();
/// let concrete = TypeKey::of::<English>();
/// assert_ne!(contract, concrete);
/// assert!(concrete.type_name().ends_with("English"));
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeKey {
    /// Creates a key for type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of this type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the human-readable type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

// name is informational only
impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.type_name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Serialized as the type name; `TypeId` is not stable across builds.
impl Serialize for TypeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.type_name)
    }
}
