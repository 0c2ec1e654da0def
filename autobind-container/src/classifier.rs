//! Eligibility for auto-registration.
//!
//! Only types that can actually be bound to an implementation are
//! registered: described classes that are not abstract and carry no
//! unresolved generic parameters.

use std::collections::HashSet;

use tracing::trace;

use crate::descriptor::{GenericShape, TypeKind};
use crate::key::TypeKey;
use crate::universe::TypeUniverse;

/// Decides which candidate types may be auto-registered.
#[derive(Debug, Clone, Copy)]
pub struct TypeClassifier<'u> {
    universe: &'u TypeUniverse,
}

impl<'u> TypeClassifier<'u> {
    pub fn new(universe: &'u TypeUniverse) -> Self {
        Self { universe }
    }

    /// Returns `true` if `key` is a described, non-abstract class with no
    /// unresolved generic parameters. Undescribed types are never
    /// eligible.
    pub fn is_eligible(&self, key: &TypeKey) -> bool {
        let Some(descriptor) = self.universe.get(key) else {
            trace!(key = %key, "Not described, skipping");
            return false;
        };

        let eligible = descriptor.kind() == TypeKind::Class
            && !descriptor.is_abstract()
            && !self.contains_generic_parameters(key);

        trace!(key = %key, eligible, "Classified type");
        eligible
    }

    /// Returns `true` if `key` is an open definition or instantiates one
    /// with an argument that is itself open.
    pub fn contains_generic_parameters(&self, key: &TypeKey) -> bool {
        self.contains_generic_parameters_inner(key, &mut HashSet::new())
    }

    fn contains_generic_parameters_inner(&self, key: &TypeKey, seen: &mut HashSet<TypeKey>) -> bool {
        if !seen.insert(*key) {
            return false;
        }

        // undescribed arguments (i32, String, ...) are closed
        let Some(descriptor) = self.universe.get(key) else {
            return false;
        };

        match descriptor.generic() {
            GenericShape::Closed => false,
            GenericShape::OpenDefinition { .. } => true,
            GenericShape::Instantiation { arguments, .. } => arguments
                .iter()
                .any(|argument| self.contains_generic_parameters_inner(argument, seen)),
        }
    }

    /// Keeps eligible types, preserving order.
    ///
    /// Idempotent: filtering the output again returns it unchanged.
    pub fn filter_eligible(&self, types: &[TypeKey]) -> Vec<TypeKey> {
        types.iter().filter(|key| self.is_eligible(key)).copied().collect()
    }
}
