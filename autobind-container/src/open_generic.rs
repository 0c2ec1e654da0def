//! Open generic contract matching.
//!
//! A closed type is tied to an open definition only through its
//! declared [`GenericShape::Instantiation`](crate::descriptor::GenericShape).
//! Matching compares definitions, never type arguments: `IntHandler`,
//! implementing `dyn Handler<i32>`, matches the open `Handler<_>` as much
//! as a handler for any other message would.

use tracing::trace;

use crate::interfaces::InterfaceSetResolver;
use crate::key::TypeKey;
use crate::universe::TypeUniverse;

/// Decides whether types fulfil an open generic contract.
#[derive(Debug, Clone, Copy)]
pub struct OpenGenericMatcher<'u> {
    universe: &'u TypeUniverse,
}

impl<'u> OpenGenericMatcher<'u> {
    pub fn new(universe: &'u TypeUniverse) -> Self {
        Self { universe }
    }

    /// Returns `true` if `key` itself, its immediate base, or any of its
    /// interfaces is an instantiation of `open`.
    pub fn implements_open_contract(&self, key: &TypeKey, open: &TypeKey) -> bool {
        let Some(descriptor) = self.universe.get(key) else {
            return false;
        };

        let matched = self.instantiates(key, open)
            || descriptor.base().is_some_and(|base| self.instantiates(&base, open))
            || InterfaceSetResolver::new(self.universe)
                .all_interfaces(key)
                .iter()
                .any(|interface| self.instantiates(interface, open));

        trace!(key = %key, open = %open, matched, "Matched open contract");
        matched
    }

    /// Keeps types implementing `open`, preserving order. Yields an empty
    /// sequence when nothing matches.
    pub fn where_implements_open_type(&self, types: &[TypeKey], open: &TypeKey) -> Vec<TypeKey> {
        types
            .iter()
            .filter(|key| self.implements_open_contract(key, open))
            .copied()
            .collect()
    }

    fn instantiates(&self, key: &TypeKey, open: &TypeKey) -> bool {
        self.universe
            .get(key)
            .and_then(|descriptor| descriptor.generic_definition())
            .is_some_and(|definition| definition == *open)
    }
}
