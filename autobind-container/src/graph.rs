//! Type hierarchy validation.
//!
//! Validates a type universe when it is built:
//! - Every referenced base, interface and generic definition is described
//! - Links point at the right kind of type
//! - Base and interface links are acyclic
//!
//! Interface-set computation walks these links without cycle guards of
//! its own, so validation has to pass before a universe is handed out.

use std::collections::{HashMap, HashSet};

use autobind_support::rendering::suggest_similar;
use tracing::{debug, instrument, warn};

use crate::descriptor::{GenericShape, TypeDescriptor, TypeKind};
use crate::error::{AutobindError, CyclicHierarchyError, UnknownTypeError};
use crate::key::TypeKey;

const MAX_SUGGESTIONS: usize = 3;

/// Validates declared type links.
///
/// # Algorithm
/// Reference checks run first, in declaration order, so the first broken
/// descriptor is the one reported. Cycle detection then uses a DFS over
/// base and interface links, keeping the current path for the error.
pub(crate) struct HierarchyValidator<'a> {
    descriptors: &'a HashMap<TypeKey, TypeDescriptor>,
    order: &'a [TypeKey],
    /// Currently being visited (for cycle detection)
    visiting: HashSet<TypeKey>,
    /// Already validated (cache)
    validated: HashSet<TypeKey>,
    /// Current DFS path (for error reporting)
    path: Vec<TypeKey>,
}

impl<'a> HierarchyValidator<'a> {
    pub fn new(descriptors: &'a HashMap<TypeKey, TypeDescriptor>, order: &'a [TypeKey]) -> Self {
        Self {
            descriptors,
            order,
            visiting: HashSet::new(),
            validated: HashSet::new(),
            path: Vec::new(),
        }
    }

    /// Validates the entire hierarchy.
    ///
    /// # Errors
    /// - [`AutobindError::UnknownType`] — a link to an undescribed type
    /// - [`AutobindError::InvalidDeclaration`] — a link to the wrong kind
    /// - [`AutobindError::CyclicHierarchy`] — a cycle
    #[instrument(skip(self), name = "hierarchy_validation")]
    pub fn validate(&mut self) -> Result<(), AutobindError> {
        debug!(type_count = self.order.len(), "Starting hierarchy validation");

        for key in self.order {
            let descriptor = &self.descriptors[key];
            self.check_links(descriptor)?;
        }

        for key in self.order {
            if !self.validated.contains(key) {
                self.visit(*key)?;
            }
        }

        debug!("Hierarchy validation passed ✓");
        Ok(())
    }

    fn check_links(&self, descriptor: &TypeDescriptor) -> Result<(), AutobindError> {
        let key = descriptor.key();

        if let Some(base) = descriptor.base() {
            if descriptor.kind() == TypeKind::Interface {
                return Err(invalid(key, "an interface cannot extend a base class".to_string()));
            }
            let base_desc = self.lookup(base, key)?;
            if base_desc.kind() != TypeKind::Class {
                return Err(invalid(key, format!("base {base} is not a class")));
            }
        }

        for interface in descriptor.interfaces() {
            let interface_desc = self.lookup(*interface, key)?;
            if interface_desc.kind() != TypeKind::Interface {
                return Err(invalid(key, format!("{interface} is declared as an interface but is a class")));
            }
        }

        if let GenericShape::Instantiation { definition, arguments } = descriptor.generic() {
            let definition_desc = self.lookup(*definition, key)?;
            if !definition_desc.is_open_definition() {
                return Err(invalid(
                    key,
                    format!("{definition} is not an open generic definition"),
                ));
            }
            if arguments.len() != definition_desc.arity() {
                return Err(invalid(
                    key,
                    format!(
                        "{definition} takes {} type argument(s), {} given",
                        definition_desc.arity(),
                        arguments.len()
                    ),
                ));
            }
        }

        Ok(())
    }

    fn lookup(&self, key: TypeKey, referenced_by: TypeKey) -> Result<&'a TypeDescriptor, AutobindError> {
        self.descriptors.get(&key).ok_or_else(|| {
            let available: Vec<&str> = self.order.iter().map(|k| k.type_name()).collect();
            let suggestions = suggest_similar(key.type_name(), &available, MAX_SUGGESTIONS);

            warn!(missing = %key, referenced_by = %referenced_by, "Reference to undescribed type");

            AutobindError::UnknownType(UnknownTypeError {
                requested: key,
                referenced_by: Some(referenced_by),
                suggestions,
            })
        })
    }

    /// DFS over base and interface links.
    fn visit(&mut self, key: TypeKey) -> Result<(), AutobindError> {
        if self.validated.contains(&key) {
            return Ok(());
        }

        if self.visiting.contains(&key) {
            let cycle_start = self.path.iter().position(|k| *k == key).unwrap_or(0);

            let mut chain: Vec<TypeKey> = self.path[cycle_start..].to_vec();
            chain.push(key);

            warn!(cycle = ?chain, "Cyclic type hierarchy detected");

            return Err(AutobindError::CyclicHierarchy(CyclicHierarchyError { chain }));
        }

        let descriptors = self.descriptors;
        let descriptor = &descriptors[&key];

        self.visiting.insert(key);
        self.path.push(key);

        for parent in descriptor.base().iter().chain(descriptor.interfaces()) {
            self.visit(*parent)?;
        }

        self.path.pop();
        self.visiting.remove(&key);
        self.validated.insert(key);

        Ok(())
    }
}

fn invalid(key: TypeKey, reason: String) -> AutobindError {
    warn!(key = %key, reason = %reason, "Invalid type declaration");
    AutobindError::InvalidDeclaration { key, reason }
}
