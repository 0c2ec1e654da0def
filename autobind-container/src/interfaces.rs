//! Direct and inherited interface sets.
//!
//! A type is bound under an interface only if it declares that
//! interface itself. Interfaces that reach it through the base chain
//! belong to an ancestor, which gets its own binding.
//!
//! ```text
//! Foo : IFoo            all = [IFoo]        inherited = []      direct = [IFoo]
//! Bar : Foo, IBar, IFoo all = [IBar, IFoo]  inherited = [IFoo]  direct = [IBar]
//! ```

use std::collections::HashSet;

use crate::descriptor::TypeDescriptor;
use crate::key::TypeKey;
use crate::universe::TypeUniverse;

/// Computes interface sets from declared links.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceSetResolver<'u> {
    universe: &'u TypeUniverse,
}

impl<'u> InterfaceSetResolver<'u> {
    pub fn new(universe: &'u TypeUniverse) -> Self {
        Self { universe }
    }

    /// Every interface `key` implements, in a fixed order: its declared
    /// interfaces (each followed by its super-interfaces), then those of
    /// each ancestor. Duplicates keep their first position.
    pub fn all_interfaces(&self, key: &TypeKey) -> Vec<TypeKey> {
        let mut interfaces = Vec::new();
        let mut seen = HashSet::new();

        if let Some(descriptor) = self.universe.get(key) {
            self.collect_declared(descriptor, &mut interfaces, &mut seen);
            for ancestor in self.ancestors(key) {
                if let Some(ancestor) = self.universe.get(&ancestor) {
                    self.collect_declared(ancestor, &mut interfaces, &mut seen);
                }
            }
        }

        interfaces
    }

    /// Interfaces implemented anywhere along the base chain.
    pub fn inherited_interfaces(&self, key: &TypeKey) -> Vec<TypeKey> {
        let mut interfaces = Vec::new();
        let mut seen = HashSet::new();

        for ancestor in self.ancestors(key) {
            if let Some(ancestor) = self.universe.get(&ancestor) {
                self.collect_declared(ancestor, &mut interfaces, &mut seen);
            }
        }

        interfaces
    }

    /// Interfaces implemented by `key` but by none of its ancestors, in
    /// [`all_interfaces`](Self::all_interfaces) order.
    pub fn direct_interfaces(&self, key: &TypeKey) -> Vec<TypeKey> {
        let inherited: HashSet<TypeKey> = self.inherited_interfaces(key).into_iter().collect();
        self.all_interfaces(key)
            .into_iter()
            .filter(|interface| !inherited.contains(interface))
            .collect()
    }

    /// The interface `key` is auto-bound under, if any.
    pub fn first_direct_interface(&self, key: &TypeKey) -> Option<TypeKey> {
        self.direct_interfaces(key).into_iter().next()
    }

    /// Keeps types implementing `contract` directly or through an
    /// ancestor.
    pub fn where_implements(&self, types: &[TypeKey], contract: &TypeKey) -> Vec<TypeKey> {
        types
            .iter()
            .filter(|key| {
                self.direct_interfaces(key).contains(contract)
                    || self.inherited_interfaces(key).contains(contract)
            })
            .copied()
            .collect()
    }

    /// Base chain of `key`, nearest first, ending at the root.
    ///
    /// Terminates because the universe rejects cyclic hierarchies.
    pub fn ancestors(&self, key: &TypeKey) -> Vec<TypeKey> {
        let mut chain = Vec::new();
        let mut current = self.universe.get(key).and_then(TypeDescriptor::base);

        while let Some(base) = current {
            chain.push(base);
            current = self.universe.get(&base).and_then(TypeDescriptor::base);
        }

        chain
    }

    fn collect_declared(
        &self,
        descriptor: &TypeDescriptor,
        interfaces: &mut Vec<TypeKey>,
        seen: &mut HashSet<TypeKey>,
    ) {
        for interface in descriptor.interfaces() {
            if seen.insert(*interface) {
                interfaces.push(*interface);
                if let Some(interface) = self.universe.get(interface) {
                    self.collect_declared(interface, interfaces, seen);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait IFoo {}
    trait IBar {}
    trait IBase {}
    trait IExtra {}
    struct Foo;
    struct Bar;
    struct Baz;
    struct Empty;

    fn universe() -> TypeUniverse {
        TypeUniverse::builder()
            .describe(TypeDescriptor::interface::<dyn IBase>())
            .describe(TypeDescriptor::interface::<dyn IFoo>().implements::<dyn IBase>())
            .describe(TypeDescriptor::interface::<dyn IBar>())
            .describe(TypeDescriptor::interface::<dyn IExtra>())
            .describe(TypeDescriptor::class::<Foo>().implements::<dyn IFoo>())
            // re-declares IFoo, which Foo already brings
            .describe(
                TypeDescriptor::class::<Bar>()
                    .extends::<Foo>()
                    .implements::<dyn IFoo>()
                    .implements::<dyn IBar>(),
            )
            .describe(TypeDescriptor::class::<Baz>().extends::<Bar>().implements::<dyn IExtra>())
            .describe(TypeDescriptor::class::<Empty>())
            .build()
            .unwrap()
    }

    #[test]
    fn all_interfaces_include_super_interfaces_and_ancestors() {
        let universe = universe();
        let resolver = InterfaceSetResolver::new(&universe);
        assert_eq!(
            resolver.all_interfaces(&TypeKey::of::<Baz>()),
            vec![
                TypeKey::of::<dyn IExtra>(),
                TypeKey::of::<dyn IFoo>(),
                TypeKey::of::<dyn IBase>(),
                TypeKey::of::<dyn IBar>(),
            ]
        );
    }

    #[test]
    fn root_type_has_only_direct_interfaces() {
        let universe = universe();
        let resolver = InterfaceSetResolver::new(&universe);
        let foo = TypeKey::of::<Foo>();
        assert!(resolver.inherited_interfaces(&foo).is_empty());
        assert_eq!(
            resolver.direct_interfaces(&foo),
            vec![TypeKey::of::<dyn IFoo>(), TypeKey::of::<dyn IBase>()]
        );
    }

    #[test]
    fn redeclared_base_interface_stays_inherited() {
        let universe = universe();
        let resolver = InterfaceSetResolver::new(&universe);
        let bar = TypeKey::of::<Bar>();
        assert_eq!(resolver.direct_interfaces(&bar), vec![TypeKey::of::<dyn IBar>()]);
        assert_eq!(resolver.first_direct_interface(&bar), Some(TypeKey::of::<dyn IBar>()));
        assert!(resolver.inherited_interfaces(&bar).contains(&TypeKey::of::<dyn IFoo>()));
    }

    #[test]
    fn inherited_walks_whole_chain() {
        let universe = universe();
        let resolver = InterfaceSetResolver::new(&universe);
        let baz = TypeKey::of::<Baz>();
        assert_eq!(resolver.ancestors(&baz), vec![TypeKey::of::<Bar>(), TypeKey::of::<Foo>()]);
        assert_eq!(resolver.direct_interfaces(&baz), vec![TypeKey::of::<dyn IExtra>()]);
    }

    #[test]
    fn empty_type_has_no_interfaces() {
        let universe = universe();
        let resolver = InterfaceSetResolver::new(&universe);
        assert_eq!(resolver.first_direct_interface(&TypeKey::of::<Empty>()), None);
    }

    #[test]
    fn where_implements_counts_inherited() {
        let universe = universe();
        let resolver = InterfaceSetResolver::new(&universe);
        let candidates = vec![
            TypeKey::of::<Empty>(),
            TypeKey::of::<Foo>(),
            TypeKey::of::<Bar>(),
            TypeKey::of::<Baz>(),
        ];

        assert_eq!(
            resolver.where_implements(&candidates, &TypeKey::of::<dyn IFoo>()),
            vec![TypeKey::of::<Foo>(), TypeKey::of::<Bar>(), TypeKey::of::<Baz>()]
        );
        assert_eq!(
            resolver.where_implements(&candidates, &TypeKey::of::<dyn IExtra>()),
            vec![TypeKey::of::<Baz>()]
        );
    }
}
