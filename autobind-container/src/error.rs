//! Error types for autobind operations.
//!
//! Every error names the types involved, so a failed composition root
//! tells you which registration or which descriptor to look at.

use std::fmt;

use autobind_support::rendering::render_chain;

use crate::dispatcher::CallShape;
use crate::key::TypeKey;

/// Main error type for all autobind operations.
#[derive(Debug, thiserror::Error)]
pub enum AutobindError {
    /// The container does not publish exactly one entry point for the
    /// requested call shape.
    #[error("{}", .0)]
    AmbiguousOrMissingEntrypoint(EntrypointError),

    /// An entry point was invoked with arguments it does not declare.
    #[error("Entrypoint `{entrypoint}` expects {expected} argument(s), got {found}")]
    ArgumentMismatch {
        entrypoint: &'static str,
        expected: usize,
        found: usize,
    },

    /// A descriptor references a type that was never described.
    #[error("{}", .0)]
    UnknownType(UnknownTypeError),

    /// The same type was described twice.
    #[error("Type described more than once: {0}\n  Hint: keep a single descriptor per type")]
    DuplicateType(TypeKey),

    /// A descriptor links to a type of the wrong kind.
    #[error("Invalid declaration on {key}: {reason}")]
    InvalidDeclaration { key: TypeKey, reason: String },

    /// Base or interface links form a cycle.
    #[error("{}", .0)]
    CyclicHierarchy(CyclicHierarchyError),

    /// A decorator was registered over a contract nobody implements.
    #[error("Decorator {decorator} wraps {component}, which has no registration")]
    UndecoratedComponent {
        decorator: TypeKey,
        component: TypeKey,
    },

    /// The container rejected one registration of a batch; the ones
    /// before it stay registered.
    #[error("Batch registration of {plugin} ← {concrete} failed: {source}")]
    RegistrationFailed {
        plugin: TypeKey,
        concrete: TypeKey,
        source: Box<AutobindError>,
    },
}

/// Error when entry-point selection does not yield exactly one match.
///
/// Signals a mismatch between the resolver and the container, never a
/// data problem, so it is not worth retrying.
#[derive(Debug)]
pub struct EntrypointError {
    /// Type name of the container that was asked
    pub container: &'static str,
    /// Shape of the requested call
    pub shape: CallShape,
    /// How many entry points matched (0 = missing, >1 = ambiguous)
    pub matches: usize,
    /// Contract the registration was for
    pub plugin: TypeKey,
    /// Implementation the registration was for
    pub concrete: TypeKey,
}

impl fmt::Display for EntrypointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matches == 0 {
            write!(
                f,
                "No registration entrypoint on {} accepts a {} call",
                self.container, self.shape,
            )?;
        } else {
            write!(
                f,
                "{} registration entrypoints on {} accept a {} call, expected exactly one",
                self.matches, self.container, self.shape,
            )?;
        }

        write!(f, "\n  Requested: {} ← {}", self.plugin, self.concrete)?;
        write!(
            f,
            "\n  Hint: publish a single `register_instance<plugin, concrete>` entrypoint {}",
            self.shape.requirement(),
        )
    }
}

/// Error when a descriptor references an undescribed type.
#[derive(Debug)]
pub struct UnknownTypeError {
    /// The type that is missing from the universe
    pub requested: TypeKey,
    /// Descriptor that referenced it (if any)
    pub referenced_by: Option<TypeKey>,
    /// Described type names that look similar
    pub suggestions: Vec<String>,
}

impl fmt::Display for UnknownTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type not described: {}", self.requested)?;

        if let Some(ref parent) = self.referenced_by {
            write!(f, "\n  Referenced by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: describe {} in the type universe before referencing it",
            self.requested.type_name()
        )
    }
}

/// Error when the inheritance graph has a cycle.
#[derive(Debug)]
pub struct CyclicHierarchyError {
    /// The chain of types that forms the cycle.
    /// Example: ["A", "B", "A"]
    pub chain: Vec<TypeKey>,
}

impl fmt::Display for CyclicHierarchyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.chain.iter().map(|k| k.type_name()).collect();
        write!(f, "Cyclic type hierarchy:\n  {}", render_chain(&names))
    }
}

/// Convenient Result type for autobind operations.
pub type Result<T> = std::result::Result<T, AutobindError>;
