//! Binding lifecycles.
//!
//! A lifecycle tells the container how many instances a binding
//! produces:
//! - [`Lifecycle::Singleton`] — one instance for the entire application
//! - [`Lifecycle::Scoped`] — one instance per scope (e.g., HTTP request)
//! - [`Lifecycle::Transient`] — new instance every time
//!
//! The resolver only forwards lifecycles; acting on them is the
//! container's business.

use std::fmt;

use serde::Serialize;

/// Defines how long instances produced by a binding live.
///
/// # Examples
/// ```
/// use autobind_container::lifecycle::Lifecycle;
///
/// assert_eq!(Lifecycle::default(), Lifecycle::Singleton);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Lifecycle {
    /// One instance shared across the entire application.
    ///
    /// Used when a registration does not ask for a lifecycle.
    #[default]
    Singleton,

    /// One instance per scope (e.g., per HTTP request).
    Scoped,

    /// New instance created on every resolve call.
    Transient,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Singleton => write!(f, "Singleton"),
            Lifecycle::Scoped => write!(f, "Scoped"),
            Lifecycle::Transient => write!(f, "Transient"),
        }
    }
}
