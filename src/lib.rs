//! # Injector - named dependency injection
//!
//! Callers register named producers of values ("bindings") together with the
//! names of the bindings they require, then build a validated [`Injector`]
//! that constructs values lazily on demand.
//!
//! Injector provides:
//! - A [`Registry`] builder that enforces name validity and uniqueness
//! - Build-time validation of the declared [`DependencyGraph`] (missing references, cycles)
//! - Lazy, recursive, dependency-first resolution with per-name memoization
//! - Singleton and transient (service) binding lifetimes
//! - A TOML wiring file format and a CLI to check wiring files
//!
//! ## Values are type-erased
//!
//! Bindings in one registry produce values of unrelated types, so every
//! resolved value is carried as a [`Value`] (a shared, type-erased pointer).
//! Producers receive their dependencies as [`Args`] and downcast them by
//! position; callers downcast the result with [`Injector::get`] or
//! [`Value::downcast`].
//!
//! ```
//! use injector::Registry;
//!
//! let mut registry = Registry::new();
//! registry.register_value("x", 1i64).unwrap();
//! registry
//!     .register_factory("double", &["x"], |args| *args.get::<i64>(0) * 2)
//!     .unwrap();
//!
//! let injector = registry.build().unwrap();
//! assert_eq!(*injector.get::<i64>("double").unwrap(), 2);
//! ```

pub mod name;
pub mod value;
pub mod binding;
pub mod graph;
pub mod registry;
pub mod resolver;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use binding::{depends_on, Args, Binding, Dependant, Lifetime};
pub use graph::{DependencyGraph, GraphStats};
pub use name::Identifier;
pub use registry::Registry;
pub use resolver::Injector;
pub use value::Value;

/// Result type alias for Injector operations
pub type Result<T> = std::result::Result<T, Error>;

/// Raised at a `register_*` call. Indicates a defect in the caller's static wiring.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("Bad name: {0:?}")]
    BadName(String),

    #[error("Duplicate name: {0}")]
    DuplicateName(String),
}

/// Raised by [`Registry::build`] when the declared graph is not resolvable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("Missing dependency: {binding} requires unregistered {dependency}")]
    MissingDependency { binding: String, dependency: String },

    #[error("Circular dependency among: {}", bindings.join(", "))]
    CircularDependency { bindings: Vec<String> },
}

/// Raised by lookups on a built [`Injector`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Missing dependency name: {0}")]
    MissingDependency(String),

    #[error("Type mismatch for {name}: expected {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Error types for Injector operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Config error: {0}")]
    Config(String),
}
