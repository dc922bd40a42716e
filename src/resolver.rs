//! Injector - lazy, memoized resolution over a validated binding snapshot
//!
//! Resolution is dependency-first and recursive: to produce `name`, every
//! declared dependency is resolved in order, then the producer is called with
//! those values. The snapshot was validated by [`crate::Registry::build`], so
//! the recursion always terminates and every declared reference exists.
//!
//! Singletons move from unresolved to resolved exactly once, on first lookup.
//! Each singleton owns a `OnceLock` created up front, so concurrent first
//! lookups of the same name run its producer once; the losers wait for and
//! share the winner's value. Transient bindings have no cache slot at all.

use crate::binding::{Args, Binding, Dependant, Lifetime};
use crate::name::Identifier;
use crate::value::Value;
use crate::ResolveError;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// An injector filled with dependencies, ready to inject.
///
/// Built by [`crate::Registry::build`]. Its binding set is frozen; later
/// changes to the originating registry do not affect it. `Injector` is
/// `Send + Sync` and can be shared behind an `Arc`.
pub struct Injector {
    bindings: HashMap<Identifier, Binding>,
    /// One slot per singleton binding; transient bindings never appear here
    cache: HashMap<Identifier, OnceLock<Value>>,
}

impl Injector {
    pub(crate) fn new(bindings: HashMap<Identifier, Binding>) -> Self {
        let cache = bindings
            .iter()
            .filter(|(_, binding)| binding.lifetime.is_cached())
            .map(|(name, _)| (name.clone(), OnceLock::new()))
            .collect();
        Self { bindings, cache }
    }

    /// Check if the injector provides `name`
    pub fn has_dependency(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Get the value of a dependency, producing it (and its dependencies)
    /// if needed.
    ///
    /// Fails only when `name` was never registered.
    pub fn get_dependency(&self, name: &str) -> Result<Value, ResolveError> {
        let binding = self
            .bindings
            .get(name)
            .ok_or_else(|| ResolveError::MissingDependency(name.to_string()))?;

        let Some(slot) = self.cache.get(name) else {
            tracing::trace!("Producing transient {:?}", name);
            let args = self.resolve_all(&binding.dependencies)?;
            return Ok(binding.produce(&args));
        };

        if let Some(value) = slot.get() {
            tracing::trace!("Cache hit for {:?}", name);
            return Ok(value.clone());
        }

        // Dependencies are resolved outside the slot so no two slots are
        // ever initialising on the same stack.
        let args = self.resolve_all(&binding.dependencies)?;
        let value = slot.get_or_init(|| {
            tracing::trace!("Producing singleton {:?}", name);
            binding.produce(&args)
        });
        Ok(value.clone())
    }

    /// Get a dependency downcast to `T`
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ResolveError> {
        let value = self.get_dependency(name)?;
        value.downcast::<T>().ok_or_else(|| ResolveError::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<T>(),
            found: value.type_name(),
        })
    }

    /// Call `function` with the values of the listed dependencies, in order,
    /// and return its result.
    pub fn inject<F, R>(&self, dependencies: &[&str], function: F) -> Result<R, ResolveError>
    where
        F: FnOnce(&Args<'_>) -> R,
    {
        let args = self.resolve_all(dependencies)?;
        Ok(function(&Args::new(&args)))
    }

    /// Call a [`Dependant`] with its declared dependencies
    pub fn inject_dependant(&self, dependant: &Dependant) -> Result<Value, ResolveError> {
        let args = self.resolve_all(dependant.dependencies())?;
        Ok(dependant.call(&args))
    }

    fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Value>, ResolveError> {
        names.iter().map(|n| self.get_dependency(n.as_ref())).collect()
    }

    /// Lifetime of a binding, if registered
    pub fn lifetime(&self, name: &str) -> Option<Lifetime> {
        self.bindings.get(name).map(|b| b.lifetime)
    }

    /// True once a singleton has been produced and cached
    pub fn is_resolved(&self, name: &str) -> bool {
        self.cache.get(name).is_some_and(|slot| slot.get().is_some())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(Identifier::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolved = self.cache.values().filter(|slot| slot.get().is_some()).count();
        f.debug_struct("Injector")
            .field("bindings", &self.bindings.len())
            .field("resolved", &resolved)
            .finish()
    }
}
