//! Registry - accumulates named bindings and builds validated injectors
//!
//! ```
//! use injector::{BuildError, Registry};
//!
//! let mut registry = Registry::new();
//! registry.register_factory("f1", &["f2"], |_| 1).unwrap();
//!
//! assert!(matches!(
//!     registry.build(),
//!     Err(BuildError::MissingDependency { .. })
//! ));
//! ```

use crate::binding::{producer, Args, Binding, Dependant, Lifetime};
use crate::config::WiringConfig;
use crate::graph::DependencyGraph;
use crate::name::Identifier;
use crate::resolver::Injector;
use crate::value::Value;
use crate::{BuildError, RegistrationError};
use std::any::Any;
use std::collections::HashMap;

/// Builder for [`Injector`]s. One canonical mapping `name → binding`;
/// a name is taken iff it is a key.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    bindings: HashMap<Identifier, Binding>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value to a name. The injector always returns this exact
    /// instance.
    pub fn register_value<T>(&mut self, name: impl Into<String>, value: T) -> Result<(), RegistrationError>
    where
        T: Any + Send + Sync,
    {
        self.insert(name, Binding::constant(Value::new(value)))
    }

    /// Bind a factory to a name. The injector calls `factory` at most once,
    /// the first time the name is used, with the values of `dependencies`.
    pub fn register_factory<F, T>(
        &mut self,
        name: impl Into<String>,
        dependencies: &[&str],
        factory: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(&Args<'_>) -> T + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        self.insert(
            name,
            Binding::new(producer(factory), owned(dependencies), Lifetime::Singleton),
        )
    }

    /// Bind a service to a name. The injector calls `service` on every
    /// lookup, with freshly resolved `dependencies`, and never caches it.
    pub fn register_service<F, T>(
        &mut self,
        name: impl Into<String>,
        dependencies: &[&str],
        service: F,
    ) -> Result<(), RegistrationError>
    where
        F: Fn(&Args<'_>) -> T + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        self.insert(
            name,
            Binding::new(producer(service), owned(dependencies), Lifetime::Transient),
        )
    }

    /// Register a producer built with [`crate::depends_on`]
    pub fn register_dependant(
        &mut self,
        name: impl Into<String>,
        dependant: Dependant,
        lifetime: Lifetime,
    ) -> Result<(), RegistrationError> {
        self.insert(name, dependant.into_binding(lifetime))
    }

    /// Register every `[values]` entry of a wiring file as a value binding
    /// holding a `toml::Value`. Stops at the first bad or duplicate name.
    pub fn register_config_values(&mut self, config: &WiringConfig) -> Result<(), RegistrationError> {
        for (name, value) in &config.values {
            self.register_value(name.clone(), value.clone())?;
        }
        Ok(())
    }

    fn insert(&mut self, name: impl Into<String>, binding: Binding) -> Result<(), RegistrationError> {
        let name = Identifier::new(name)?;
        if self.bindings.contains_key(&name) {
            return Err(RegistrationError::DuplicateName(name.into_string()));
        }
        tracing::debug!(
            "Registered {} binding {:?} (dependencies: {:?})",
            binding.lifetime,
            name.as_str(),
            binding.dependencies
        );
        self.bindings.insert(name, binding);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(Identifier::as_str)
    }

    /// Adjacency view of the current bindings
    pub fn dependency_graph(&self) -> DependencyGraph {
        self.bindings
            .iter()
            .map(|(name, binding)| (name.to_string(), binding.dependencies.clone()))
            .collect()
    }

    /// Validate the bindings and snapshot them into a new [`Injector`].
    ///
    /// Missing references are checked before cycles. The registry is left
    /// untouched and can keep registering or build again.
    pub fn build(&self) -> Result<Injector, BuildError> {
        let graph = self.dependency_graph();

        if let Some(&(binding, dependency)) = graph.missing_dependencies().first() {
            tracing::warn!("Build failed: {} requires unregistered {}", binding, dependency);
            return Err(BuildError::MissingDependency {
                binding: binding.to_string(),
                dependency: dependency.to_string(),
            });
        }

        if graph.has_circular_dependencies() {
            let bindings: Vec<String> = graph
                .cyclic_bindings()
                .into_iter()
                .map(str::to_string)
                .collect();
            tracing::warn!("Build failed: circular dependency among {:?}", bindings);
            return Err(BuildError::CircularDependency { bindings });
        }

        tracing::debug!("Built injector with {} bindings", self.bindings.len());
        Ok(Injector::new(self.bindings.clone()))
    }
}

fn owned(dependencies: &[&str]) -> Vec<String> {
    dependencies.iter().map(|d| d.to_string()).collect()
}
