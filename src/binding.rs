//! Binding types - a producer, the names it requires, and its caching policy
//!
//! A producer declares its dependencies by name. At resolution time the
//! injector resolves those names in declared order and hands the values to the
//! producer positionally as [`Args`]: `args.get::<T>(0)` is the value of the
//! first declared dependency, and so on. Duplicated names are passed twice.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Caching policy of a binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// Produced at most once per injector, then cached (values and factories)
    #[default]
    Singleton,
    /// Produced fresh on every lookup, never cached (services)
    Transient,
}

impl Lifetime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Transient => "transient",
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Lifetime::Singleton)
    }
}

impl FromStr for Lifetime {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singleton" | "factory" | "value" => Ok(Lifetime::Singleton),
            "transient" | "service" => Ok(Lifetime::Transient),
            _ => Err(crate::Error::Config(format!("Unknown lifetime: {}", s))),
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolved dependency values handed to a producer, in declared order.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The raw value at `index`
    pub fn value(&self, index: usize) -> &'a Value {
        match self.values.get(index) {
            Some(value) => value,
            None => panic!(
                "producer asked for argument {} but only {} dependencies were declared",
                index,
                self.values.len()
            ),
        }
    }

    /// Borrow the argument at `index` as `T`.
    ///
    /// # Panics
    ///
    /// If `index` is out of range or the value is not a `T`. Both are wiring
    /// defects in the caller: the producer disagrees with its declared
    /// dependency list.
    pub fn get<T: Any>(&self, index: usize) -> &'a T {
        let value = self.value(index);
        match value.downcast_ref::<T>() {
            Some(v) => v,
            None => panic!(
                "argument {} is a {}, not a {}",
                index,
                value.type_name(),
                std::any::type_name::<T>()
            ),
        }
    }

    /// Shared handle to the argument at `index`. Panics like [`Args::get`].
    pub fn arc<T: Any + Send + Sync>(&self, index: usize) -> Arc<T> {
        let value = self.value(index);
        match value.downcast::<T>() {
            Some(v) => v,
            None => panic!(
                "argument {} is a {}, not a {}",
                index,
                value.type_name(),
                std::any::type_name::<T>()
            ),
        }
    }

    /// Non-panicking variant of [`Args::get`]
    pub fn try_get<T: Any>(&self, index: usize) -> Option<&'a T> {
        self.values.get(index).and_then(Value::downcast_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Value> {
        self.values.iter()
    }
}

/// Type-erased producer. Called with exactly as many arguments as the
/// binding declares dependencies.
pub type Producer = Arc<dyn Fn(&Args<'_>) -> Value + Send + Sync>;

/// Wrap a typed closure into a [`Producer`]
pub fn producer<F, T>(f: F) -> Producer
where
    F: Fn(&Args<'_>) -> T + Send + Sync + 'static,
    T: Any + Send + Sync,
{
    Arc::new(move |args: &Args<'_>| Value::new(f(args)))
}

/// A registered producer with its dependency names and lifetime.
#[derive(Clone)]
pub struct Binding {
    pub producer: Producer,
    pub dependencies: Vec<String>,
    pub lifetime: Lifetime,
}

impl Binding {
    pub fn new(producer: Producer, dependencies: Vec<String>, lifetime: Lifetime) -> Self {
        Self {
            producer,
            dependencies,
            lifetime,
        }
    }

    /// A singleton that always yields `value` itself
    pub fn constant(value: Value) -> Self {
        Self::new(Arc::new(move |_: &Args<'_>| value.clone()), Vec::new(), Lifetime::Singleton)
    }

    /// Invoke the producer with already-resolved dependency values
    pub fn produce(&self, values: &[Value]) -> Value {
        debug_assert_eq!(values.len(), self.dependencies.len());
        (self.producer)(&Args::new(values))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("dependencies", &self.dependencies)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

/// A producer paired with the names it depends on, ready to be registered
/// or injected. Built with [`depends_on`].
#[derive(Clone)]
pub struct Dependant {
    producer: Producer,
    dependencies: Vec<String>,
}

impl Dependant {
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    /// Call the wrapped producer directly, bypassing any injector
    pub fn call(&self, values: &[Value]) -> Value {
        (self.producer)(&Args::new(values))
    }

    pub fn into_binding(self, lifetime: Lifetime) -> Binding {
        Binding::new(self.producer, self.dependencies, lifetime)
    }
}

impl fmt::Debug for Dependant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependant")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Attach dependency names to a producer.
///
/// ```
/// use injector::{depends_on, Lifetime, Registry};
///
/// let greeting = depends_on(&["name"], |args| format!("hello {}", args.get::<&str>(0)));
///
/// let mut registry = Registry::new();
/// registry.register_value("name", "world").unwrap();
/// registry.register_dependant("greeting", greeting, Lifetime::Singleton).unwrap();
///
/// let injector = registry.build().unwrap();
/// assert_eq!(*injector.get::<String>("greeting").unwrap(), "hello world");
/// ```
pub fn depends_on<F, T>(dependencies: &[&str], f: F) -> Dependant
where
    F: Fn(&Args<'_>) -> T + Send + Sync + 'static,
    T: Any + Send + Sync,
{
    Dependant {
        producer: producer(f),
        dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
    }
}
