//! Value - type-erased, shared result of a producer
//!
//! Bindings in one registry produce unrelated types, so the injector threads
//! them around as `Arc<dyn Any + Send + Sync>` and callers downcast at the
//! point of use. Cloning a `Value` clones the pointer, never the payload:
//! a singleton handed out twice is the same instance both times.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Value {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Value {
    /// Wrap a concrete value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an already shared value without re-allocating
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            type_name: type_name::<T>(),
            inner: value,
        }
    }

    /// Name of the concrete type held (for diagnostics only)
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrow the payload as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Get a shared handle to the payload as `T`
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// True if both values point at the same instance
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}
