use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type-keyed registry of host services exposed to plugins.
///
/// The host registers shared values (a database handle, a route table, a
/// list of active features...) before the supervisor starts; plugins look
/// them up by concrete type from their entry points.
#[derive(Default)]
pub struct ExtensionRegistry {
    // Keyed by the TypeId of the concrete type
    instances: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ExtensionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            instances: HashMap::new(),
        }
    }

    /// Register a value, replacing any previous value of the same type.
    /// Returns the replaced value if there was one.
    pub fn register<T>(&mut self, value: Arc<T>) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.instances
            .insert(TypeId::of::<T>(), value)
            .and_then(|previous| previous.downcast::<T>().ok())
    }

    /// Get a value by its concrete type.
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.instances
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|arc_any| arc_any.downcast::<T>().ok())
    }

    pub fn remove<T>(&mut self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.instances
            .remove(&TypeId::of::<T>())
            .and_then(|arc_any| arc_any.downcast::<T>().ok())
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.instances.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Clear all instances.
    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("len", &self.instances.len())
            .finish_non_exhaustive()
    }
}
