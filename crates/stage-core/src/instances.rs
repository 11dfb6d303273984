//! Instance container and z-ordered iteration

use uuid::Uuid;

use crate::error::CoreError;
use crate::instance::Instance;

/// Source of the instances placed on a layer.
///
/// Implementations must visit instances in ascending z-order, keeping
/// insertion order among instances with the same key.
pub trait InstanceSource {
    /// Invoke `f` for every instance on `layer`, in z-order.
    fn for_each_in_layer(&self, layer: &str, f: &mut dyn FnMut(&Instance));

    /// The instance with `id`, on any layer.
    fn instance(&self, id: Uuid) -> Option<&Instance>;
}

/// Ordered container of the instances placed in a scene.
#[derive(Debug, Clone, Default)]
pub struct InitialInstances {
    instances: Vec<Instance>,
}

impl InitialInstances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance. Fails if an instance with the same id is present.
    pub fn insert(&mut self, instance: Instance) -> Result<Uuid, CoreError> {
        if self.contains(instance.id) {
            return Err(CoreError::DuplicateInstance(instance.id));
        }
        let id = instance.id;
        self.instances.push(instance);
        Ok(id)
    }

    /// Remove an instance, returning it.
    pub fn remove(&mut self, id: Uuid) -> Result<Instance, CoreError> {
        let index = self
            .instances
            .iter()
            .position(|i| i.id == id)
            .ok_or(CoreError::InstanceNotFound(id))?;
        Ok(self.instances.remove(index))
    }

    pub fn get(&self, id: Uuid) -> Option<&Instance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Instance> {
        self.instances.iter_mut().find(|i| i.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.instances.iter().any(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// All instances in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }

    /// Number of instances referencing `object_name`.
    pub fn count_of_object(&self, object_name: &str) -> usize {
        self.instances
            .iter()
            .filter(|i| i.object_name == object_name)
            .count()
    }

    /// Instances of `layer` sorted by z-order (stable).
    pub fn in_layer_z_ordered(&self, layer: &str) -> Vec<&Instance> {
        let mut on_layer: Vec<&Instance> =
            self.instances.iter().filter(|i| i.layer == layer).collect();
        on_layer.sort_by_key(|i| i.z_order_or_default());
        on_layer
    }
}

impl InstanceSource for InitialInstances {
    fn for_each_in_layer(&self, layer: &str, f: &mut dyn FnMut(&Instance)) {
        for instance in self.in_layer_z_ordered(layer) {
            f(instance);
        }
    }

    fn instance(&self, id: Uuid) -> Option<&Instance> {
        self.get(id)
    }
}
