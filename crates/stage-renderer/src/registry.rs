//! Mapping from instances to their renderers.

use std::collections::HashMap;

use uuid::Uuid;

use stage_core::{Instance, InstanceSource, ObjectResolver};

use crate::instance_renderer::{InstanceMetrics, RenderedInstance, RendererFactories};
use crate::scene::{DrawContainer, NodeId, Scene3d};

/// A renderer managed by the registry.
pub struct RendererEntry {
    pub renderer: Box<dyn RenderedInstance>,
    /// Object the renderer was created from.
    pub object_name: String,
    /// Set when the instance was visited during the current frame.
    pub was_used: bool,
}

/// Owns the renderers of a layer, keyed by instance id.
///
/// At most one renderer exists per instance id. Releasing a renderer
/// always goes through [`RenderedInstance::on_removed_from_scene`].
pub struct RendererRegistry {
    entries: HashMap<Uuid, RendererEntry>,
    /// Reverse mapping used to route pointer events to instances.
    nodes: HashMap<NodeId, Uuid>,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            nodes: HashMap::new(),
        }
    }

    /// Clears the `was_used` flag of every renderer.
    pub fn begin_frame(&mut self) {
        for entry in self.entries.values_mut() {
            entry.was_used = false;
        }
    }

    /// Returns the renderer of `instance`, creating it on first sight.
    ///
    /// Returns `None` when the referenced object cannot be resolved; the
    /// instance is then skipped until its object exists again. A renderer
    /// created for another object than the one the instance references now
    /// is released and replaced.
    pub fn get_or_create(
        &mut self,
        instance: &Instance,
        objects: &dyn ObjectResolver,
        factories: &RendererFactories,
        container: &mut DrawContainer,
        mut scene_3d: Option<&mut Scene3d>,
    ) -> Option<&mut RendererEntry> {
        if self
            .entries
            .get(&instance.id)
            .is_some_and(|entry| entry.object_name != instance.object_name)
        {
            self.release_where(container, scene_3d.as_deref_mut(), |id, _| {
                *id == instance.id
            });
            tracing::debug!(
                "Instance {} now references '{}', replacing its renderer",
                instance.id,
                instance.object_name
            );
        }
        if !self.entries.contains_key(&instance.id) {
            let definition = objects.resolve(&instance.object_name)?;
            let renderer = factories.create(definition, instance, container, scene_3d);
            self.nodes.insert(renderer.node(), instance.id);
            self.entries.insert(
                instance.id,
                RendererEntry {
                    renderer,
                    object_name: instance.object_name.clone(),
                    was_used: false,
                },
            );
            tracing::debug!(
                "Created renderer for instance {} of '{}'. Total renderers: {}",
                instance.id,
                instance.object_name,
                self.entries.len()
            );
        }
        self.entries.get_mut(&instance.id)
    }

    pub fn get(&self, id: Uuid) -> Option<&RendererEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut RendererEntry> {
        self.entries.get_mut(&id)
    }

    /// Metrics of the renderer of `id`, if one exists.
    pub fn metrics(&self, id: Uuid) -> Option<InstanceMetrics> {
        self.entries.get(&id).map(|entry| entry.renderer.metrics())
    }

    /// Marks the renderer of `id` as visited this frame.
    pub fn mark_used(&mut self, id: Uuid) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.was_used = true;
        }
    }

    /// Instance owning the display node `node`.
    pub fn instance_for_node(&self, node: NodeId) -> Option<Uuid> {
        self.nodes.get(&node).copied()
    }

    /// Releases every renderer whose instance references `object_name`.
    ///
    /// The name is read from `instances`; renderers of instances no longer
    /// found there fall back to the object they were created from. They are
    /// recreated on the next frame if their instances still exist.
    pub fn invalidate_for_object(
        &mut self,
        object_name: &str,
        instances: &dyn InstanceSource,
        container: &mut DrawContainer,
        scene_3d: Option<&mut Scene3d>,
    ) -> usize {
        let released = self.release_where(container, scene_3d, |id, entry| {
            instances
                .instance(*id)
                .map_or(entry.object_name.as_str(), |instance| {
                    instance.object_name.as_str()
                })
                == object_name
        });
        if released > 0 {
            tracing::debug!(
                "Invalidated {} renderers of '{}'",
                released,
                object_name
            );
        }
        released
    }

    /// Releases every renderer that was not visited this frame.
    pub fn reap_unused(
        &mut self,
        container: &mut DrawContainer,
        scene_3d: Option<&mut Scene3d>,
    ) -> usize {
        let released = self.release_where(container, scene_3d, |_, entry| !entry.was_used);
        if released > 0 {
            tracing::debug!(
                "Reclaimed {} unused renderers. Total renderers: {}",
                released,
                self.entries.len()
            );
        }
        released
    }

    /// Releases every renderer.
    pub fn dispose_all(
        &mut self,
        container: &mut DrawContainer,
        scene_3d: Option<&mut Scene3d>,
    ) -> usize {
        self.release_where(container, scene_3d, |_, _| true)
    }

    fn release_where(
        &mut self,
        container: &mut DrawContainer,
        mut scene_3d: Option<&mut Scene3d>,
        mut predicate: impl FnMut(&Uuid, &RendererEntry) -> bool,
    ) -> usize {
        let nodes = &mut self.nodes;
        let before = self.entries.len();
        self.entries.retain(|id, entry| {
            if !predicate(id, entry) {
                return true;
            }
            nodes.remove(&entry.renderer.node());
            entry
                .renderer
                .on_removed_from_scene(container, scene_3d.as_deref_mut());
            false
        });
        before - self.entries.len()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of all instances that currently have a renderer.
    pub fn ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.entries.keys().copied()
    }
}
