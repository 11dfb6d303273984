//! Built-in renderers drawing an instance as a box.

use glam::{Vec2, Vec3};

use stage_core::{Instance, ObjectDefinition};

use super::{InstanceMetrics, RenderedInstance};
use crate::constants::placeholder;
use crate::scene::{DrawContainer, Node3dId, NodeId, Scene3d};

/// Moves `node` to the instance transform.
fn place_node(container: &mut DrawContainer, node: NodeId, instance: &Instance, size: Vec3) {
    if let Some(draw_node) = container.node_mut(node) {
        draw_node.position = instance.position();
        draw_node.angle = instance.angle_radians();
        draw_node.size = Vec2::new(size.x, size.y);
    }
}

fn instance_size(instance: &Instance, default_size: Vec3) -> Vec3 {
    let [width, height] = instance
        .custom_size
        .unwrap_or([default_size.x, default_size.y]);
    Vec3::new(
        width,
        height,
        instance.custom_depth.unwrap_or(default_size.z),
    )
}

/// Draws a box sized from the object's dimensions, with a 3D node for 3D
/// objects.
#[derive(Debug)]
pub struct BoxRenderer {
    node: NodeId,
    node_3d: Option<Node3dId>,
    default_size: Vec3,
}

impl BoxRenderer {
    pub const KIND: &'static str = "Box";

    pub fn new(
        definition: &ObjectDefinition,
        container: &mut DrawContainer,
        scene_3d: Option<&mut Scene3d>,
    ) -> Self {
        let default_size = definition
            .dimensions
            .unwrap_or(Vec3::new(placeholder::SIZE, placeholder::SIZE, placeholder::SIZE));
        let node_3d = match scene_3d {
            Some(scene) if definition.is_3d => Some(scene.add_node()),
            _ => None,
        };
        Self {
            node: container.add_node(),
            node_3d,
            default_size,
        }
    }

    /// Factory function registered for [`BoxRenderer::KIND`].
    pub fn create(
        definition: &ObjectDefinition,
        _instance: &Instance,
        container: &mut DrawContainer,
        scene_3d: Option<&mut Scene3d>,
    ) -> Box<dyn RenderedInstance> {
        Box::new(Self::new(definition, container, scene_3d))
    }
}

impl RenderedInstance for BoxRenderer {
    fn node(&self) -> NodeId {
        self.node
    }

    fn node_3d(&self) -> Option<Node3dId> {
        self.node_3d
    }

    fn metrics(&self) -> InstanceMetrics {
        InstanceMetrics {
            default_size: self.default_size,
            ..Default::default()
        }
    }

    fn update(
        &mut self,
        instance: &Instance,
        container: &mut DrawContainer,
        scene_3d: Option<&mut Scene3d>,
    ) {
        let size = instance_size(instance, self.default_size);
        place_node(container, self.node, instance, size);

        if let (Some(id), Some(scene)) = (self.node_3d, scene_3d)
            && let Some(node) = scene.node_mut(id)
        {
            // 3D nodes are positioned by their center.
            node.position = Vec3::new(
                instance.x + size.x * 0.5,
                instance.y + size.y * 0.5,
                size.z * 0.5,
            );
            node.rotation = Vec3::new(0.0, 0.0, instance.angle_radians());
            node.size = size;
        }
    }

    fn on_removed_from_scene(
        &mut self,
        container: &mut DrawContainer,
        scene_3d: Option<&mut Scene3d>,
    ) {
        container.remove_node(self.node);
        if let (Some(id), Some(scene)) = (self.node_3d.take(), scene_3d) {
            scene.remove_node(id);
        }
    }
}

/// Fixed-size box shown for objects whose kind has no renderer.
#[derive(Debug)]
pub struct PlaceholderRenderer {
    node: NodeId,
    size: Vec3,
}

impl PlaceholderRenderer {
    pub fn new(container: &mut DrawContainer) -> Self {
        Self {
            node: container.add_node(),
            size: Vec3::new(placeholder::SIZE, placeholder::SIZE, 0.0),
        }
    }

    pub fn set_size(&mut self, size: Vec3) {
        self.size = size;
    }
}

impl RenderedInstance for PlaceholderRenderer {
    fn node(&self) -> NodeId {
        self.node
    }

    fn metrics(&self) -> InstanceMetrics {
        InstanceMetrics {
            default_size: self.size,
            ..Default::default()
        }
    }

    fn update(
        &mut self,
        instance: &Instance,
        container: &mut DrawContainer,
        _scene_3d: Option<&mut Scene3d>,
    ) {
        place_node(container, self.node, instance, instance_size(instance, self.size));
    }

    fn on_removed_from_scene(
        &mut self,
        container: &mut DrawContainer,
        _scene_3d: Option<&mut Scene3d>,
    ) {
        container.remove_node(self.node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    #[test]
    fn test_box_update_moves_node() {
        let mut container = DrawContainer::new();
        let definition = ObjectDefinition::new("Crate", BoxRenderer::KIND)
            .with_dimensions(10.0, 20.0, 5.0);
        let mut renderer = BoxRenderer::new(&definition, &mut container, None);
        let instance = Instance::new("Crate")
            .with_position(3.0, 4.0)
            .with_angle(90.0)
            .with_custom_size(40.0, 50.0);

        renderer.update(&instance, &mut container, None);
        let node = container.node(renderer.node()).unwrap();
        assert_eq!(node.position, Vec2::new(3.0, 4.0));
        assert_eq!(node.size, Vec2::new(40.0, 50.0));
        assert!((node.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(
            renderer.metrics().default_size,
            Vec3::new(10.0, 20.0, 5.0)
        );
    }

    #[test]
    fn test_box_3d_node_follows_instance() {
        let mut container = DrawContainer::new();
        let mut scene = Scene3d::new(&CameraConfig::default());
        let definition = ObjectDefinition::new("Crate", BoxRenderer::KIND)
            .with_dimensions(10.0, 20.0, 30.0)
            .with_3d(true);
        let mut renderer = BoxRenderer::new(&definition, &mut container, Some(&mut scene));

        renderer.update(
            &Instance::new("Crate").with_position(100.0, 200.0),
            &mut container,
            Some(&mut scene),
        );
        let node = scene.node(renderer.node_3d().unwrap()).unwrap();
        assert_eq!(node.position, Vec3::new(105.0, 210.0, 15.0));
        assert_eq!(node.size, Vec3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn test_removal_releases_nodes() {
        let mut container = DrawContainer::new();
        let mut scene = Scene3d::new(&CameraConfig::default());
        let definition = ObjectDefinition::new("Crate", BoxRenderer::KIND).with_3d(true);
        let mut renderer = BoxRenderer::new(&definition, &mut container, Some(&mut scene));
        let node_3d = renderer.node_3d().unwrap();
        scene.attach_to_group(node_3d);

        renderer.on_removed_from_scene(&mut container, Some(&mut scene));
        assert!(container.is_empty());
        assert!(scene.node(node_3d).is_none());
        assert!(scene.group().is_empty());
        assert!(renderer.node_3d().is_none());
    }

    #[test]
    fn test_2d_box_ignores_scene() {
        let mut container = DrawContainer::new();
        let mut scene = Scene3d::new(&CameraConfig::default());
        let definition = ObjectDefinition::new("Tile", BoxRenderer::KIND);
        let renderer = BoxRenderer::new(&definition, &mut container, Some(&mut scene));
        assert!(renderer.node_3d().is_none());
        assert_eq!(scene.node_count(), 0);
    }
}
