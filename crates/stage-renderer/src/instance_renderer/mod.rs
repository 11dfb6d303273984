//! Per-instance renderers.
//!
//! A [`RenderedInstance`] owns the display node of one instance in the 2D
//! container and, for 3D-capable objects, a node in the layer's 3D scene.
//! Renderers are produced by [`RendererFactories`], keyed on the object kind.

mod box_renderer;
mod factory;

pub use box_renderer::{BoxRenderer, PlaceholderRenderer};
pub use factory::{InstanceRendererFactory, RendererFactories};

use glam::{Vec2, Vec3};

use stage_core::Instance;

use crate::scene::{DrawContainer, Node3dId, NodeId, Scene3d};

/// Geometry a renderer reports about its object.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InstanceMetrics {
    /// Offset of the instance position from the unrotated top-left corner.
    pub origin: Vec2,
    /// Rotation center relative to the unrotated top-left corner; the
    /// geometric center is used when `None`.
    pub center: Option<Vec2>,
    /// Natural width, height and depth of the object.
    pub default_size: Vec3,
}

/// Live visual representation of one instance.
pub trait RenderedInstance {
    /// Display node in the layer's 2D container.
    fn node(&self) -> NodeId;

    /// Node in the layer's 3D scene, for 3D-capable objects.
    fn node_3d(&self) -> Option<Node3dId> {
        None
    }

    fn metrics(&self) -> InstanceMetrics;

    /// Updates the on-screen transform and appearance from `instance`.
    ///
    /// Only called for instances that survived culling.
    fn update(
        &mut self,
        instance: &Instance,
        container: &mut DrawContainer,
        scene_3d: Option<&mut Scene3d>,
    );

    /// Releases backend resources and detaches the nodes from their parents.
    fn on_removed_from_scene(
        &mut self,
        container: &mut DrawContainer,
        scene_3d: Option<&mut Scene3d>,
    );
}
