//! Frame driver of one layer.
//!
//! [`LayerRenderer::render`] runs once per displayed frame:
//!
//! 1. recompute the margined view window from the view transform
//! 2. visit the layer's instances in z-order: look up or create the
//!    renderer, cull, update visible renderers and attach their 3D nodes
//! 3. sort the container by z-order
//! 4. mirror the layer visibility
//! 5. reclaim renderers whose instance was not visited
//!
//! Layers shown in 3D additionally call
//! [`LayerRenderer::render_to_offscreen_target`] and then
//! [`LayerRenderer::bridge_texture_handle`] before the 3D pass.

use glam::Vec3;
use uuid::Uuid;

use stage_core::{Instance, InstanceSource, Layer, ObjectResolver};

use crate::backend::{Backend2d, Backend3d};
use crate::compositing::{BridgeOutcome, CompositingBridge, CompositingState};
use crate::config::LayerRendererConfig;
use crate::error::RenderError;
use crate::instance_renderer::{RenderedInstance, RendererFactories};
use crate::interaction::{self, InstanceEventListener, PointerEvent};
use crate::registry::RendererRegistry;
use crate::scene::{
    self, DrawContainer, Node3dId, NodeId, PerspectiveCamera, PlaneMesh, Rectangle, Scene3d,
    ViewWindow,
};
use crate::view::ViewTransform;

/// Collaborators of one frame.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    pub layer: &'a Layer,
    pub instances: &'a dyn InstanceSource,
    pub objects: &'a dyn ObjectResolver,
    pub view: &'a dyn ViewTransform,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        layer: &'a Layer,
        instances: &'a dyn InstanceSource,
        objects: &'a dyn ObjectResolver,
        view: &'a dyn ViewTransform,
    ) -> Self {
        Self {
            layer,
            instances,
            objects,
            view,
        }
    }
}

/// Counters of one [`LayerRenderer::render`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Instances visited on the layer
    pub visited: usize,
    /// Visited instances that survived culling
    pub visible: usize,
    /// Renderers created this frame
    pub created: usize,
    /// Instances skipped because their object could not be resolved
    pub skipped: usize,
    /// Renderers released because their instance was not visited
    pub reclaimed: usize,
}

/// Renders the instances of one layer.
pub struct LayerRenderer {
    layer_name: String,
    config: LayerRendererConfig,
    factories: RendererFactories,
    registry: RendererRegistry,
    container: DrawContainer,
    compositing: CompositingBridge,
    view_window: ViewWindow,
    released: bool,
}

impl LayerRenderer {
    /// Creates a renderer without compositing resources.
    pub fn new(
        layer_name: impl Into<String>,
        config: LayerRendererConfig,
        factories: RendererFactories,
    ) -> Self {
        let layer_name = layer_name.into();
        Self {
            compositing: CompositingBridge::new(layer_name.clone()),
            layer_name,
            config,
            factories,
            registry: RendererRegistry::new(),
            container: DrawContainer::new(),
            view_window: ViewWindow::default(),
            released: false,
        }
    }

    /// Creates a renderer, setting up 3D rendering when the configuration
    /// asks for it.
    pub fn with_backend(
        layer_name: impl Into<String>,
        config: LayerRendererConfig,
        factories: RendererFactories,
        backend: &mut dyn Backend2d,
    ) -> Result<Self, RenderError> {
        let mut renderer = Self::new(layer_name, config, factories);
        if renderer.config.show_instances_in_3d {
            renderer.setup_3d_rendering(backend)?;
        }
        Ok(renderer)
    }

    /// Creates the 3D scene, camera, plane and offscreen target.
    ///
    /// Fails if they were already created for this layer.
    pub fn setup_3d_rendering(&mut self, backend: &mut dyn Backend2d) -> Result<(), RenderError> {
        self.compositing.initialize(&self.config, backend)?;
        tracing::info!("3D rendering set up for layer '{}'", self.layer_name);
        Ok(())
    }

    /// Updates the renderers of the layer for one frame.
    pub fn render(&mut self, frame: &FrameContext<'_>) -> FrameStats {
        self.view_window = ViewWindow::from_view(frame.view, self.config.view_margin);
        self.registry.begin_frame();

        let mut stats = FrameStats::default();
        frame
            .instances
            .for_each_in_layer(&frame.layer.name, &mut |instance| {
                self.render_instance(instance, frame, &mut stats);
            });

        self.apply_z_order();
        self.apply_layer_visibility(frame.layer.visible);
        stats.reclaimed = self
            .registry
            .reap_unused(&mut self.container, self.compositing.scene_mut());

        tracing::trace!(
            "Layer '{}' frame: {} visited, {} visible, {} created, {} skipped, {} reclaimed",
            self.layer_name,
            stats.visited,
            stats.visible,
            stats.created,
            stats.skipped,
            stats.reclaimed
        );
        stats
    }

    fn render_instance(
        &mut self,
        instance: &Instance,
        frame: &FrameContext<'_>,
        stats: &mut FrameStats,
    ) {
        stats.visited += 1;

        let existed = self
            .registry
            .get(instance.id)
            .is_some_and(|entry| entry.object_name == instance.object_name);
        let Some(entry) = self.registry.get_or_create(
            instance,
            frame.objects,
            &self.factories,
            &mut self.container,
            self.compositing.scene_mut(),
        ) else {
            stats.skipped += 1;
            return;
        };
        if !existed {
            stats.created += 1;
        }

        let metrics = entry.renderer.metrics();
        let visible = self
            .view_window
            .intersects(&scene::rotated_bounds(instance, Some(&metrics)));

        if let Some(node) = self.container.node_mut(entry.renderer.node()) {
            node.z_order = instance.z_order;
            node.visible = visible;
            node.interactive = !(frame.layer.locked || instance.is_sealed_lock());
        }

        if visible {
            stats.visible += 1;
            entry
                .renderer
                .update(instance, &mut self.container, self.compositing.scene_mut());
            if let (Some(node_3d), Some(scene)) =
                (entry.renderer.node_3d(), self.compositing.scene_mut())
            {
                scene.attach_to_group(node_3d);
            }
        }

        entry.was_used = true;
    }

    /// Sorts the container by the z-order of the last update.
    pub fn apply_z_order(&mut self) {
        self.container.sort_by_z_order();
    }

    /// Shows or hides the container and the 3D scene together.
    pub fn apply_layer_visibility(&mut self, visible: bool) {
        self.container.set_visible(visible);
        if let Some(scene) = self.compositing.scene_mut() {
            scene.set_visible(visible);
        }
    }

    /// Returns the renderer of `instance`, creating it if needed.
    pub fn get_or_create_renderer(
        &mut self,
        instance: &Instance,
        objects: &dyn ObjectResolver,
    ) -> Option<&dyn RenderedInstance> {
        self.registry
            .get_or_create(
                instance,
                objects,
                &self.factories,
                &mut self.container,
                self.compositing.scene_mut(),
            )
            .map(|entry| &*entry.renderer)
    }

    /// Releases the renderers of every instance of `object_name`; they are
    /// recreated on the next frame.
    pub fn reset_renderers_for(
        &mut self,
        object_name: &str,
        instances: &dyn InstanceSource,
    ) -> usize {
        self.registry.invalidate_for_object(
            object_name,
            instances,
            &mut self.container,
            self.compositing.scene_mut(),
        )
    }

    pub fn unrotated_instance_left(&self, instance: &Instance) -> f32 {
        scene::unrotated_left(instance, self.registry.metrics(instance.id).as_ref())
    }

    pub fn unrotated_instance_top(&self, instance: &Instance) -> f32 {
        scene::unrotated_top(instance, self.registry.metrics(instance.id).as_ref())
    }

    /// Width, height and depth of `instance`.
    pub fn unrotated_instance_size(&self, instance: &Instance) -> Vec3 {
        scene::unrotated_size(instance, self.registry.metrics(instance.id).as_ref())
    }

    pub fn unrotated_instance_aabb(&self, instance: &Instance) -> Rectangle {
        scene::unrotated_bounds(instance, self.registry.metrics(instance.id).as_ref())
    }

    /// Axis-aligned bounding box of the rotated instance.
    pub fn instance_aabb(&self, instance: &Instance) -> Rectangle {
        scene::rotated_bounds(instance, self.registry.metrics(instance.id).as_ref())
    }

    /// Routes a pointer event on `node` to `listener`.
    ///
    /// Hidden and non-interactive nodes get no events. Returns the number of
    /// delivered events.
    pub fn handle_pointer_event(
        &self,
        node: NodeId,
        event: &PointerEvent,
        view: &dyn ViewTransform,
        listener: &mut dyn InstanceEventListener,
    ) -> usize {
        let Some(draw_node) = self.container.node(node) else {
            return 0;
        };
        if !self.container.is_visible() || !draw_node.visible || !draw_node.interactive {
            return 0;
        }
        match self.registry.instance_for_node(node) {
            Some(instance) => interaction::dispatch(event, instance, view, listener),
            None => 0,
        }
    }

    /// Renders the container into the offscreen target.
    pub fn render_to_offscreen_target(&mut self, backend: &mut dyn Backend2d) -> bool {
        self.compositing
            .render_to_offscreen_target(backend, &self.container)
    }

    /// Shows the offscreen target on the 3D plane.
    pub fn bridge_texture_handle(
        &mut self,
        backend_3d: &mut dyn Backend3d,
        backend_2d: &dyn Backend2d,
    ) -> BridgeOutcome {
        self.compositing.bridge_texture_handle(backend_3d, backend_2d)
    }

    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    pub fn config(&self) -> &LayerRendererConfig {
        &self.config
    }

    pub fn container(&self) -> &DrawContainer {
        &self.container
    }

    pub fn view_window(&self) -> ViewWindow {
        self.view_window
    }

    pub fn compositing_state(&self) -> CompositingState {
        self.compositing.state()
    }

    pub fn scene_3d(&self) -> Option<&Scene3d> {
        self.compositing.scene()
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.compositing.scene().map(Scene3d::camera)
    }

    pub fn camera_mut(&mut self) -> Option<&mut PerspectiveCamera> {
        self.compositing.scene_mut().map(Scene3d::camera_mut)
    }

    pub fn plane_mesh(&self) -> Option<&PlaneMesh> {
        self.compositing.scene().and_then(Scene3d::plane)
    }

    pub fn has_renderer(&self, id: Uuid) -> bool {
        self.registry.contains(id)
    }

    pub fn renderer_count(&self) -> usize {
        self.registry.len()
    }

    /// Display node of the renderer of `id`.
    pub fn node_of(&self, id: Uuid) -> Option<NodeId> {
        self.registry.get(id).map(|entry| entry.renderer.node())
    }

    /// 3D node of the renderer of `id`.
    pub fn node_3d_of(&self, id: Uuid) -> Option<Node3dId> {
        self.registry
            .get(id)
            .and_then(|entry| entry.renderer.node_3d())
    }

    /// Releases every renderer and the compositing resources.
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let released = self
            .registry
            .dispose_all(&mut self.container, self.compositing.scene_mut());
        self.container.clear();
        self.compositing.release();
        tracing::debug!(
            "Released layer renderer '{}' and {} instance renderers",
            self.layer_name,
            released
        );
    }
}

impl Drop for LayerRenderer {
    fn drop(&mut self) {
        self.release();
    }
}
