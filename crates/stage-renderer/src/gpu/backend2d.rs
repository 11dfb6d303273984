//! wgpu implementation of the 2D backend.

use glam::Mat4;

use crate::backend::{Backend2d, BackendKind, ContextId, Extent, RenderTarget, TargetBinding};
use crate::constants::compositing::{NODE_COLOR, TARGET_FORMAT};
use crate::scene::DrawContainer;
use crate::view::ViewTransform;

use super::{GpuContext, NodePipeline, OffscreenTexture, node_instances, scene_to_clip};

/// 2D backend drawing display nodes into [`OffscreenTexture`]s.
///
/// A clear requested with [`Backend2d::clear`] is applied as the load
/// operation of the next pass on the bound target.
pub struct WgpuBackend2d {
    context: GpuContext,
    screen: Extent,
    resolution: f32,
    binding: TargetBinding,
    pending_clear: Option<[f32; 4]>,
    view_proj: Mat4,
    node_color: [f32; 4],
    nodes: NodePipeline,
}

impl WgpuBackend2d {
    pub fn new(context: &GpuContext, screen: Extent, resolution: f32) -> Self {
        Self {
            nodes: NodePipeline::new(context, TARGET_FORMAT),
            context: context.clone(),
            screen,
            resolution,
            binding: TargetBinding::default(),
            pending_clear: None,
            view_proj: Mat4::IDENTITY,
            node_color: NODE_COLOR,
        }
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    /// Follows a canvas resize; offscreen targets are resized on their next render.
    pub fn set_screen_size(&mut self, screen: Extent) {
        self.screen = screen;
    }

    pub fn set_resolution(&mut self, resolution: f32) {
        self.resolution = resolution;
    }

    /// Sets the scene area drawn by the following passes.
    pub fn set_view(&mut self, view: &dyn ViewTransform) {
        self.view_proj = scene_to_clip(view);
    }

    pub fn set_node_color(&mut self, color: [f32; 4]) {
        self.node_color = color;
    }

    fn load_op(&mut self) -> wgpu::LoadOp<wgpu::Color> {
        match self.pending_clear.take() {
            Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            }),
            None => wgpu::LoadOp::Load,
        }
    }
}

impl Backend2d for WgpuBackend2d {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    fn context_id(&self) -> ContextId {
        self.context.id()
    }

    fn screen_size(&self) -> Extent {
        self.screen
    }

    fn resolution(&self) -> f32 {
        self.resolution
    }

    fn create_render_target(&mut self, size: Extent, resolution: f32) -> Box<dyn RenderTarget> {
        Box::new(OffscreenTexture::new(&self.context, size, resolution))
    }

    fn current_binding(&self) -> TargetBinding {
        self.binding
    }

    fn bind_render_target(&mut self, target: &dyn RenderTarget) {
        let size = target.size();
        self.binding = TargetBinding {
            target: Some(target.id()),
            source_frame: Some([0.0, 0.0, size.width as f32, size.height as f32]),
        };
        self.pending_clear = None;
    }

    fn restore_binding(&mut self, binding: TargetBinding) {
        self.binding = binding;
        self.pending_clear = None;
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.pending_clear = Some(color);
    }

    fn render_container(&mut self, container: &DrawContainer, target: &dyn RenderTarget) {
        let Some(view) = target
            .raw_texture(self.context.id())
            .and_then(|handle| self.context.textures().get(handle))
        else {
            tracing::warn!(
                "Render target {:?} has no texture in GPU context {:?}",
                target.id(),
                self.context.id()
            );
            return;
        };

        let instances = node_instances(container, self.node_color);
        self.nodes.prepare(&self.context, self.view_proj, &instances);
        let load = self.load_op();

        let device = self.context.device();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Layer Offscreen Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Layer Offscreen Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: view.as_ref(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.nodes.render(&mut render_pass);
        }
        self.context.queue().submit(Some(encoder.finish()));
        tracing::trace!(
            "Drew {} nodes into render target {:?}",
            instances.len(),
            target.id()
        );
    }
}
