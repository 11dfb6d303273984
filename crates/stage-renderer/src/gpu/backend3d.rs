//! wgpu implementation of the 3D backend.

use std::collections::HashMap;

use bytemuck::Zeroable;
use glam::Mat4;

use crate::backend::{Backend3d, ContextId, GpuTextureHandle};
use crate::scene::{PlaneMesh, Scene3d, TextureKey};

use super::{GpuContext, PlanePipeline, PlaneUniform};

struct PlaneBinding {
    handle: GpuTextureHandle,
    bind_group: wgpu::BindGroup,
}

/// 3D backend drawing layer planes.
///
/// Aliasing a plane texture rebinds it to the view registered for the
/// handle in the context's texture table.
pub struct WgpuBackend3d {
    context: GpuContext,
    pipeline: PlanePipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    planes: HashMap<TextureKey, PlaneBinding>,
}

impl WgpuBackend3d {
    /// Creates the backend for planes configured like `plane`.
    pub fn new(
        context: &GpuContext,
        format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
        plane: &PlaneMesh,
    ) -> Self {
        let pipeline = PlanePipeline::new(
            context,
            format,
            depth_format,
            plane.texture.mag_filter,
            plane.material.side,
        );
        let (uniform_buffer, uniform_bind_group) =
            pipeline.create_uniform(context, &PlaneUniform::zeroed());
        Self {
            context: context.clone(),
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            planes: HashMap::new(),
        }
    }

    /// Handle the plane texture `texture` currently samples.
    pub fn bound_texture(&self, texture: TextureKey) -> Option<GpuTextureHandle> {
        self.planes.get(&texture).map(|binding| binding.handle)
    }

    /// Forgets the binding of `texture`.
    pub fn release(&mut self, texture: TextureKey) {
        self.planes.remove(&texture);
    }

    /// Draws the scene's plane over `color`, placed by `transform`.
    ///
    /// Returns false when nothing was drawn: the scene is hidden, has no
    /// plane, or its plane texture was never aliased. `depth` must be given
    /// if and only if the backend was created with a depth format.
    pub fn render_plane(
        &self,
        scene: &Scene3d,
        transform: Mat4,
        color: &wgpu::TextureView,
        depth: Option<&wgpu::TextureView>,
    ) -> bool {
        if !scene.is_visible() {
            return false;
        }
        let Some(plane) = scene.plane() else {
            return false;
        };
        let Some(binding) = self.planes.get(&plane.texture.key) else {
            return false;
        };

        let uniform = PlaneUniform::new(scene, plane, transform);
        self.context
            .queue()
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));

        let device = self.context.device();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Layer Plane Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Layer Plane Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: depth.map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.pipeline.render(
                &mut render_pass,
                uniform.front_face(),
                &self.uniform_bind_group,
                &binding.bind_group,
            );
        }
        self.context.queue().submit(Some(encoder.finish()));
        true
    }
}

impl Backend3d for WgpuBackend3d {
    fn context_id(&self) -> Option<ContextId> {
        Some(self.context.id())
    }

    fn alias_texture(&mut self, texture: TextureKey, handle: GpuTextureHandle) {
        if self.bound_texture(texture) == Some(handle) {
            return;
        }
        let Some(view) = self.context.textures().get(handle) else {
            tracing::warn!(
                "Cannot alias plane texture {:?}: no texture registered for {:?}",
                texture,
                handle
            );
            return;
        };
        let bind_group = self.pipeline.bind_texture(&self.context, &view);
        self.planes.insert(texture, PlaneBinding { handle, bind_group });
        tracing::debug!("Plane texture {:?} now samples {:?}", texture, handle);
    }
}
