//! Offscreen color target backed by a wgpu texture.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend::{
    ContextId, Extent, GpuTextureHandle, RenderTarget, SharedGpuResource, TargetId,
};
use crate::constants::compositing::TARGET_FORMAT;

use super::GpuContext;

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// Size in physical pixels of a target of `size` logical pixels.
pub fn physical_size(size: Extent, resolution: f32) -> Extent {
    let scale = |logical: u32| ((logical as f32 * resolution).ceil() as u32).max(1);
    Extent::new(scale(size.width), scale(size.height))
}

/// Descriptor of an offscreen target texture: renderable by the 2D pass and
/// sampled by the 3D plane.
pub fn target_descriptor(size: Extent, resolution: f32) -> wgpu::TextureDescriptor<'static> {
    let physical = physical_size(size, resolution);
    wgpu::TextureDescriptor {
        label: Some("Layer Render Target"),
        size: wgpu::Extent3d {
            width: physical.width,
            height: physical.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    }
}

/// Offscreen color target of a layer.
///
/// The texture view is registered in the context's texture table for as
/// long as the texture lives. Resizing recreates the texture, so the raw
/// handle changes too.
pub struct OffscreenTexture {
    id: TargetId,
    context: GpuContext,
    size: Extent,
    resolution: f32,
    texture: wgpu::Texture,
    view: Arc<wgpu::TextureView>,
    handle: GpuTextureHandle,
}

impl OffscreenTexture {
    pub fn new(context: &GpuContext, size: Extent, resolution: f32) -> Self {
        let (texture, view, handle) = Self::create_texture(context, size, resolution);
        Self {
            id: TargetId(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed)),
            context: context.clone(),
            size,
            resolution,
            texture,
            view,
            handle,
        }
    }

    fn create_texture(
        context: &GpuContext,
        size: Extent,
        resolution: f32,
    ) -> (wgpu::Texture, Arc<wgpu::TextureView>, GpuTextureHandle) {
        let texture = context
            .device()
            .create_texture(&target_descriptor(size, resolution));
        let view = Arc::new(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        let handle = context.textures().insert(Arc::clone(&view));
        (texture, view, handle)
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Handle of the current texture, regardless of context.
    pub fn handle(&self) -> GpuTextureHandle {
        self.handle
    }
}

impl SharedGpuResource for OffscreenTexture {
    fn raw_texture(&self, context: ContextId) -> Option<GpuTextureHandle> {
        self.context.shares_with(context).then_some(self.handle)
    }
}

impl RenderTarget for OffscreenTexture {
    fn id(&self) -> TargetId {
        self.id
    }

    fn size(&self) -> Extent {
        self.size
    }

    fn resize(&mut self, size: Extent) {
        if size == self.size {
            return;
        }
        let (texture, view, handle) = Self::create_texture(&self.context, size, self.resolution);
        self.context.textures().remove(self.handle);
        self.texture.destroy();
        self.texture = texture;
        self.view = view;
        self.handle = handle;
        self.size = size;
    }
}

impl Drop for OffscreenTexture {
    fn drop(&mut self) {
        self.context.textures().remove(self.handle);
        self.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_size_scales_with_resolution() {
        assert_eq!(physical_size(Extent::new(800, 600), 1.0), Extent::new(800, 600));
        assert_eq!(physical_size(Extent::new(800, 600), 2.0), Extent::new(1600, 1200));
        assert_eq!(physical_size(Extent::new(101, 51), 1.5), Extent::new(152, 77));
    }

    #[test]
    fn test_physical_size_is_never_empty() {
        assert_eq!(physical_size(Extent::new(0, 0), 2.0), Extent::new(1, 1));
    }

    #[test]
    fn test_target_descriptor_is_renderable_and_sampled() {
        let descriptor = target_descriptor(Extent::new(640, 480), 1.0);
        assert!(descriptor.usage.contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
        assert!(descriptor.usage.contains(wgpu::TextureUsages::TEXTURE_BINDING));
        assert_eq!(descriptor.format, TARGET_FORMAT);
        assert_eq!(descriptor.mip_level_count, 1);
        assert_eq!(descriptor.size.width, 640);
        assert_eq!(descriptor.size.height, 480);
    }
}
