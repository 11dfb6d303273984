//! Backend capability traits.
//!
//! The layer renderer drives two rendering backends that share one GPU
//! context: a retained 2D renderer, which draws the layer's
//! [`DrawContainer`](crate::scene::DrawContainer) into an offscreen
//! [`RenderTarget`], and a 3D renderer, which displays that target on a plane.
//! Each backend adapter implements the traits here instead of the renderer
//! reaching into backend internals.

use serde::{Deserialize, Serialize};

use crate::scene::{DrawContainer, TextureKey};

/// Identity of a GPU context.
///
/// Raw GPU handles are only meaningful inside the context that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u64);

/// Raw handle of a GPU texture, valid within one [`ContextId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuTextureHandle(pub u64);

/// Identity of a render target, used to save and restore bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub u64);

/// Size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Kind of 2D rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// GPU accelerated; its render targets can be shared with the 3D backend.
    Gpu,
    /// CPU rasterizer; nothing can be bridged.
    Software,
}

/// Render target binding saved before drawing offscreen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetBinding {
    /// Bound target, `None` for the screen
    pub target: Option<TargetId>,
    /// Source frame of the binding (x, y, width, height), backend defined
    pub source_frame: Option<[f32; 4]>,
}

/// A GPU resource whose raw handle can be read by another backend.
pub trait SharedGpuResource {
    /// Raw texture handle in `context`, or `None` when the resource has no
    /// backing texture there yet.
    fn raw_texture(&self, context: ContextId) -> Option<GpuTextureHandle>;
}

/// Offscreen color target owned by the compositing bridge.
pub trait RenderTarget: SharedGpuResource {
    fn id(&self) -> TargetId;

    /// Current size in logical pixels.
    fn size(&self) -> Extent;

    /// Resize the backing storage. May replace the backing GPU texture.
    fn resize(&mut self, size: Extent);
}

/// The retained 2D renderer.
pub trait Backend2d {
    fn kind(&self) -> BackendKind;

    fn context_id(&self) -> ContextId;

    /// Current screen size in logical pixels.
    fn screen_size(&self) -> Extent;

    /// Device pixel ratio.
    fn resolution(&self) -> f32;

    /// Allocate an offscreen color target with linear scaling.
    fn create_render_target(&mut self, size: Extent, resolution: f32) -> Box<dyn RenderTarget>;

    fn current_binding(&self) -> TargetBinding;

    fn bind_render_target(&mut self, target: &dyn RenderTarget);

    fn restore_binding(&mut self, binding: TargetBinding);

    /// Clear the bound target.
    fn clear(&mut self, color: [f32; 4]);

    /// Draw the container into `target` without clearing it.
    fn render_container(&mut self, container: &DrawContainer, target: &dyn RenderTarget);
}

/// The 3D renderer.
pub trait Backend3d {
    /// Context the 3D renderer draws with, `None` until it has one.
    fn context_id(&self) -> Option<ContextId>;

    /// Make the renderer's texture `texture` use `handle` as its storage.
    fn alias_texture(&mut self, texture: TextureKey, handle: GpuTextureHandle);
}
