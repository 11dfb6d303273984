//! In-memory backends for tests.

use crate::backend::{
    Backend2d, Backend3d, BackendKind, ContextId, Extent, GpuTextureHandle, RenderTarget,
    SharedGpuResource, TargetBinding, TargetId,
};
use crate::scene::{DrawContainer, NodeId, TextureKey};

/// Calls recorded by [`FakeBackend2d`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateTarget(Extent, f32),
    Bind(TargetId),
    Clear([f32; 4]),
    Render(TargetId, Vec<NodeId>),
    Restore(TargetBinding),
}

pub struct FakeTarget {
    id: TargetId,
    size: Extent,
    context: ContextId,
    texture: Option<GpuTextureHandle>,
}

impl SharedGpuResource for FakeTarget {
    fn raw_texture(&self, context: ContextId) -> Option<GpuTextureHandle> {
        if context == self.context {
            self.texture
        } else {
            None
        }
    }
}

impl RenderTarget for FakeTarget {
    fn id(&self) -> TargetId {
        self.id
    }

    fn size(&self) -> Extent {
        self.size
    }

    fn resize(&mut self, size: Extent) {
        self.size = size;
        self.texture = self.texture.map(|handle| GpuTextureHandle(handle.0 + 100));
    }
}

pub struct FakeBackend2d {
    pub kind: BackendKind,
    pub context: ContextId,
    pub screen: Extent,
    pub resolution: f32,
    pub binding: TargetBinding,
    /// Whether created targets get a backing texture
    pub textures_ready: bool,
    pub calls: Vec<Call>,
    next_target: u64,
}

impl FakeBackend2d {
    pub fn gpu(width: u32, height: u32) -> Self {
        Self {
            kind: BackendKind::Gpu,
            context: ContextId(7),
            screen: Extent::new(width, height),
            resolution: 2.0,
            binding: TargetBinding {
                target: None,
                source_frame: Some([0.0, 0.0, width as f32, height as f32]),
            },
            textures_ready: true,
            calls: Vec::new(),
            next_target: 1,
        }
    }

    pub fn software(width: u32, height: u32) -> Self {
        Self {
            kind: BackendKind::Software,
            ..Self::gpu(width, height)
        }
    }
}

impl Backend2d for FakeBackend2d {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn context_id(&self) -> ContextId {
        self.context
    }

    fn screen_size(&self) -> Extent {
        self.screen
    }

    fn resolution(&self) -> f32 {
        self.resolution
    }

    fn create_render_target(&mut self, size: Extent, resolution: f32) -> Box<dyn RenderTarget> {
        self.calls.push(Call::CreateTarget(size, resolution));
        let id = self.next_target;
        self.next_target += 1;
        Box::new(FakeTarget {
            id: TargetId(id),
            size,
            context: self.context,
            texture: self.textures_ready.then_some(GpuTextureHandle(id * 1000)),
        })
    }

    fn current_binding(&self) -> TargetBinding {
        self.binding
    }

    fn bind_render_target(&mut self, target: &dyn RenderTarget) {
        self.calls.push(Call::Bind(target.id()));
        self.binding = TargetBinding {
            target: Some(target.id()),
            source_frame: None,
        };
    }

    fn restore_binding(&mut self, binding: TargetBinding) {
        self.calls.push(Call::Restore(binding));
        self.binding = binding;
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(Call::Clear(color));
    }

    fn render_container(&mut self, container: &DrawContainer, target: &dyn RenderTarget) {
        let painted = container
            .nodes()
            .filter(|node| node.visible)
            .map(|node| node.id)
            .collect();
        self.calls.push(Call::Render(target.id(), painted));
    }
}

#[derive(Default)]
pub struct FakeBackend3d {
    pub context: Option<ContextId>,
    pub aliases: Vec<(TextureKey, GpuTextureHandle)>,
}

impl FakeBackend3d {
    pub fn sharing(backend: &FakeBackend2d) -> Self {
        Self {
            context: Some(backend.context),
            aliases: Vec::new(),
        }
    }
}

impl Backend3d for FakeBackend3d {
    fn context_id(&self) -> Option<ContextId> {
        self.context
    }

    fn alias_texture(&mut self, texture: TextureKey, handle: GpuTextureHandle) {
        self.aliases.push((texture, handle));
    }
}
