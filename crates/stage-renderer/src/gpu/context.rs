//! Shared GPU context.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend::ContextId;

use super::SharedTextures;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Device and queue shared by the 2D and 3D backends of an editor view.
///
/// Each context gets a process-unique [`ContextId`]; raw texture handles are
/// only exchanged between backends holding the same context, and resolve
/// through its [`SharedTextures`] table.
#[derive(Clone)]
pub struct GpuContext {
    id: ContextId,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    textures: SharedTextures,
}

impl GpuContext {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        let id = ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!("Created GPU context {:?}", id);
        Self {
            id,
            device,
            queue,
            textures: SharedTextures::new(),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Shared handle to the device.
    pub fn device_arc(&self) -> Arc<wgpu::Device> {
        Arc::clone(&self.device)
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Texture views of this context, by raw handle.
    pub fn textures(&self) -> &SharedTextures {
        &self.textures
    }

    /// Creates a shader module from WGSL source.
    pub fn create_shader(&self, source: &str, label: &str) -> wgpu::ShaderModule {
        self.device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
    }

    /// Whether `other` is this context.
    pub fn shares_with(&self, other: ContextId) -> bool {
        self.id == other
    }
}
