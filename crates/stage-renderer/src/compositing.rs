//! 2D/3D compositing bridge.
//!
//! A layer that shows its instances in 3D renders its 2D container into an
//! offscreen color target, and the 3D backend displays that target on a
//! plane by aliasing the target's GPU texture into the plane texture. Both
//! backends must share one GPU context for the alias to be valid; this is
//! checked on every bridge.

use crate::backend::{Backend2d, Backend3d, BackendKind, Extent, GpuTextureHandle, RenderTarget};
use crate::config::LayerRendererConfig;
use crate::error::RenderError;
use crate::scene::{DrawContainer, PlaneMesh, Scene3d};

/// Lifecycle of the compositing resources of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositingState {
    /// No 3D scene exists.
    Uninitialized,
    /// The 3D scene, camera and plane exist but there is no offscreen target.
    Configured,
    /// The offscreen target exists and can be bridged.
    Active,
}

/// Result of [`CompositingBridge::bridge_texture_handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// The plane now shows the offscreen target.
    Bridged(GpuTextureHandle),
    /// Compositing was never initialized.
    NotActive,
    /// The 2D backend could not provide an offscreen target.
    NoTarget,
    /// The backends do not share a GPU context.
    ContextMismatch,
    /// The target has no backing GPU texture yet.
    TextureNotReady,
}

impl BridgeOutcome {
    pub fn is_bridged(&self) -> bool {
        matches!(self, BridgeOutcome::Bridged(_))
    }
}

/// Owns the 3D sub-scene and the offscreen target of one layer.
pub struct CompositingBridge {
    layer_name: String,
    state: CompositingState,
    scene: Option<Scene3d>,
    target: Option<Box<dyn RenderTarget>>,
    /// Screen size the target was last sized for.
    target_size: Extent,
    clear_color: [f32; 4],
}

impl CompositingBridge {
    pub fn new(layer_name: impl Into<String>) -> Self {
        Self {
            layer_name: layer_name.into(),
            state: CompositingState::Uninitialized,
            scene: None,
            target: None,
            target_size: Extent::default(),
            clear_color: [0.0; 4],
        }
    }

    pub fn state(&self) -> CompositingState {
        self.state
    }

    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    /// Creates the 3D scene, camera, plane and offscreen target.
    ///
    /// Can only succeed once per bridge.
    pub fn initialize(
        &mut self,
        config: &LayerRendererConfig,
        backend: &mut dyn Backend2d,
    ) -> Result<(), RenderError> {
        if self.state != CompositingState::Uninitialized {
            tracing::error!(
                "Tried to set up 3D rendering for layer '{}' which is already set up",
                self.layer_name
            );
            return Err(RenderError::CompositingAlreadyInitialized {
                layer: self.layer_name.clone(),
            });
        }

        let mut scene = Scene3d::new(&config.camera);
        scene.set_plane(PlaneMesh::new(config.scale_mode));
        self.scene = Some(scene);
        self.clear_color = config.clear_color;
        self.state = CompositingState::Configured;

        self.create_target(backend);
        Ok(())
    }

    fn create_target(&mut self, backend: &mut dyn Backend2d) {
        if backend.kind() != BackendKind::Gpu {
            tracing::debug!(
                "No render target for layer '{}': the 2D backend is not GPU accelerated",
                self.layer_name
            );
            return;
        }

        let size = backend.screen_size();
        let resolution = backend.resolution();
        self.target = Some(backend.create_render_target(size, resolution));
        self.target_size = size;
        self.state = CompositingState::Active;
        tracing::info!(
            "Render target created for layer '{}' ({}x{} @{})",
            self.layer_name,
            size.width,
            size.height,
            resolution
        );
    }

    /// Renders `container` into the offscreen target.
    ///
    /// Returns false when there is no target.
    pub fn render_to_offscreen_target(
        &mut self,
        backend: &mut dyn Backend2d,
        container: &DrawContainer,
    ) -> bool {
        let Some(target) = self.target.as_mut() else {
            return false;
        };

        let screen = backend.screen_size();
        if screen != self.target_size {
            target.resize(screen);
            self.target_size = screen;
            tracing::debug!(
                "Resized render target of layer '{}' to {}x{}",
                self.layer_name,
                screen.width,
                screen.height
            );
        }

        let previous = backend.current_binding();
        backend.bind_render_target(target.as_ref());
        backend.clear(self.clear_color);
        backend.render_container(container, target.as_ref());
        backend.restore_binding(previous);
        true
    }

    /// Makes the plane texture use the offscreen target's GPU texture.
    ///
    /// When the bridge is skipped the plane keeps the previous frame.
    pub fn bridge_texture_handle(
        &mut self,
        backend_3d: &mut dyn Backend3d,
        backend_2d: &dyn Backend2d,
    ) -> BridgeOutcome {
        match self.state {
            CompositingState::Uninitialized => return BridgeOutcome::NotActive,
            CompositingState::Configured => return BridgeOutcome::NoTarget,
            CompositingState::Active => {}
        }
        let (Some(target), Some(plane)) = (
            self.target.as_ref(),
            self.scene.as_mut().and_then(Scene3d::plane_mut),
        ) else {
            return BridgeOutcome::NoTarget;
        };

        let context = backend_2d.context_id();
        if backend_3d.context_id() != Some(context) {
            tracing::trace!(
                "Skipped bridge for layer '{}': backends do not share a GPU context",
                self.layer_name
            );
            return BridgeOutcome::ContextMismatch;
        }

        let Some(handle) = target.raw_texture(context) else {
            tracing::trace!(
                "Skipped bridge for layer '{}': render target has no GPU texture yet",
                self.layer_name
            );
            return BridgeOutcome::TextureNotReady;
        };

        backend_3d.alias_texture(plane.texture.key, handle);
        plane.texture.source = Some(handle);
        BridgeOutcome::Bridged(handle)
    }

    pub fn scene(&self) -> Option<&Scene3d> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene3d> {
        self.scene.as_mut()
    }

    pub fn target(&self) -> Option<&dyn RenderTarget> {
        self.target.as_deref()
    }

    /// Drops the target and empties the 3D scene.
    ///
    /// The bridge cannot be initialized again afterwards.
    pub fn release(&mut self) {
        self.target = None;
        if let Some(scene) = self.scene.as_mut() {
            scene.clear();
        }
    }
}
