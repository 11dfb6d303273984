//! Stage Renderer
//!
//! Per-layer instance renderer of the stage editor. A [`LayerRenderer`]
//! keeps one renderer per instance of its layer, culls instances outside the
//! margined view, paints in z-order and reclaims renderers of removed
//! instances. Layers shown in 3D render their 2D content offscreen and
//! display it on a plane in the layer's 3D scene through a shared GPU
//! texture.
//!
//! # Example
//!
//! ```no_run
//! use stage_core::{InitialInstances, Instance, Layer, ObjectDefinition, ObjectsContainer};
//! use stage_renderer::{
//!     FrameContext, LayerRenderer, LayerRendererConfig, RendererFactories, ViewPosition,
//! };
//!
//! let mut objects = ObjectsContainer::new();
//! objects.insert(ObjectDefinition::new("Crate", "Box").with_dimensions(32.0, 32.0, 32.0))?;
//! let mut instances = InitialInstances::new();
//! instances.insert(Instance::new("Crate").with_position(100.0, 50.0))?;
//!
//! let layer = Layer::default();
//! let view = ViewPosition::new(800.0, 600.0);
//! let mut renderer =
//!     LayerRenderer::new("", LayerRendererConfig::default(), RendererFactories::default());
//! let stats = renderer.render(&FrameContext::new(&layer, &instances, &objects, &view));
//! assert_eq!(stats.created, 1);
//! # Ok::<(), stage_core::CoreError>(())
//! ```

pub mod backend;
pub mod compositing;
pub mod config;
pub mod constants;
pub mod error;
pub mod gpu;
pub mod instance_renderer;
pub mod interaction;
pub mod layer_renderer;
pub mod registry;
pub mod scene;
pub mod view;

#[cfg(test)]
mod testing;

pub use backend::{
    Backend2d, Backend3d, BackendKind, ContextId, Extent, GpuTextureHandle, RenderTarget,
    SharedGpuResource, TargetBinding, TargetId,
};
pub use compositing::{BridgeOutcome, CompositingBridge, CompositingState};
pub use config::{CameraConfig, ConfigError, LayerRendererConfig, ScaleMode};
pub use error::RenderError;
pub use gpu::{GpuContext, OffscreenTexture, WgpuBackend2d, WgpuBackend3d};
pub use instance_renderer::{
    BoxRenderer, InstanceMetrics, InstanceRendererFactory, PlaceholderRenderer, RenderedInstance,
    RendererFactories,
};
pub use interaction::{
    InstanceEvent, InstanceEventListener, PointerButton, PointerEvent, PointerEventKind,
};
pub use layer_renderer::{FrameContext, FrameStats, LayerRenderer};
pub use registry::{RendererEntry, RendererRegistry};
pub use scene::{DrawContainer, DrawNode, NodeId, Rectangle, Scene3d, ViewWindow};
pub use view::{ViewPosition, ViewTransform};
