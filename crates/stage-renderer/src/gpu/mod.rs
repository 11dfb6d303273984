//! wgpu adapter for the compositing resources.
//!
//! [`WgpuBackend2d`] draws display nodes into [`OffscreenTexture`]s and
//! [`WgpuBackend3d`] shows them on layer planes. Both resolve raw texture
//! handles through the [`SharedTextures`] table of their [`GpuContext`].

mod backend2d;
mod backend3d;
mod context;
mod nodes;
mod offscreen;
mod plane;
mod textures;

pub use backend2d::WgpuBackend2d;
pub use backend3d::WgpuBackend3d;
pub use context::GpuContext;
pub use nodes::{NodeInstance, NodePipeline, node_instances, scene_to_clip};
pub use offscreen::{OffscreenTexture, physical_size, target_descriptor};
pub use plane::{
    PLANE_INDICES, PLANE_VERTICES, PlanePipeline, PlaneUniform, PlaneVertex, cull_mode,
    filter_mode, primitive_state, sampler_descriptor,
};
pub use textures::{SharedTextures, TextureTable};

/// WGSL source of the layer plane shader.
pub const PLANE_SHADER: &str = include_str!("../shaders/plane.wgsl");

/// WGSL source of the display node shader.
pub const NODES_SHADER: &str = include_str!("../shaders/nodes.wgsl");
