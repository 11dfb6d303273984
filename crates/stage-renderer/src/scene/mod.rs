//! Scene-side state of a layer: the 2D draw container, the optional 3D
//! sub-scene, and the bounds math used for culling and selection.

mod bounds;
mod container;
mod culling;
mod scene3d;

pub use bounds::*;
pub use container::*;
pub use culling::*;
pub use scene3d::*;
