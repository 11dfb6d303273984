//! Stage Core
//!
//! Scene data model consumed by the stage editor renderers: placed object
//! [`Instance`]s, the [`Layer`]s they live on, and the [`ObjectDefinition`]s
//! they reference.
//!
//! Renderers never mutate this model. They read it through two collaborator
//! traits:
//!
//! - [`InstanceSource`] - z-ordered iteration over the instances of a layer
//! - [`ObjectResolver`] - object name to definition lookup

pub mod error;
pub mod instance;
pub mod instances;
pub mod layer;
pub mod object;

pub use error::CoreError;
pub use instance::Instance;
pub use instances::{InitialInstances, InstanceSource};
pub use layer::Layer;
pub use object::{ObjectDefinition, ObjectResolver, ObjectScope, ObjectsContainer};
