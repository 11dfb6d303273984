//! Renderer errors

use crate::config::ConfigError;

/// Errors reported by the layer renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Compositing resources were requested twice for the same layer.
    ///
    /// The 3D sub-scene of a layer cannot be restarted; recreate the layer
    /// renderer instead.
    #[error("Compositing already initialized for layer '{layer}'")]
    CompositingAlreadyInitialized { layer: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
