//! Layer renderer configuration
//!
//! Settings are serializable so they can be stored with the editor
//! preferences and loaded from RON files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{camera, compositing, culling};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Texture scaling filter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ScaleMode {
    #[default]
    Linear,
    Nearest,
}

/// Layer camera configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Initial aspect ratio
    pub aspect: f32,
    /// Near clipping plane distance
    pub near_plane: f32,
    /// Far clipping plane distance
    pub far_plane: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: camera::FOV_DEGREES,
            aspect: camera::ASPECT,
            near_plane: camera::NEAR_PLANE,
            far_plane: camera::FAR_PLANE,
        }
    }
}

/// Complete layer renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayerRendererConfig {
    /// Culling margin around the viewport, in screen pixels
    pub view_margin: f32,
    /// Render the layer's instances inside a 3D scene
    pub show_instances_in_3d: bool,
    /// Filter of the plane texture showing the 2D content in 3D
    pub scale_mode: ScaleMode,
    /// Layer camera
    pub camera: CameraConfig,
    /// Offscreen clear color (RGBA)
    pub clear_color: [f32; 4],
}

impl Default for LayerRendererConfig {
    fn default() -> Self {
        Self {
            view_margin: culling::VIEW_MARGIN,
            show_instances_in_3d: false,
            scale_mode: ScaleMode::default(),
            camera: CameraConfig::default(),
            clear_color: compositing::CLEAR_COLOR,
        }
    }
}

impl LayerRendererConfig {
    /// Configuration of a layer composited into a 3D scene.
    pub fn with_3d() -> Self {
        Self {
            show_instances_in_3d: true,
            ..Default::default()
        }
    }

    /// Parse a configuration from RON text. Missing fields take their defaults.
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }

    /// Load a configuration from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&content)?;
        tracing::info!("Loaded layer renderer config from {:?}", path);
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = LayerRendererConfig::default();
        assert_eq!(config.view_margin, 100.0);
        assert!(!config.show_instances_in_3d);
        assert_eq!(config.camera.fov_degrees, 45.0);
        assert_eq!(config.camera.far_plane, 2000.0);
        assert_eq!(config.clear_color, [0.0; 4]);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config =
            LayerRendererConfig::from_ron_str("(show_instances_in_3d: true, scale_mode: Nearest)")
                .unwrap();
        assert!(config.show_instances_in_3d);
        assert_eq!(config.scale_mode, ScaleMode::Nearest);
        assert_eq!(config.view_margin, 100.0);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_invalid_ron() {
        let result = LayerRendererConfig::from_ron_str("(view_margin: \"wide\")");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let config = LayerRendererConfig {
            view_margin: 64.0,
            ..LayerRendererConfig::with_3d()
        };
        file.write_all(config.to_ron_string().unwrap().as_bytes())
            .unwrap();

        let loaded = LayerRendererConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = LayerRendererConfig::load(dir.path().join("missing.ron"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
