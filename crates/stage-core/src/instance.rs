//! Placed object instance

use glam::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A placed occurrence of an object definition in a scene.
///
/// Identity is the `id`, which stays stable for the whole lifetime of the
/// instance regardless of where the container stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: Uuid,
    /// Name of the referenced object definition
    pub object_name: String,
    /// Name of the layer the instance is placed on
    pub layer: String,
    pub x: f32,
    pub y: f32,
    /// Rotation in degrees
    pub angle: f32,
    /// Custom width/height override (both are set together)
    pub custom_size: Option<[f32; 2]>,
    /// Custom depth override
    pub custom_depth: Option<f32>,
    /// Paint order key (unset is treated as zero)
    pub z_order: Option<i32>,
    pub locked: bool,
    /// A sealed locked instance cannot even be selected
    pub sealed: bool,
}

impl Instance {
    /// Create an instance of `object_name` at the origin of the base layer.
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            object_name: object_name.into(),
            layer: String::new(),
            x: 0.0,
            y: 0.0,
            angle: 0.0,
            custom_size: None,
            custom_depth: None,
            z_order: None,
            locked: false,
            sealed: false,
        }
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }

    pub fn with_custom_size(mut self, width: f32, height: f32) -> Self {
        self.custom_size = Some([width, height]);
        self
    }

    pub fn with_custom_depth(mut self, depth: f32) -> Self {
        self.custom_depth = Some(depth);
        self
    }

    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = Some(z_order);
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    pub fn with_locked(mut self, locked: bool, sealed: bool) -> Self {
        self.locked = locked;
        self.sealed = sealed;
        self
    }

    /// Position as Vec2
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Rotation in radians
    pub fn angle_radians(&self) -> f32 {
        self.angle.to_radians()
    }

    pub fn has_custom_size(&self) -> bool {
        self.custom_size.is_some()
    }

    pub fn has_custom_depth(&self) -> bool {
        self.custom_depth.is_some()
    }

    /// Paint order key, defaulting to zero when unset
    pub fn z_order_or_default(&self) -> i32 {
        self.z_order.unwrap_or(0)
    }

    /// Whether pointer interaction is blocked by the instance's own lock state.
    pub fn is_sealed_lock(&self) -> bool {
        self.locked && self.sealed
    }
}
