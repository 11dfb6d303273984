//! Instance bounds and viewport culling.
//!
//! Culling is a linear bounding-box test per instance.

use glam::{Vec2, Vec3};

use stage_core::Instance;

use super::bounds::{Rectangle, rotate_polygon};
use crate::instance_renderer::InstanceMetrics;
use crate::view::ViewTransform;

/// Left edge of the instance before rotation.
pub fn unrotated_left(instance: &Instance, metrics: Option<&InstanceMetrics>) -> f32 {
    instance.x - metrics.map_or(0.0, |m| m.origin.x)
}

/// Top edge of the instance before rotation.
pub fn unrotated_top(instance: &Instance, metrics: Option<&InstanceMetrics>) -> f32 {
    instance.y - metrics.map_or(0.0, |m| m.origin.y)
}

/// Width, height and depth: custom overrides first, then the renderer's
/// natural size, then zero.
pub fn unrotated_size(instance: &Instance, metrics: Option<&InstanceMetrics>) -> Vec3 {
    let default_size = metrics.map_or(Vec3::ZERO, |m| m.default_size);
    let [width, height] = instance
        .custom_size
        .unwrap_or([default_size.x, default_size.y]);
    let depth = instance.custom_depth.unwrap_or(default_size.z);
    Vec3::new(width, height, depth)
}

/// Bounding box ignoring rotation.
pub fn unrotated_bounds(instance: &Instance, metrics: Option<&InstanceMetrics>) -> Rectangle {
    let size = unrotated_size(instance, metrics);
    let left = unrotated_left(instance, metrics);
    let top = unrotated_top(instance, metrics);
    Rectangle::new(left, top, left + size.x, top + size.y)
}

/// Axis-aligned bounding box of the rotated instance.
pub fn rotated_bounds(instance: &Instance, metrics: Option<&InstanceMetrics>) -> Rectangle {
    let angle = instance.angle_radians();
    let unrotated = unrotated_bounds(instance, metrics);
    if angle == 0.0 {
        return unrotated;
    }

    let center = metrics
        .and_then(|m| m.center)
        .map(|offset| unrotated.top_left() + offset)
        .unwrap_or_else(|| unrotated.center());

    let mut corners = unrotated.corners();
    rotate_polygon(&mut corners, center, angle);
    Rectangle::from_points(corners)
}

/// Scene-space window used for culling, derived from the view every frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewWindow {
    pub top_left: Vec2,
    pub bottom_right: Vec2,
}

impl ViewWindow {
    pub fn new(top_left: Vec2, bottom_right: Vec2) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Visible scene area extended by `margin` screen pixels on every side.
    pub fn from_view(view: &dyn ViewTransform, margin: f32) -> Self {
        Self {
            top_left: view.to_scene_coordinates(Vec2::new(-margin, -margin)),
            bottom_right: view.to_scene_coordinates(Vec2::new(
                view.viewport_width() + margin,
                view.viewport_height() + margin,
            )),
        }
    }

    /// Whether `aabb` touches the window. Edge contact counts as visible.
    pub fn intersects(&self, aabb: &Rectangle) -> bool {
        !(aabb.left + aabb.width() < self.top_left.x
            || aabb.top + aabb.height() < self.top_left.y
            || aabb.left > self.bottom_right.x
            || aabb.top > self.bottom_right.y)
    }
}

/// Whether the rotated bounding box of `instance` touches `window`.
pub fn is_visible(
    instance: &Instance,
    metrics: Option<&InstanceMetrics>,
    window: &ViewWindow,
) -> bool {
    window.intersects(&rotated_bounds(instance, metrics))
}
