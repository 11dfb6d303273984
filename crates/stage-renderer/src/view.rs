//! View transform between screen and scene coordinates.

use glam::Vec2;

/// Maps screen (canvas) coordinates to scene coordinates.
pub trait ViewTransform {
    fn to_scene_coordinates(&self, screen: Vec2) -> Vec2;

    /// Viewport width in screen pixels.
    fn viewport_width(&self) -> f32;

    /// Viewport height in screen pixels.
    fn viewport_height(&self) -> f32;
}

/// Editor view: a scene point shown at the center of the canvas with a zoom factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPosition {
    /// Scene point at the center of the canvas
    pub center: Vec2,
    pub zoom: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewPosition {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            center: Vec2::ZERO,
            zoom: 1.0,
            width,
            height,
        }
    }

    pub fn with_center(mut self, center: Vec2) -> Self {
        self.center = center;
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Inverse of [`ViewTransform::to_scene_coordinates`].
    pub fn to_screen_coordinates(&self, scene: Vec2) -> Vec2 {
        (scene - self.center) * self.zoom + self.size() * 0.5
    }

    fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl ViewTransform for ViewPosition {
    fn to_scene_coordinates(&self, screen: Vec2) -> Vec2 {
        (screen - self.size() * 0.5) / self.zoom + self.center
    }

    fn viewport_width(&self) -> f32 {
        self.width
    }

    fn viewport_height(&self) -> f32 {
        self.height
    }
}
