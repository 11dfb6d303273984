//! Scene-space rectangles for selection and culling.

use glam::Vec2;

/// Axis-aligned rectangle in scene coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rectangle {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rectangle from its top-left corner and size.
    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin.x, origin.y, origin.x + size.x, origin.y + size.y)
    }

    /// Creates an empty (inverted) rectangle.
    pub fn empty() -> Self {
        Self::new(f32::MAX, f32::MAX, -f32::MAX, -f32::MAX)
    }

    /// Smallest rectangle containing all given points.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        points
            .into_iter()
            .fold(Self::empty(), |rect, point| rect.expand_to_include(point))
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    pub fn bottom_right(&self) -> Vec2 {
        Vec2::new(self.right, self.bottom)
    }

    /// Corners in the order top-left, bottom-left, bottom-right, top-right.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left, self.top),
            Vec2::new(self.left, self.bottom),
            Vec2::new(self.right, self.bottom),
            Vec2::new(self.right, self.top),
        ]
    }

    pub fn expand_to_include(&self, point: Vec2) -> Rectangle {
        Rectangle {
            left: self.left.min(point.x),
            top: self.top.min(point.y),
            right: self.right.max(point.x),
            bottom: self.bottom.max(point.y),
        }
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x <= self.right
            && point.y >= self.top
            && point.y <= self.bottom
    }

    /// Returns true if the rectangle is valid (non-inverted).
    pub fn is_valid(&self) -> bool {
        self.left <= self.right && self.top <= self.bottom
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// Rotates `points` in place around `center` by `angle` radians.
pub fn rotate_polygon(points: &mut [Vec2], center: Vec2, angle: f32) {
    let rotation = Vec2::from_angle(angle);
    for point in points {
        *point = center + rotation.rotate(*point - center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_size() {
        let rect = Rectangle::new(-1.0, -2.0, 3.0, 4.0);
        assert_eq!(rect.width(), 4.0);
        assert_eq!(rect.height(), 6.0);
        assert_eq!(rect.area(), 24.0);
        assert_eq!(rect.center(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_from_points() {
        let rect = Rectangle::from_points([
            Vec2::new(1.0, 5.0),
            Vec2::new(-2.0, 3.0),
            Vec2::new(4.0, -1.0),
        ]);
        assert_eq!(rect, Rectangle::new(-2.0, -1.0, 4.0, 5.0));
        assert!(!Rectangle::from_points([]).is_valid());
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let mut points = [Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        rotate_polygon(&mut points, Vec2::ZERO, std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(points[0].x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(points[0].y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(points[1].x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(points[1].y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rotate_around_center() {
        let mut points = [Vec2::new(2.0, 1.0)];
        rotate_polygon(&mut points, Vec2::new(1.0, 1.0), std::f32::consts::PI);
        assert_relative_eq!(points[0].x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(points[0].y, 1.0, epsilon = 1e-6);
    }
}
