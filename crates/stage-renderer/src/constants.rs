//! Renderer constants

/// Culling defaults
pub mod culling {
    /// Margin around the viewport, in screen pixels. Instances dragged
    /// slightly past the canvas edge must stay rendered.
    pub const VIEW_MARGIN: f32 = 100.0;
}

/// Layer camera defaults
pub mod camera {
    pub const FOV_DEGREES: f32 = 45.0;
    pub const ASPECT: f32 = 1.0;
    pub const NEAR_PLANE: f32 = 0.1;
    pub const FAR_PLANE: f32 = 2000.0;
}

/// Compositing defaults
pub mod compositing {
    /// Offscreen clear color (fully transparent)
    pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

    /// Size of the placeholder texture created before the first bridge
    pub const PLACEHOLDER_TEXTURE_SIZE: u32 = 1;

    /// Format of the offscreen color target
    pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Fill color of display nodes drawn by the wgpu 2D backend
    pub const NODE_COLOR: [f32; 4] = [0.55, 0.7, 0.9, 0.8];
}

/// Placeholder renderer defaults
pub mod placeholder {
    /// Size of the box drawn for objects without a dedicated renderer
    pub const SIZE: f32 = 32.0;
}
