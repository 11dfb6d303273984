//! 3D sub-scene of a layer: root, instance group, camera and the textured
//! plane showing the layer's 2D content.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use crate::backend::GpuTextureHandle;
use crate::config::{CameraConfig, ScaleMode};
use crate::constants::compositing;

static NEXT_TEXTURE_KEY: AtomicU64 = AtomicU64::new(1);

/// Handle to a 3D node in a [`Scene3d`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node3dId(pub u64);

/// Identifies a texture object known to the 3D backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureKey(pub u64);

impl TextureKey {
    /// Allocates a process-unique key.
    pub fn next() -> Self {
        Self(NEXT_TEXTURE_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

/// A mesh node of an instance in the 3D scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Node3d {
    pub id: Node3dId,
    pub position: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    pub size: Vec3,
    pub visible: bool,
}

impl Node3d {
    fn new(id: Node3dId) -> Self {
        Self {
            id,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            size: Vec3::ONE,
            visible: true,
        }
    }
}

/// Perspective camera of a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// Euler angles in radians, applied in `rotation_order`
    pub rotation: Vec3,
    pub rotation_order: EulerRot,
}

impl PerspectiveCamera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            fov_degrees: config.fov_degrees,
            aspect: config.aspect,
            near: config.near_plane,
            far: config.far_plane,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            rotation_order: EulerRot::ZYX,
        }
    }

    pub fn orientation(&self) -> Quat {
        let [a, b, c] = match self.rotation_order {
            EulerRot::ZYX => [self.rotation.z, self.rotation.y, self.rotation.x],
            _ => [self.rotation.x, self.rotation.y, self.rotation.z],
        };
        Quat::from_euler(self.rotation_order, a, b, c)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }
}

/// Texture wrapping mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    ClampToEdge,
    Repeat,
}

/// Which faces of a mesh are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
    Double,
}

/// Texture of the layer plane.
///
/// The pixel data is a 1×1 placeholder; the backing GPU texture is aliased
/// to the offscreen target every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneTexture {
    pub key: TextureKey,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub generate_mipmaps: bool,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub min_filter: ScaleMode,
    pub mag_filter: ScaleMode,
    /// GPU texture currently aliased into this texture, if any.
    pub source: Option<GpuTextureHandle>,
}

impl PlaneTexture {
    pub fn placeholder(scale_mode: ScaleMode) -> Self {
        let size = compositing::PLACEHOLDER_TEXTURE_SIZE;
        Self {
            key: TextureKey::next(),
            width: size,
            height: size,
            data: vec![0; (size * size * 4) as usize],
            generate_mipmaps: false,
            wrap_s: WrapMode::ClampToEdge,
            wrap_t: WrapMode::ClampToEdge,
            min_filter: scale_mode,
            mag_filter: scale_mode,
            source: None,
        }
    }
}

/// Material drawing the plane texture unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneMaterial {
    pub shader_source: &'static str,
    pub transparent: bool,
    pub side: Side,
}

impl Default for PlaneMaterial {
    fn default() -> Self {
        Self {
            shader_source: crate::gpu::PLANE_SHADER,
            transparent: true,
            side: Side::Front,
        }
    }
}

/// Unit quad displaying the layer's 2D content inside the 3D scene.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneMesh {
    pub size: Vec2,
    pub texture: PlaneTexture,
    pub material: PlaneMaterial,
}

impl PlaneMesh {
    pub fn new(scale_mode: ScaleMode) -> Self {
        Self {
            size: Vec2::ONE,
            texture: PlaneTexture::placeholder(scale_mode),
            material: PlaneMaterial::default(),
        }
    }
}

/// The 3D scene of a layer.
///
/// The root is mirrored on its vertical axis so that 3D and 2D agree on
/// which way is up.
pub struct Scene3d {
    pub scale: Vec3,
    visible: bool,
    nodes: HashMap<Node3dId, Node3d>,
    group: Vec<Node3dId>,
    camera: PerspectiveCamera,
    plane: Option<PlaneMesh>,
    next_node: AtomicU64,
}

impl Scene3d {
    pub fn new(camera: &CameraConfig) -> Self {
        Self {
            scale: Vec3::new(1.0, -1.0, 1.0),
            visible: true,
            nodes: HashMap::new(),
            group: Vec::new(),
            camera: PerspectiveCamera::from_config(camera),
            plane: None,
            next_node: AtomicU64::new(1),
        }
    }

    /// Creates a node that is not yet part of the instance group.
    pub fn add_node(&mut self) -> Node3dId {
        let id = Node3dId(self.next_node.fetch_add(1, Ordering::Relaxed));
        self.nodes.insert(id, Node3d::new(id));
        id
    }

    /// Removes a node, detaching it from the group first.
    pub fn remove_node(&mut self, id: Node3dId) -> Option<Node3d> {
        self.detach_from_group(id);
        self.nodes.remove(&id)
    }

    pub fn node(&self, id: Node3dId) -> Option<&Node3d> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: Node3dId) -> Option<&mut Node3d> {
        self.nodes.get_mut(&id)
    }

    /// Adds `id` as the last child of the instance group.
    ///
    /// A node that is already attached moves to the end. Returns false for
    /// unknown nodes.
    pub fn attach_to_group(&mut self, id: Node3dId) -> bool {
        if !self.nodes.contains_key(&id) {
            return false;
        }
        self.detach_from_group(id);
        self.group.push(id);
        true
    }

    pub fn detach_from_group(&mut self, id: Node3dId) {
        self.group.retain(|child| *child != id);
    }

    /// Instance group children in attachment order.
    pub fn group(&self) -> &[Node3dId] {
        &self.group
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    pub fn plane(&self) -> Option<&PlaneMesh> {
        self.plane.as_ref()
    }

    pub fn plane_mut(&mut self) -> Option<&mut PlaneMesh> {
        self.plane.as_mut()
    }

    /// Installs the layer plane. Returns false if one already exists.
    pub fn set_plane(&mut self, plane: PlaneMesh) -> bool {
        if self.plane.is_some() {
            return false;
        }
        self.plane = Some(plane);
        true
    }

    /// Number of nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Removes every node and the plane.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.group.clear();
        self.plane = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_scene_is_mirrored() {
        let scene = Scene3d::new(&CameraConfig::default());
        assert_eq!(scene.scale, Vec3::new(1.0, -1.0, 1.0));
        assert!(scene.is_visible());
        assert!(scene.plane().is_none());
        assert_eq!(scene.camera().rotation_order, EulerRot::ZYX);
        assert_eq!(scene.camera().fov_degrees, 45.0);
        assert_eq!(scene.camera().far, 2000.0);
    }

    #[test]
    fn test_attach_moves_to_end() {
        let mut scene = Scene3d::new(&CameraConfig::default());
        let a = scene.add_node();
        let b = scene.add_node();
        assert!(scene.group().is_empty());

        assert!(scene.attach_to_group(a));
        assert!(scene.attach_to_group(b));
        assert_eq!(scene.group(), &[a, b]);

        assert!(scene.attach_to_group(a));
        assert_eq!(scene.group(), &[b, a]);

        assert!(!scene.attach_to_group(Node3dId(999)));
    }

    #[test]
    fn test_remove_node_detaches() {
        let mut scene = Scene3d::new(&CameraConfig::default());
        let a = scene.add_node();
        scene.attach_to_group(a);

        assert!(scene.remove_node(a).is_some());
        assert!(scene.group().is_empty());
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn test_plane_is_set_once() {
        let mut scene = Scene3d::new(&CameraConfig::default());
        assert!(scene.set_plane(PlaneMesh::new(ScaleMode::Linear)));
        assert!(!scene.set_plane(PlaneMesh::new(ScaleMode::Nearest)));
        assert_eq!(
            scene.plane().unwrap().texture.min_filter,
            ScaleMode::Linear
        );
    }

    #[test]
    fn test_placeholder_texture() {
        let texture = PlaneTexture::placeholder(ScaleMode::Nearest);
        assert_eq!((texture.width, texture.height), (1, 1));
        assert_eq!(texture.data.len(), 4);
        assert!(!texture.generate_mipmaps);
        assert_eq!(texture.wrap_s, WrapMode::ClampToEdge);
        assert_eq!(texture.wrap_t, WrapMode::ClampToEdge);
        assert_eq!(texture.mag_filter, ScaleMode::Nearest);
        assert!(texture.source.is_none());
        assert_ne!(texture.key, PlaneTexture::placeholder(ScaleMode::Nearest).key);
    }

    #[test]
    fn test_plane_material() {
        let plane = PlaneMesh::new(ScaleMode::Linear);
        assert_eq!(plane.size, Vec2::ONE);
        assert!(plane.material.transparent);
        assert_eq!(plane.material.side, Side::Front);
        assert!(plane.material.shader_source.contains("fs_main"));
    }

    #[test]
    fn test_camera_yaw_uses_zyx_order() {
        let mut camera = PerspectiveCamera::from_config(&CameraConfig::default());
        camera.rotation = Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        let forward = camera.orientation() * Vec3::NEG_Z;
        assert_relative_eq!(forward.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(forward.z, 0.0, epsilon = 1e-5);
    }
}
