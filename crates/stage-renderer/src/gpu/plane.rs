//! Pipeline drawing the layer plane in the 3D pass.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::config::ScaleMode;
use crate::scene::{PlaneMesh, Scene3d, Side};

use super::{GpuContext, PLANE_SHADER};

/// Vertex of the layer plane
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PlaneVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl PlaneVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PlaneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Unit quad centered on the origin, facing +Z.
pub const PLANE_VERTICES: [PlaneVertex; 4] = [
    PlaneVertex {
        position: [-0.5, 0.5, 0.0],
        uv: [0.0, 0.0],
    },
    PlaneVertex {
        position: [-0.5, -0.5, 0.0],
        uv: [0.0, 1.0],
    },
    PlaneVertex {
        position: [0.5, -0.5, 0.0],
        uv: [1.0, 1.0],
    },
    PlaneVertex {
        position: [0.5, 0.5, 0.0],
        uv: [1.0, 0.0],
    },
];

/// Counter-clockwise triangles of the quad.
pub const PLANE_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Uniform of the plane shader
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PlaneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
}

impl PlaneUniform {
    /// Uniform for drawing `plane` in `scene`, with the scene's root mirror
    /// applied to the plane transform.
    pub fn new(scene: &Scene3d, plane: &PlaneMesh, plane_transform: Mat4) -> Self {
        let camera = scene.camera();
        let view_proj = camera.projection_matrix() * camera.view_matrix();
        let model = Mat4::from_scale(scene.scale)
            * plane_transform
            * Mat4::from_scale(Vec3::new(plane.size.x, plane.size.y, 1.0));
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
        }
    }

    /// Winding of the quad's front face after the model transform.
    ///
    /// The scene's root mirror reverses the quad's winding.
    pub fn front_face(&self) -> wgpu::FrontFace {
        if Mat4::from_cols_array_2d(&self.model).determinant() < 0.0 {
            wgpu::FrontFace::Cw
        } else {
            wgpu::FrontFace::Ccw
        }
    }
}

/// Faces culled for a material side.
pub fn cull_mode(side: Side) -> Option<wgpu::Face> {
    match side {
        Side::Front => Some(wgpu::Face::Back),
        Side::Back => Some(wgpu::Face::Front),
        Side::Double => None,
    }
}

pub fn primitive_state(side: Side, front_face: wgpu::FrontFace) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        front_face,
        cull_mode: cull_mode(side),
        ..Default::default()
    }
}

/// Texture filter for a scale mode.
pub fn filter_mode(scale_mode: ScaleMode) -> wgpu::FilterMode {
    match scale_mode {
        ScaleMode::Linear => wgpu::FilterMode::Linear,
        ScaleMode::Nearest => wgpu::FilterMode::Nearest,
    }
}

/// Sampler of the plane texture: clamped, no mipmaps.
pub fn sampler_descriptor(scale_mode: ScaleMode) -> wgpu::SamplerDescriptor<'static> {
    let filter = filter_mode(scale_mode);
    wgpu::SamplerDescriptor {
        label: Some("Layer Plane Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    }
}

/// GPU resources drawing layer planes.
///
/// Holds one pipeline per front face winding, picked from the plane's
/// transform at draw time.
pub struct PlanePipeline {
    ccw_pipeline: wgpu::RenderPipeline,
    cw_pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
}

impl PlanePipeline {
    pub fn new(
        context: &GpuContext,
        format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
        scale_mode: ScaleMode,
        side: Side,
    ) -> Self {
        let device = context.device();
        let shader = context.create_shader(PLANE_SHADER, "Layer Plane Shader");

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Layer Plane Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Layer Plane Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Layer Plane Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let create_pipeline = |label: &str, front_face: wgpu::FrontFace| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[PlaneVertex::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: primitive_state(side, front_face),
                // Transparent: depth tested, never written.
                depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                    format,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let ccw_pipeline = create_pipeline("Layer Plane Pipeline", wgpu::FrontFace::Ccw);
        let cw_pipeline = create_pipeline("Layer Plane Pipeline (mirrored)", wgpu::FrontFace::Cw);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Layer Plane Vertex Buffer"),
            contents: bytemuck::cast_slice(&PLANE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Layer Plane Index Buffer"),
            contents: bytemuck::cast_slice(&PLANE_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        let sampler = device.create_sampler(&sampler_descriptor(scale_mode));

        Self {
            ccw_pipeline,
            cw_pipeline,
            uniform_layout,
            texture_layout,
            vertex_buffer,
            index_buffer,
            sampler,
        }
    }

    /// Creates the uniform buffer and bind group of one plane.
    pub fn create_uniform(
        &self,
        context: &GpuContext,
        uniform: &PlaneUniform,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = context
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Layer Plane Uniform Buffer"),
                contents: bytemuck::cast_slice(&[*uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = context
            .device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Layer Plane Uniform Bind Group"),
                layout: &self.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
        (buffer, bind_group)
    }

    /// Binds a texture view to the plane sampler.
    ///
    /// Called again whenever the offscreen target is recreated.
    pub fn bind_texture(
        &self,
        context: &GpuContext,
        view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        context
            .device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Layer Plane Texture Bind Group"),
                layout: &self.texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            })
    }

    /// Draws the plane with the pipeline matching `front_face`.
    pub fn render<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        front_face: wgpu::FrontFace,
        uniform: &'a wgpu::BindGroup,
        texture: &'a wgpu::BindGroup,
    ) {
        let pipeline = match front_face {
            wgpu::FrontFace::Ccw => &self.ccw_pipeline,
            wgpu::FrontFace::Cw => &self.cw_pipeline,
        };
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, uniform, &[]);
        render_pass.set_bind_group(1, texture, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..PLANE_INDICES.len() as u32, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use glam::Vec4;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<PlaneVertex>(), 20);
        let layout = PlaneVertex::layout();
        assert_eq!(layout.array_stride, 20);
        assert_eq!(layout.attributes[1].offset, 12);
    }

    #[test]
    fn test_unit_quad() {
        for vertex in PLANE_VERTICES {
            assert_eq!(vertex.position[0].abs(), 0.5);
            assert_eq!(vertex.position[1].abs(), 0.5);
        }
        // Front facing (counter-clockwise seen from +Z).
        let [a, b, c] = [0, 1, 2].map(|i| quad_corner(i).truncate());
        assert!((b - a).cross(c - a).z > 0.0);
    }

    fn quad_corner(index: usize) -> Vec4 {
        let position = PLANE_VERTICES[PLANE_INDICES[index] as usize].position;
        Vec3::from(position).extend(1.0)
    }

    /// Winding of the first triangle of the quad on screen, as the
    /// rasterizer sees it.
    fn screen_winding(uniform: &PlaneUniform) -> wgpu::FrontFace {
        let transform = Mat4::from_cols_array_2d(&uniform.view_proj)
            * Mat4::from_cols_array_2d(&uniform.model);
        let [a, b, c] = [0, 1, 2].map(|i| {
            let clip = transform * quad_corner(i);
            assert!(clip.w > 0.0);
            Vec3::new(clip.x / clip.w, clip.y / clip.w, 0.0)
        });
        if (b - a).cross(c - a).z > 0.0 {
            wgpu::FrontFace::Ccw
        } else {
            wgpu::FrontFace::Cw
        }
    }

    fn scene_facing_plane() -> Scene3d {
        let mut scene = Scene3d::new(&CameraConfig::default());
        scene.camera_mut().position = Vec3::new(0.0, 0.0, 2.0);
        scene
    }

    #[test]
    fn test_mirrored_plane_is_front_facing() {
        let scene = scene_facing_plane();
        let plane = PlaneMesh::new(ScaleMode::Linear);
        let uniform = PlaneUniform::new(&scene, &plane, Mat4::IDENTITY);

        assert_eq!(screen_winding(&uniform), wgpu::FrontFace::Cw);
        assert_eq!(uniform.front_face(), screen_winding(&uniform));
    }

    #[test]
    fn test_unmirrored_plane_is_front_facing() {
        let scene = scene_facing_plane();
        let plane = PlaneMesh::new(ScaleMode::Linear);
        let uniform = PlaneUniform::new(&scene, &plane, Mat4::from_scale(scene.scale));

        assert_eq!(screen_winding(&uniform), wgpu::FrontFace::Ccw);
        assert_eq!(uniform.front_face(), wgpu::FrontFace::Ccw);
    }

    #[test]
    fn test_cull_mode_follows_material_side() {
        let front = primitive_state(Side::Front, wgpu::FrontFace::Cw);
        assert_eq!(front.cull_mode, Some(wgpu::Face::Back));
        assert_eq!(front.front_face, wgpu::FrontFace::Cw);
        assert_eq!(cull_mode(Side::Back), Some(wgpu::Face::Front));
        assert_eq!(cull_mode(Side::Double), None);
    }

    #[test]
    fn test_filter_follows_scale_mode() {
        assert_eq!(filter_mode(ScaleMode::Linear), wgpu::FilterMode::Linear);
        assert_eq!(filter_mode(ScaleMode::Nearest), wgpu::FilterMode::Nearest);

        let sampler = sampler_descriptor(ScaleMode::Nearest);
        assert_eq!(sampler.mag_filter, wgpu::FilterMode::Nearest);
        assert_eq!(sampler.address_mode_u, wgpu::AddressMode::ClampToEdge);
        assert_eq!(sampler.address_mode_v, wgpu::AddressMode::ClampToEdge);
    }

    #[test]
    fn test_shader_entry_points() {
        assert!(PLANE_SHADER.contains("fn vs_main"));
        assert!(PLANE_SHADER.contains("fn fs_main"));
    }

    #[test]
    fn test_uniform_applies_scene_mirror() {
        let scene = Scene3d::new(&CameraConfig::default());
        let plane = PlaneMesh::new(ScaleMode::Linear);
        let uniform = PlaneUniform::new(&scene, &plane, Mat4::IDENTITY);

        let model = Mat4::from_cols_array_2d(&uniform.model);
        let top = model * Vec4::new(0.0, 0.5, 0.0, 1.0);
        assert_eq!(top.y, -0.5);
    }
}
