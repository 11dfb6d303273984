//! Pipeline drawing the display nodes of a layer.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use wgpu::util::DeviceExt;

use crate::scene::DrawContainer;
use crate::view::ViewTransform;

use super::{GpuContext, NODES_SHADER};

/// Display node data - passed as vertex instance
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct NodeInstance {
    /// Top-left corner in scene coordinates
    pub position: [f32; 2],
    pub size: [f32; 2],
    /// Rotation around the center, in radians
    pub angle: f32,
    pub color: [f32; 4],
}

impl NodeInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
        2 => Float32,
        3 => Float32x4
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<NodeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Instances of the visible nodes of `container`, in paint order.
///
/// Empty when the container itself is hidden.
pub fn node_instances(container: &DrawContainer, color: [f32; 4]) -> Vec<NodeInstance> {
    if !container.is_visible() {
        return Vec::new();
    }
    container
        .nodes()
        .filter(|node| node.visible)
        .map(|node| NodeInstance {
            position: node.position.to_array(),
            size: node.size.to_array(),
            angle: node.angle,
            color,
        })
        .collect()
}

/// Projection of the scene area shown by `view` onto clip space.
///
/// Scene y grows downwards, as on the canvas.
pub fn scene_to_clip(view: &dyn ViewTransform) -> Mat4 {
    let top_left = view.to_scene_coordinates(Vec2::ZERO);
    let bottom_right =
        view.to_scene_coordinates(Vec2::new(view.viewport_width(), view.viewport_height()));
    Mat4::orthographic_rh(
        top_left.x,
        bottom_right.x,
        bottom_right.y,
        top_left.y,
        -1.0,
        1.0,
    )
}

/// Node renderer of the 2D backend
pub struct NodePipeline {
    pipeline: wgpu::RenderPipeline,
    view_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    max_instances: u32,
}

impl NodePipeline {
    const INITIAL_INSTANCES: u32 = 256;

    pub fn new(context: &GpuContext, format: wgpu::TextureFormat) -> Self {
        let device = context.device();
        let shader = context.create_shader(NODES_SHADER, "Layer Node Shader");

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Layer Node View Layout"),
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

        let view_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Layer Node View Buffer"),
            contents: bytemuck::cast_slice(&Mat4::IDENTITY.to_cols_array_2d()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Layer Node View Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: view_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Layer Node Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Layer Node Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[NodeInstance::layout()],
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
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let instance_buffer = Self::create_instance_buffer(device, Self::INITIAL_INSTANCES);

        Self {
            pipeline,
            view_buffer,
            bind_group,
            instance_buffer,
            instance_count: 0,
            max_instances: Self::INITIAL_INSTANCES,
        }
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Layer Node Instance Buffer"),
            size: (capacity as usize * std::mem::size_of::<NodeInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Uploads the view projection and the node instances.
    pub fn prepare(&mut self, context: &GpuContext, view_proj: Mat4, instances: &[NodeInstance]) {
        let queue = context.queue();
        queue.write_buffer(
            &self.view_buffer,
            0,
            bytemuck::cast_slice(&view_proj.to_cols_array_2d()),
        );

        let count = instances.len() as u32;
        if count > self.max_instances {
            self.max_instances = count.next_power_of_two();
            self.instance_buffer =
                Self::create_instance_buffer(context.device(), self.max_instances);
        }
        self.instance_count = count;
        if count > 0 {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }
    }

    pub fn render<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        if self.instance_count == 0 {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        render_pass.draw(0..6, 0..self.instance_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewPosition;
    use approx::assert_relative_eq;
    use glam::Vec3;

    const WHITE: [f32; 4] = [1.0; 4];

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<NodeInstance>(), 36);
        let layout = NodeInstance::layout();
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 8, 16, 20]);
    }

    #[test]
    fn test_only_visible_nodes_are_drawn_in_paint_order() {
        let mut container = DrawContainer::new();
        let back = container.add_node();
        let hidden = container.add_node();
        let front = container.add_node();
        container.node_mut(back).unwrap().z_order = Some(5);
        container.node_mut(front).unwrap().position = Vec2::new(10.0, 20.0);
        container.node_mut(hidden).unwrap().visible = false;
        container.sort_by_z_order();

        let instances = node_instances(&container, WHITE);
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].position, [10.0, 20.0]);
        assert_eq!(instances[1].position, [0.0, 0.0]);

        container.set_visible(false);
        assert!(node_instances(&container, WHITE).is_empty());
    }

    #[test]
    fn test_view_corners_map_to_clip_corners() {
        let view = ViewPosition::new(800.0, 600.0).with_center(Vec2::new(400.0, 300.0));
        let clip = scene_to_clip(&view);

        let top_left = clip.project_point3(Vec3::ZERO);
        assert_relative_eq!(top_left.x, -1.0);
        assert_relative_eq!(top_left.y, 1.0);
        let bottom_right = clip.project_point3(Vec3::new(800.0, 600.0, 0.0));
        assert_relative_eq!(bottom_right.x, 1.0);
        assert_relative_eq!(bottom_right.y, -1.0);
        assert!((0.0..=1.0).contains(&top_left.z));
    }
}
