use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::{ColorRgba, Mat4};
use crate::render::{RenderCtx, RenderError, RenderTarget};
use crate::tracking::PointCloud;

use super::common::{
    begin_load_pass, compile_shader, create_uniform_buffer, depth_state, ensure_capacity,
    primitive, uniform_layout_entry, GrowOnlyCapacity, QuadVertex, QUAD_INDICES, QUAD_VERTICES,
};

const LAYER: &str = "point cloud";

/// Draws tracked feature points as fixed-size screen-space squares.
///
/// Each point is one instance of a unit quad; the instance buffer only grows.
#[derive(Default)]
pub struct PointCloudRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group: Option<wgpu::BindGroup>,
    ubo: Option<wgpu::Buffer>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,

    instance_vbo: Option<wgpu::Buffer>,
    capacity: GrowOnlyCapacity,
}

impl PointCloudRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles the program and allocates static buffers.
    pub fn create(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        let shader = compile_shader(ctx, LAYER, include_str!("shaders/point_cloud.wgsl"))?;

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("point cloud bgl"),
            entries: &[uniform_layout_entry::<PointUniform>(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("point cloud pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("point cloud pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), PointInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive(wgpu::PrimitiveTopology::TriangleList),
            depth_stencil: Some(depth_state(
                ctx.depth_format,
                true,
                wgpu::CompareFunction::LessEqual,
            )),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let ubo = create_uniform_buffer::<PointUniform>(ctx, "point cloud ubo");
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("point cloud bind group"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("point cloud quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("point cloud quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.ubo = Some(ubo);
        self.bind_group = Some(bind_group);
        self.instance_vbo = None;
        self.capacity = GrowOnlyCapacity::default();
        Ok(())
    }

    /// Uploads `cloud` and draws it. Returns the number of points drawn.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        cloud: &PointCloud,
        view_proj: &Mat4,
        point_size: f32,
        color: ColorRgba,
    ) -> Result<usize, RenderError> {
        if self.pipeline.is_none() {
            return Err(RenderError::NotCreated { layer: LAYER });
        }
        if self.pipeline_format != Some(ctx.surface_format) {
            self.create(ctx)?;
        }

        let points = cloud.points();
        ensure_capacity::<PointInstance>(
            ctx,
            "point cloud instance vbo",
            wgpu::BufferUsages::VERTEX,
            &mut self.instance_vbo,
            &mut self.capacity,
            points.len(),
        );
        if points.is_empty() {
            return Ok(0);
        }

        let (Some(pipeline), Some(bind_group), Some(ubo), Some(quad_vbo), Some(quad_ibo), Some(instance_vbo)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.ubo.as_ref(),
            self.quad_vbo.as_ref(),
            self.quad_ibo.as_ref(),
            self.instance_vbo.as_ref(),
        ) else {
            return Err(RenderError::NotCreated { layer: LAYER });
        };

        let u = PointUniform {
            view_proj: view_proj.cols,
            color: color.to_array(),
            params: [
                ctx.viewport.width as f32,
                ctx.viewport.height as f32,
                point_size,
                0.0,
            ],
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
        ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(points));

        let mut rpass = begin_load_pass(target, "point cloud pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..6, 0, 0..points.len() as u32);

        Ok(points.len())
    }

    /// Current instance capacity, in points.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PointUniform {
    view_proj: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

/// Matches the backend's `(x, y, z, confidence)` layout, so clouds upload as-is.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PointInstance {
    point: [f32; 4],
}

impl PointInstance {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
