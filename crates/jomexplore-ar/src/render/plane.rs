use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::coords::{ColorRgba, Mat4, Vec3};
use crate::render::{RenderCtx, RenderError, RenderTarget};
use crate::tracking::Plane;

use super::common::{
    alpha_blend, begin_load_pass, compile_shader, create_uniform_buffer, depth_state,
    ensure_capacity, primitive, uniform_layout_entry, ColoredUniform, GrowOnlyCapacity,
};

const LAYER: &str = "planes";

/// Draws tracked planes as translucent polygons.
///
/// Depth is tested but never written so planes do not occlude models placed on them.
#[derive(Default)]
pub struct PlaneRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group: Option<wgpu::BindGroup>,
    ubo: Option<wgpu::Buffer>,

    vbo: Option<wgpu::Buffer>,
    capacity: GrowOnlyCapacity,
}

impl PlaneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        let shader = compile_shader(ctx, LAYER, include_str!("shaders/plane.wgsl"))?;

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("plane bgl"),
            entries: &[uniform_layout_entry::<ColoredUniform>(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("plane pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("plane pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[PlaneVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive(wgpu::PrimitiveTopology::TriangleList),
            depth_stencil: Some(depth_state(
                ctx.depth_format,
                false,
                wgpu::CompareFunction::LessEqual,
            )),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let ubo = create_uniform_buffer::<ColoredUniform>(ctx, "plane ubo");
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("plane bind group"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.ubo = Some(ubo);
        self.bind_group = Some(bind_group);
        self.vbo = None;
        self.capacity = GrowOnlyCapacity::default();
        Ok(())
    }

    /// Draws every tracking plane in `planes`, in order. Returns the number drawn.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        planes: &[Plane],
        view_proj: &Mat4,
        tint: ColorRgba,
    ) -> Result<usize, RenderError> {
        if self.pipeline.is_none() {
            return Err(RenderError::NotCreated { layer: LAYER });
        }
        if self.pipeline_format != Some(ctx.surface_format) {
            self.create(ctx)?;
        }

        let mesh = PlaneMesh::build(planes);
        if mesh.ranges.is_empty() {
            return Ok(0);
        }

        ensure_capacity::<PlaneVertex>(
            ctx,
            "plane vbo",
            wgpu::BufferUsages::VERTEX,
            &mut self.vbo,
            &mut self.capacity,
            mesh.vertices.len(),
        );

        let (Some(pipeline), Some(bind_group), Some(ubo), Some(vbo)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.ubo.as_ref(),
            self.vbo.as_ref(),
        ) else {
            return Err(RenderError::NotCreated { layer: LAYER });
        };

        let u = ColoredUniform {
            view_proj: view_proj.cols,
            color: tint.to_array(),
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
        ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&mesh.vertices));

        let mut rpass = begin_load_pass(target, "plane pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        for range in &mesh.ranges {
            rpass.draw(range.clone(), 0..1);
        }

        Ok(mesh.ranges.len())
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub(crate) struct PlaneVertex {
    pub pos: [f32; 3],
    pub local: [f32; 2],
}

impl PlaneVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // world position
        1 => Float32x2  // plane-local xz
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PlaneVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// World-space triangle fans for a batch of planes, one vertex range per plane.
#[derive(Debug, Default)]
pub(crate) struct PlaneMesh {
    pub vertices: Vec<PlaneVertex>,
    pub ranges: Vec<Range<u32>>,
}

impl PlaneMesh {
    /// Triangulates every tracking plane with at least 3 boundary vertices.
    ///
    /// Boundary polygons are convex, so a fan from the first vertex covers them.
    pub fn build(planes: &[Plane]) -> Self {
        let mut mesh = PlaneMesh::default();

        for plane in planes {
            if !plane.tracking_state.is_tracking() || plane.polygon.len() < 3 {
                continue;
            }

            let start = mesh.vertices.len() as u32;
            let vertex = |[x, z]: [f32; 2]| PlaneVertex {
                pos: plane.center_pose.transform_point(Vec3::new(x, 0.0, z)).to_array(),
                local: [x, z],
            };

            let first = plane.polygon[0];
            for pair in plane.polygon[1..].windows(2) {
                mesh.vertices.push(vertex(first));
                mesh.vertices.push(vertex(pair[0]));
                mesh.vertices.push(vertex(pair[1]));
            }

            mesh.ranges.push(start..mesh.vertices.len() as u32);
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Pose;
    use crate::tracking::TrackingState;

    fn plane(id: u64, state: TrackingState, polygon: Vec<[f32; 2]>) -> Plane {
        Plane {
            id,
            center_pose: Pose::from_translation(Vec3::new(0.0, -1.0, 0.0)),
            extent_x: 1.0,
            extent_z: 1.0,
            polygon,
            tracking_state: state,
        }
    }

    #[test]
    fn fan_has_n_minus_2_triangles_per_plane() {
        let square = vec![[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5], [-0.5, 0.5]];
        let pentagon = vec![[0.0, -1.0], [1.0, 0.0], [0.5, 1.0], [-0.5, 1.0], [-1.0, 0.0]];
        let mesh = PlaneMesh::build(&[
            plane(1, TrackingState::Tracking, square),
            plane(2, TrackingState::Tracking, pentagon),
        ]);
        assert_eq!(mesh.ranges, vec![0..6, 6..15]);
    }

    #[test]
    fn only_tracking_planes_are_drawn() {
        let tri = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let mesh = PlaneMesh::build(&[
            plane(1, TrackingState::Paused, tri.clone()),
            plane(2, TrackingState::Stopped, tri.clone()),
            plane(3, TrackingState::Tracking, tri),
        ]);
        assert_eq!(mesh.ranges.len(), 1);
    }

    #[test]
    fn vertices_are_in_world_space() {
        let mesh = PlaneMesh::build(&[plane(
            1,
            TrackingState::Tracking,
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
        )]);
        assert_eq!(mesh.vertices[1].pos, [1.0, -1.0, 0.0]);
        assert_eq!(mesh.vertices[1].local, [1.0, 0.0]);
    }
}
