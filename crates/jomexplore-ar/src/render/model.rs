use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::{Mat4, Vec3};
use crate::model::ModelGeometry;
use crate::render::{RenderCtx, RenderError, RenderTarget};

use super::common::{
    begin_load_pass, compile_shader, create_uniform_buffer, depth_state, ensure_capacity,
    primitive, uniform_layout_entry, GrowOnlyCapacity,
};

const LAYER: &str = "models";

/// Direction towards the key light and the ambient floor of the lambert term.
const LIGHT_DIR: Vec3 = Vec3::new(0.5, 1.0, 0.5);
const AMBIENT: f32 = 0.3;

/// Draws one model geometry once per model matrix, in a single instanced call.
#[derive(Default)]
pub struct ModelRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group: Option<wgpu::BindGroup>,
    ubo: Option<wgpu::Buffer>,

    geometry: Option<Arc<ModelGeometry>>,
    mesh_vbo: Option<wgpu::Buffer>,
    mesh_vertices: u32,

    instance_vbo: Option<wgpu::Buffer>,
    capacity: GrowOnlyCapacity,
}

impl ModelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        let shader = compile_shader(ctx, LAYER, include_str!("shaders/model.wgsl"))?;

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("model bgl"),
            entries: &[uniform_layout_entry::<ModelUniform>(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("model pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("model pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[MeshVertex::layout(), ModelInstance::layout()],
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
            depth_stencil: Some(depth_state(ctx.depth_format, true, wgpu::CompareFunction::Less)),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let ubo = create_uniform_buffer::<ModelUniform>(ctx, "model ubo");
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("model bind group"),
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
        self.instance_vbo = None;
        self.capacity = GrowOnlyCapacity::default();

        // Buffers belong to the device that was just used; upload again on next draw.
        self.geometry = None;
        self.mesh_vbo = None;
        self.mesh_vertices = 0;
        Ok(())
    }

    /// Uploads `geometry` unless it is already the resident mesh.
    fn set_geometry(&mut self, ctx: &RenderCtx<'_>, geometry: &Arc<ModelGeometry>) {
        let resident = self.geometry.as_ref().is_some_and(|g| Arc::ptr_eq(g, geometry));
        if resident && self.mesh_vbo.is_some() {
            return;
        }

        let vertices = MeshVertex::interleave(geometry);
        log::debug!(
            "models: uploading {:?} geometry ({} vertices)",
            geometry.category(),
            vertices.len()
        );

        self.mesh_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("model mesh vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.mesh_vertices = vertices.len() as u32;
        self.geometry = Some(Arc::clone(geometry));
    }

    /// Draws `geometry` at each of `models`. Returns the number of instances drawn.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        geometry: &Arc<ModelGeometry>,
        models: &[Mat4],
        view_proj: &Mat4,
    ) -> Result<usize, RenderError> {
        if self.pipeline.is_none() {
            return Err(RenderError::NotCreated { layer: LAYER });
        }
        if self.pipeline_format != Some(ctx.surface_format) {
            self.create(ctx)?;
        }
        if models.is_empty() {
            return Ok(0);
        }
        if geometry.vertex_count() == 0 {
            return Err(RenderError::InvalidInput {
                layer: LAYER,
                message: format!("{:?} geometry has no vertices", geometry.category()),
            });
        }

        self.set_geometry(ctx, geometry);
        ensure_capacity::<ModelInstance>(
            ctx,
            "model instance vbo",
            wgpu::BufferUsages::VERTEX,
            &mut self.instance_vbo,
            &mut self.capacity,
            models.len(),
        );

        let (Some(pipeline), Some(bind_group), Some(ubo), Some(mesh_vbo), Some(instance_vbo)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.ubo.as_ref(),
            self.mesh_vbo.as_ref(),
            self.instance_vbo.as_ref(),
        ) else {
            return Err(RenderError::NotCreated { layer: LAYER });
        };

        let u = ModelUniform {
            view_proj: view_proj.cols,
            color: geometry.color().to_array(),
            light: [LIGHT_DIR.x, LIGHT_DIR.y, LIGHT_DIR.z, AMBIENT],
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));

        let instances: Vec<ModelInstance> =
            models.iter().map(|m| ModelInstance { model: m.cols }).collect();
        ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&instances));

        let mut rpass = begin_load_pass(target, "model pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.draw(0..self.mesh_vertices, 0..instances.len() as u32);

        Ok(instances.len())
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ModelUniform {
    view_proj: [[f32; 4]; 4],
    color: [f32; 4],
    light: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub(crate) struct MeshVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // normal
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }

    pub(crate) fn interleave(geometry: &ModelGeometry) -> Vec<MeshVertex> {
        geometry
            .positions()
            .chunks_exact(3)
            .zip(geometry.normals().chunks_exact(3))
            .map(|(p, n)| MeshVertex {
                pos: [p[0], p[1], p[2]],
                normal: [n[0], n[1], n[2]],
            })
            .collect()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ModelInstance {
    model: [[f32; 4]; 4],
}

impl ModelInstance {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelCache;

    #[test]
    fn interleave_pairs_positions_with_normals() {
        let mut cache = ModelCache::default();
        let cube = cache.resolve("unknown");
        let vertices = MeshVertex::interleave(&cube);

        assert_eq!(vertices.len(), cube.vertex_count());
        assert_eq!(vertices[4].pos, cube.positions()[12..15]);
        assert_eq!(vertices[4].normal, cube.normals()[12..15]);
    }

    #[test]
    fn instance_stride_is_one_matrix() {
        assert_eq!(std::mem::size_of::<ModelInstance>(), 64);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 96);
    }
}
