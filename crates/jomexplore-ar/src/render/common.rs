//! Shared GPU types and utilities used by the layer renderers.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};

use super::{RenderCtx, RenderError, RenderTarget};

// ── blend / depth ─────────────────────────────────────────────────────────

/// Straight (non-premultiplied) alpha blending.
pub(super) fn alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

pub(super) fn depth_state(
    format: wgpu::TextureFormat,
    write: bool,
    compare: wgpu::CompareFunction,
) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

pub(super) fn primitive(topology: wgpu::PrimitiveTopology) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

// ── shader compilation ────────────────────────────────────────────────────

/// Compiles embedded WGSL and reports compile errors as [`RenderError::ShaderCompile`].
pub(super) fn compile_shader(
    ctx: &RenderCtx<'_>,
    layer: &'static str,
    source: &'static str,
) -> Result<wgpu::ShaderModule, RenderError> {
    let module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(layer),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let info = pollster::block_on(module.get_compilation_info());
    let errors: Vec<String> = info
        .messages
        .iter()
        .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
        .map(|m| m.message.clone())
        .collect();

    if !errors.is_empty() {
        return Err(RenderError::ShaderCompile {
            layer,
            message: errors.join("; "),
        });
    }

    for m in &info.messages {
        log::debug!("{layer}: shader {:?}: {}", m.message_type, m.message);
    }
    Ok(module)
}

// ── uniforms ──────────────────────────────────────────────────────────────

/// Minimum binding size for a uniform block of type `T`.
pub(super) fn uniform_binding_size<T: Pod>() -> NonZeroU64 {
    NonZeroU64::new(std::mem::size_of::<T>() as u64)
        .expect("uniform blocks have non-zero size by construction")
}

pub(super) fn uniform_layout_entry<T: Pod>(
    binding: u32,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: Some(uniform_binding_size::<T>()),
        },
        count: None,
    }
}

pub(super) fn create_uniform_buffer<T: Pod>(ctx: &RenderCtx<'_>, label: &str) -> wgpu::Buffer {
    ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<T>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// `view_proj` + one color, shared by the point and plane layers.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ColoredUniform {
    pub view_proj: [[f32; 4]; 4],
    pub color: [f32; 4],
}

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub(super) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

pub(super) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

// ── buffer capacity ───────────────────────────────────────────────────────

/// Element capacity of a GPU buffer that only ever grows.
///
/// After every request the capacity is `max(previous, required)`; the buffer is
/// reallocated only when the request exceeds it.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub(crate) struct GrowOnlyCapacity {
    capacity: usize,
}

impl GrowOnlyCapacity {
    #[inline]
    pub fn get(self) -> usize {
        self.capacity
    }

    /// Records a request for `required` elements. Returns `true` when the backing
    /// buffer must be reallocated with the new capacity.
    pub fn request(&mut self, required: usize) -> bool {
        if required <= self.capacity {
            return false;
        }
        self.capacity = required;
        true
    }
}

/// (Re)allocates `buffer` when `capacity` grows to fit `required` elements of `T`.
pub(super) fn ensure_capacity<T: Pod>(
    ctx: &RenderCtx<'_>,
    label: &str,
    usage: wgpu::BufferUsages,
    buffer: &mut Option<wgpu::Buffer>,
    capacity: &mut GrowOnlyCapacity,
    required: usize,
) {
    let grew = capacity.request(required);
    if !grew && buffer.is_some() {
        return;
    }
    let elements = capacity.get().max(1);
    log::trace!("{label}: capacity -> {elements}");
    *buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (elements * std::mem::size_of::<T>()) as u64,
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    }));
}

// ── passes ────────────────────────────────────────────────────────────────

/// Begins a pass that keeps the existing color and depth contents.
pub(super) fn begin_load_pass<'e>(
    target: &'e mut RenderTarget<'_>,
    label: &'static str,
) -> wgpu::RenderPass<'e> {
    target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: target.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_running_max() {
        let mut cap = GrowOnlyCapacity::default();
        let mut seen = Vec::new();
        let mut grew = Vec::new();
        for required in [10, 50, 30, 80] {
            grew.push(cap.request(required));
            seen.push(cap.get());
        }
        assert_eq!(seen, vec![10, 50, 50, 80]);
        assert_eq!(grew, vec![true, true, false, true]);
    }

    #[test]
    fn zero_request_keeps_capacity() {
        let mut cap = GrowOnlyCapacity::default();
        cap.request(4);
        assert!(!cap.request(0));
        assert_eq!(cap.get(), 4);
    }
}
