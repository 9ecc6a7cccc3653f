use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::{RenderCtx, RenderError, RenderTarget};
use crate::tracking::{CameraImage, CameraTextureId, TrackingFrame, NDC_QUAD};

use super::common::{begin_load_pass, compile_shader, depth_state, primitive};

const LAYER: &str = "background";

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Draws the camera image as a full-screen quad behind all 3D content.
pub struct BackgroundRenderer {
    texture_id: CameraTextureId,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    sampler: Option<wgpu::Sampler>,

    texture: Option<wgpu::Texture>,
    texture_size: (u32, u32),

    vbo: Option<wgpu::Buffer>,
    quad: BackgroundQuad,
}

impl Default for BackgroundRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundRenderer {
    pub fn new() -> Self {
        Self {
            texture_id: CameraTextureId(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed)),
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            sampler: None,
            texture: None,
            texture_size: (0, 0),
            vbo: None,
            quad: BackgroundQuad::default(),
        }
    }

    /// Handle of the camera texture, handed to the session before each update.
    #[inline]
    pub fn texture_id(&self) -> CameraTextureId {
        self.texture_id
    }

    pub fn create(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        let shader = compile_shader(ctx, LAYER, include_str!("shaders/background.wgsl"))?;

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("background bgl"),
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

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("background pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("background pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[BackgroundVertex::layout()],
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
            primitive: primitive(wgpu::PrimitiveTopology::TriangleStrip),
            depth_stencil: Some(depth_state(
                ctx.depth_format,
                false,
                wgpu::CompareFunction::Always,
            )),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("background sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));

        self.vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("background vbo"),
            contents: bytemuck::cast_slice(&self.quad.vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        }));

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.quad = BackgroundQuad::default();

        // Black until the first camera image arrives.
        self.upload(ctx, &CameraImage {
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 255].into(),
        })
    }

    /// Draws the latest camera image of `frame`.
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        frame: &dyn TrackingFrame,
    ) -> Result<(), RenderError> {
        if self.pipeline.is_none() {
            return Err(RenderError::NotCreated { layer: LAYER });
        }
        if self.pipeline_format != Some(ctx.surface_format) {
            self.create(ctx)?;
        }

        if let Some(image) = frame.camera_image() {
            self.upload(ctx, &image)?;
        }

        let (Some(pipeline), Some(bind_group), Some(vbo)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.vbo.as_ref(),
        ) else {
            return Err(RenderError::NotCreated { layer: LAYER });
        };

        if self.quad.refresh(frame) {
            log::debug!("background: display geometry changed, uv recomputed");
            ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&self.quad.vertices));
        }

        let mut rpass = begin_load_pass(target, "background pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.draw(0..4, 0..1);
        Ok(())
    }

    /// Writes `image` into the camera texture, reallocating it on a size change.
    fn upload(&mut self, ctx: &RenderCtx<'_>, image: &CameraImage) -> Result<(), RenderError> {
        check_camera_image(image, ctx.device.limits().max_texture_dimension_2d)?;

        if self.texture.is_none() || self.texture_size != (image.width, image.height) {
            self.recreate_texture(ctx, image.width, image.height)?;
        }
        let Some(texture) = self.texture.as_ref() else {
            return Err(RenderError::NotCreated { layer: LAYER });
        };

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * 4),
                rows_per_image: Some(image.height),
            },
            wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    fn recreate_texture(
        &mut self,
        ctx: &RenderCtx<'_>,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let (Some(bgl), Some(sampler)) = (self.bind_group_layout.as_ref(), self.sampler.as_ref())
        else {
            return Err(RenderError::NotCreated { layer: LAYER });
        };

        log::debug!("background: camera texture {width}x{height}");
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("camera texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("background bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
        self.texture = Some(texture);
        self.texture_size = (width, height);
        Ok(())
    }
}

/// Rejects images that do not match their byte length or exceed the device's
/// texture size limit.
pub(crate) fn check_camera_image(image: &CameraImage, max_dimension: u32) -> Result<(), RenderError> {
    let expected = image.width as usize * image.height as usize * 4;
    if image.width == 0 || image.height == 0 || image.rgba.len() != expected {
        return Err(RenderError::InvalidInput {
            layer: LAYER,
            message: format!(
                "camera image {}x{} has {} bytes, expected {expected}",
                image.width,
                image.height,
                image.rgba.len()
            ),
        });
    }
    if image.width > max_dimension || image.height > max_dimension {
        return Err(RenderError::InvalidInput {
            layer: LAYER,
            message: format!(
                "camera image {}x{} exceeds the {max_dimension} texel texture limit",
                image.width, image.height
            ),
        });
    }
    Ok(())
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub(crate) struct BackgroundVertex {
    pub ndc: [f32; 2],
    pub uv: [f32; 2],
}

impl BackgroundVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // ndc
        1 => Float32x2  // uv
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BackgroundVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// CPU side of the background quad.
///
/// Texture coordinates depend on display rotation, so they are recomputed on first
/// use and afterwards only when the frame reports a display geometry change.
#[derive(Debug, Clone)]
pub(crate) struct BackgroundQuad {
    pub vertices: [BackgroundVertex; 4],
    initialized: bool,
}

impl Default for BackgroundQuad {
    fn default() -> Self {
        let identity = [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]];
        Self {
            vertices: std::array::from_fn(|i| BackgroundVertex {
                ndc: NDC_QUAD[i],
                uv: identity[i],
            }),
            initialized: false,
        }
    }
}

impl BackgroundQuad {
    /// Returns `true` when the texture coordinates were recomputed.
    pub fn refresh(&mut self, frame: &dyn TrackingFrame) -> bool {
        if self.initialized && !frame.display_geometry_changed() {
            return false;
        }
        let uv = frame.transform_display_uv(&NDC_QUAD);
        for (vertex, uv) in self.vertices.iter_mut().zip(uv) {
            vertex.uv = uv;
        }
        self.initialized = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Pose;
    use crate::tracking::{
        AnchorTracking, Camera, HitResult, Plane, PointCloud, SessionError, TrackingState,
    };
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    struct RotatingFrame {
        changed: AtomicBool,
        rotated: AtomicBool,
    }

    impl TrackingFrame for RotatingFrame {
        fn camera(&self) -> Camera {
            Camera {
                pose: Pose::IDENTITY,
                tracking_state: TrackingState::Tracking,
                fov_y: 1.0,
            }
        }
        fn planes(&self) -> Vec<Plane> {
            Vec::new()
        }
        fn acquire_point_cloud(&self) -> Result<PointCloud, SessionError> {
            Ok(PointCloud::detached(Arc::from(Vec::new())))
        }
        fn hit_test(&self, _x: f32, _y: f32) -> Vec<HitResult> {
            Vec::new()
        }
        fn create_anchor(&self, _hit: &HitResult) -> Result<AnchorTracking, SessionError> {
            Err(SessionError::Backend("no anchors".into()))
        }
        fn display_geometry_changed(&self) -> bool {
            self.changed.load(Ordering::SeqCst)
        }
        fn transform_display_uv(&self, ndc: &[[f32; 2]; 4]) -> [[f32; 2]; 4] {
            if self.rotated.load(Ordering::SeqCst) {
                // 90° portrait rotation: swap axes.
                ndc.map(|[x, y]| [(1.0 - y) * 0.5, (1.0 - x) * 0.5])
            } else {
                ndc.map(|[x, y]| [(x + 1.0) * 0.5, (1.0 - y) * 0.5])
            }
        }
    }

    #[test]
    fn uv_recomputed_only_on_first_use_and_geometry_change() {
        let frame = RotatingFrame {
            changed: AtomicBool::new(true),
            rotated: AtomicBool::new(false),
        };
        let mut quad = BackgroundQuad::default();

        let mut refreshed = Vec::new();
        for changed in [true, false, false, true] {
            frame.changed.store(changed, Ordering::SeqCst);
            refreshed.push(quad.refresh(&frame));
        }
        assert_eq!(refreshed, vec![true, false, false, true]);
    }

    #[test]
    fn first_use_refreshes_even_without_change_flag() {
        let frame = RotatingFrame {
            changed: AtomicBool::new(false),
            rotated: AtomicBool::new(false),
        };
        let mut quad = BackgroundQuad::default();
        assert!(quad.refresh(&frame));
        assert_eq!(quad.vertices[0].uv, [0.0, 1.0]);
        assert_eq!(quad.vertices[3].uv, [1.0, 0.0]);
    }

    #[test]
    fn rotation_updates_uv() {
        let frame = RotatingFrame {
            changed: AtomicBool::new(false),
            rotated: AtomicBool::new(false),
        };
        let mut quad = BackgroundQuad::default();
        quad.refresh(&frame);

        frame.rotated.store(true, Ordering::SeqCst);
        frame.changed.store(true, Ordering::SeqCst);
        assert!(quad.refresh(&frame));
        assert_eq!(quad.vertices[0].uv, [1.0, 1.0]);
    }

    #[test]
    fn texture_ids_are_unique() {
        let a = BackgroundRenderer::new();
        let b = BackgroundRenderer::new();
        assert_ne!(a.texture_id(), b.texture_id());
    }

    fn image(width: u32, height: u32) -> CameraImage {
        CameraImage {
            width,
            height,
            rgba: Arc::from(vec![0u8; width as usize * height as usize * 4]),
        }
    }

    #[test]
    fn oversized_camera_image_is_rejected() {
        assert!(check_camera_image(&image(64, 32), 64).is_ok());
        let err = check_camera_image(&image(65, 32), 64).unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput { layer: LAYER, .. }));
        assert!(check_camera_image(&image(8, 65), 64).is_err());
    }

    #[test]
    fn short_camera_image_is_rejected() {
        let mut short = image(4, 4);
        short.rgba = Arc::from(vec![0u8; 10]);
        assert!(check_camera_image(&short, 8192).is_err());
        assert!(check_camera_image(&image(0, 4), 8192).is_err());
    }
}
