use std::sync::Arc;

use crate::coords::{ColorRgba, Mat4};
use crate::frame::{LayerStyle, SceneLayers};
use crate::model::ModelGeometry;
use crate::tracking::{CameraTextureId, Plane, PointCloud, TrackingFrame};

use super::{
    BackgroundRenderer, ModelRenderer, PlaneRenderer, PointCloudRenderer, RenderCtx, RenderError,
    RenderTarget,
};

/// The four layer renderers, created together for one surface.
pub struct GpuLayers {
    background: BackgroundRenderer,
    points: PointCloudRenderer,
    planes: PlaneRenderer,
    models: ModelRenderer,
    style: LayerStyle,
}

impl GpuLayers {
    /// Compiles every layer. Any failure aborts: a partially created set is never returned.
    pub fn create(ctx: &RenderCtx<'_>, style: LayerStyle) -> Result<Self, RenderError> {
        let mut layers = Self {
            background: BackgroundRenderer::new(),
            points: PointCloudRenderer::new(),
            planes: PlaneRenderer::new(),
            models: ModelRenderer::new(),
            style,
        };
        layers.background.create(ctx)?;
        layers.points.create(ctx)?;
        layers.planes.create(ctx)?;
        layers.models.create(ctx)?;
        log::info!(
            "render layers created ({:?}, depth {:?})",
            ctx.surface_format,
            ctx.depth_format
        );
        Ok(layers)
    }

    #[inline]
    pub fn camera_texture(&self) -> CameraTextureId {
        self.background.texture_id()
    }

    /// Binds the layers to one frame's context and target.
    pub fn bind<'a, 'c, 't>(
        &'a mut self,
        ctx: &'a RenderCtx<'c>,
        target: &'a mut RenderTarget<'t>,
    ) -> BoundLayers<'a, 'c, 't> {
        BoundLayers { layers: self, ctx, target }
    }
}

/// [`GpuLayers`] bound to a render target for the duration of one frame.
pub struct BoundLayers<'a, 'c, 't> {
    layers: &'a mut GpuLayers,
    ctx: &'a RenderCtx<'c>,
    target: &'a mut RenderTarget<'t>,
}

impl SceneLayers for BoundLayers<'_, '_, '_> {
    fn camera_texture(&self) -> CameraTextureId {
        self.layers.camera_texture()
    }

    fn clear(&mut self, color: ColorRgba) {
        let target = &mut *self.target;
        let _rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clear pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    fn draw_background(&mut self, frame: &dyn TrackingFrame) -> Result<(), RenderError> {
        self.layers.background.draw(self.ctx, self.target, frame)
    }

    fn draw_point_cloud(
        &mut self,
        cloud: &PointCloud,
        view_proj: &Mat4,
    ) -> Result<usize, RenderError> {
        let style = self.layers.style;
        self.layers.points.draw(
            self.ctx,
            self.target,
            cloud,
            view_proj,
            style.point_size,
            style.point_color,
        )
    }

    fn draw_planes(&mut self, planes: &[Plane], view_proj: &Mat4) -> Result<usize, RenderError> {
        let tint = self.layers.style.plane_tint;
        self.layers.planes.draw(self.ctx, self.target, planes, view_proj, tint)
    }

    fn draw_models(
        &mut self,
        geometry: &Arc<ModelGeometry>,
        models: &[Mat4],
        view_proj: &Mat4,
    ) -> Result<usize, RenderError> {
        self.layers.models.draw(self.ctx, self.target, geometry, models, view_proj)
    }
}
