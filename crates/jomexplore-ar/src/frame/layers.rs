use std::sync::Arc;

use crate::coords::{ColorRgba, Mat4};
use crate::model::ModelGeometry;
use crate::render::RenderError;
use crate::tracking::{CameraTextureId, Plane, PointCloud, TrackingFrame};

/// The draw operations a frame is composed of, bound to one render target.
///
/// `render::GpuLayers` implements this on top of wgpu; tests record calls instead.
pub trait SceneLayers {
    /// Handle of the texture the background layer samples the camera image from.
    fn camera_texture(&self) -> CameraTextureId;

    /// Clears color to `color` and depth to the far plane.
    fn clear(&mut self, color: ColorRgba);

    fn draw_background(&mut self, frame: &dyn TrackingFrame) -> Result<(), RenderError>;

    /// Returns the number of points drawn.
    fn draw_point_cloud(&mut self, cloud: &PointCloud, view_proj: &Mat4)
    -> Result<usize, RenderError>;

    /// Returns the number of planes drawn.
    fn draw_planes(&mut self, planes: &[Plane], view_proj: &Mat4) -> Result<usize, RenderError>;

    /// Draws `geometry` once per model matrix. Returns the number of instances drawn.
    fn draw_models(
        &mut self,
        geometry: &Arc<ModelGeometry>,
        models: &[Mat4],
        view_proj: &Mat4,
    ) -> Result<usize, RenderError>;
}
