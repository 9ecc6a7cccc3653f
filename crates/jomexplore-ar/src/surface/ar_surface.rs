use std::sync::Arc;

use crate::anchors::{Anchor, AnchorStore};
use crate::coords::Viewport;
use crate::frame::{EngineConfig, FrameOutcome, FrameRenderer, LatestFrame};
use crate::model::{AssetSource, ModelCache, ModelGeometry, DEFAULT_MODEL_ID};
use crate::render::{GpuLayers, RenderCtx, RenderError, RenderTarget};
use crate::session::{lock_session, SharedSession};

use super::TapHandler;

/// The AR view: surface callbacks in, frames out.
///
/// Hosts call the `on_surface_*` callbacks from their render thread and hand
/// [`ArSurface::tap_handler`] to their input thread. The session itself stays with
/// the host's lifecycle code through the shared [`SharedSession`].
pub struct ArSurface {
    session: SharedSession,
    anchors: Arc<AnchorStore>,
    latest: Arc<LatestFrame>,

    cache: ModelCache,
    model_id: String,
    renderer: FrameRenderer,

    layers: Option<GpuLayers>,
}

impl ArSurface {
    /// `model_id` defaults to [`DEFAULT_MODEL_ID`] when absent or blank.
    pub fn new(
        session: SharedSession,
        assets: Box<dyn AssetSource>,
        config: EngineConfig,
        model_id: Option<&str>,
    ) -> Self {
        let anchors = Arc::new(AnchorStore::new(config.anchors.clone()));
        let latest = Arc::new(LatestFrame::new());
        let cache = ModelCache::with_threshold(assets, config.min_asset_bytes);
        let renderer = FrameRenderer::new(
            config,
            Arc::clone(&session),
            Arc::clone(&anchors),
            Arc::clone(&latest),
        );

        Self {
            session,
            anchors,
            latest,
            cache,
            model_id: normalize_model_id(model_id),
            renderer,
            layers: None,
        }
    }

    /// Compiles every layer and loads the current model.
    ///
    /// A failure leaves the surface without layers; every draw then reports
    /// [`FrameOutcome::SurfaceNotReady`].
    pub fn on_surface_created(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        self.layers = None;
        let layers = GpuLayers::create(ctx, self.renderer.config().style)?;
        lock_session(&self.session).bind_camera_texture(layers.camera_texture());
        self.layers = Some(layers);

        let geometry = self.cache.resolve(&self.model_id);
        self.renderer.set_model(geometry);
        Ok(())
    }

    /// Propagates the drawable size to the session and to tap normalization.
    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        log::debug!("surface changed: {width}x{height}");
        self.latest.set_viewport(viewport);
        lock_session(&self.session).set_display_geometry(viewport);
    }

    /// Releases GPU resources. The surface can be created again afterwards.
    pub fn on_surface_destroyed(&mut self) {
        self.layers = None;
        self.latest.clear();
    }

    pub fn on_draw_frame(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
    ) -> FrameOutcome {
        let Some(layers) = self.layers.as_mut() else {
            return FrameOutcome::SurfaceNotReady;
        };
        let mut bound = layers.bind(ctx, target);
        self.renderer.draw_frame(&mut bound)
    }

    /// Switches the model drawn at every anchor. Takes effect on the next frame.
    pub fn set_model(&mut self, model_id: &str) -> Arc<ModelGeometry> {
        self.model_id = normalize_model_id(Some(model_id));
        let geometry = self.cache.resolve(&self.model_id);
        self.renderer.set_model(Arc::clone(&geometry));
        geometry
    }

    #[inline]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Geometry currently drawn at anchors, once the surface has been created.
    pub fn model(&self) -> Option<&Arc<ModelGeometry>> {
        self.renderer.model()
    }

    pub fn tap_handler(&self) -> TapHandler {
        TapHandler::new(Arc::clone(&self.anchors), Arc::clone(&self.latest))
    }

    /// Convenience for hosts that handle input on the render thread.
    pub fn on_tap(&self, x: f32, y: f32) -> Option<Anchor> {
        self.tap_handler().on_tap(x, y)
    }

    #[inline]
    pub fn anchors(&self) -> &Arc<AnchorStore> {
        &self.anchors
    }

    #[inline]
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    #[inline]
    pub fn model_cache(&self) -> &ModelCache {
        &self.cache
    }
}

fn normalize_model_id(model_id: Option<&str>) -> String {
    match model_id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_owned(),
        _ => DEFAULT_MODEL_ID.to_owned(),
    }
}
