use std::sync::Arc;

use crate::anchors::{Anchor, AnchorStore};
use crate::coords::Mat4;
use crate::model::ModelGeometry;
use crate::session::{lock_session, SessionState, SharedSession};
use crate::tracking::{SessionError, TrackingFrame, TrackingState};

use super::outcome::PassError;
use super::{EngineConfig, FrameOutcome, FrameStats, LatestFrame, PassKind, SceneLayers};

enum Tick {
    NoSession,
    NotResumed,
    Updated(Result<Arc<dyn TrackingFrame>, SessionError>),
}

/// Per-refresh draw state machine.
///
/// Runs on the render thread. The session lock is held only while binding the camera
/// texture and ticking; everything after works on the returned frame.
pub struct FrameRenderer {
    config: EngineConfig,
    session: SharedSession,
    anchors: Arc<AnchorStore>,
    latest: Arc<LatestFrame>,
    model: Option<Arc<ModelGeometry>>,
}

impl FrameRenderer {
    pub fn new(
        config: EngineConfig,
        session: SharedSession,
        anchors: Arc<AnchorStore>,
        latest: Arc<LatestFrame>,
    ) -> Self {
        Self {
            config,
            session,
            anchors,
            latest,
            model: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Geometry drawn at every anchor.
    pub fn set_model(&mut self, geometry: Arc<ModelGeometry>) {
        log::info!("model set to {:?} ({:?})", geometry.category(), geometry.source());
        self.model = Some(geometry);
    }

    #[inline]
    pub fn model(&self) -> Option<&Arc<ModelGeometry>> {
        self.model.as_ref()
    }

    /// Draws one frame through `layers`.
    pub fn draw_frame<L: SceneLayers + ?Sized>(&self, layers: &mut L) -> FrameOutcome {
        let tints = &self.config.tints;

        let frame = match self.tick(layers) {
            Tick::NoSession => {
                self.latest.clear();
                layers.clear(tints.no_session);
                return FrameOutcome::NoSession;
            }
            Tick::NotResumed => {
                self.latest.clear();
                layers.clear(tints.paused);
                return FrameOutcome::SessionNotResumed;
            }
            Tick::Updated(Err(SessionError::CameraUnavailable)) => {
                self.latest.clear();
                layers.clear(tints.camera_error);
                return FrameOutcome::CameraUnavailable;
            }
            Tick::Updated(Err(e)) => {
                log::error!("tracking update failed: {e}");
                self.latest.clear();
                layers.clear(tints.failure);
                return FrameOutcome::Failed;
            }
            Tick::Updated(Ok(frame)) => frame,
        };
        self.latest.publish(Arc::clone(&frame));

        let camera = frame.camera();
        if camera.tracking_state == TrackingState::Paused {
            layers.clear(tints.paused);
            return FrameOutcome::TrackingPaused;
        }

        layers.clear(tints.surface);
        if let Err(e) = layers.draw_background(frame.as_ref()) {
            log::error!("background pass failed: {e}");
            layers.clear(tints.failure);
            return FrameOutcome::Failed;
        }

        if !camera.tracking_state.is_tracking() {
            log::trace!("camera {:?}: background only", camera.tracking_state);
            return FrameOutcome::NotTracking;
        }

        let aspect = self.latest.viewport().aspect();
        let view_proj = camera.projection_matrix(aspect, self.config.near, self.config.far)
            * camera.view_matrix();

        let mut stats = FrameStats::default();

        match draw_point_cloud(layers, frame.as_ref(), &view_proj) {
            Ok(n) => stats.points = n,
            Err(e) => record_failure(&mut stats, PassKind::PointCloud, e),
        }

        match layers.draw_planes(&frame.planes(), &view_proj) {
            Ok(n) => stats.planes = n,
            Err(e) => record_failure(&mut stats, PassKind::Planes, e.into()),
        }

        match self.draw_models(layers, &view_proj) {
            Ok((n, placeholder)) => {
                stats.models = n;
                stats.placeholder = placeholder;
            }
            Err(e) => record_failure(&mut stats, PassKind::Models, e),
        }

        log::trace!(
            "frame: {} points, {} planes, {} models, failed {:?}",
            stats.points,
            stats.planes,
            stats.models,
            stats.failed
        );
        FrameOutcome::Rendered(stats)
    }

    fn tick<L: SceneLayers + ?Sized>(&self, layers: &L) -> Tick {
        let mut session = lock_session(&self.session);
        if !session.has_session() {
            return Tick::NoSession;
        }
        if session.state() != SessionState::Resumed {
            return Tick::NotResumed;
        }
        session.bind_camera_texture(layers.camera_texture());
        Tick::Updated(session.tick())
    }

    /// Models at every tracking anchor, or the placeholder when there are no anchors.
    ///
    /// Returns the instance count and whether the placeholder was drawn.
    fn draw_models<L: SceneLayers + ?Sized>(
        &self,
        layers: &mut L,
        view_proj: &Mat4,
    ) -> Result<(usize, bool), PassError> {
        let Some(geometry) = self.model.as_ref() else {
            log::trace!("no model loaded; model pass skipped");
            return Ok((0, false));
        };

        let anchors = self.anchors.anchors();
        if anchors.is_empty() {
            let placeholder = Mat4::from_translation(self.config.placeholder_offset);
            let n = layers.draw_models(geometry, &[placeholder], view_proj)?;
            return Ok((n, true));
        }

        let models: Vec<Mat4> = anchors
            .iter()
            .filter(|a| a.tracking_state().is_tracking())
            .map(Anchor::model_matrix)
            .collect();
        if models.is_empty() {
            return Ok((0, false));
        }
        Ok((layers.draw_models(geometry, &models, view_proj)?, false))
    }
}

/// The lease is dropped before returning, whether the draw succeeded or not.
fn draw_point_cloud<L: SceneLayers + ?Sized>(
    layers: &mut L,
    frame: &dyn TrackingFrame,
    view_proj: &Mat4,
) -> Result<usize, PassError> {
    let cloud = frame.acquire_point_cloud()?;
    Ok(layers.draw_point_cloud(&cloud, view_proj)?)
}

fn record_failure(stats: &mut FrameStats, pass: PassKind, e: PassError) {
    log::warn!("{pass:?} pass failed: {e}");
    stats.failed.push(pass);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{ColorRgba, Pose, Vec3, Viewport};
    use crate::model::ModelCache;
    use crate::render::RenderError;
    use crate::session::SessionManager;
    use crate::tracking::testing::{Script, ScriptedRuntime, StaticFrame};
    use crate::tracking::{CameraTextureId, Plane, PointCloud, TrackingCell};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Clear(ColorRgba),
        Background,
        Points(usize),
        Planes(usize),
        Models(Vec<Mat4>),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        fail_background: bool,
        fail_points: bool,
        fail_planes: bool,
        fail_models: bool,
    }

    fn failure(what: &str) -> RenderError {
        RenderError::InvalidInput { layer: "test", message: what.to_owned() }
    }

    impl SceneLayers for Recorder {
        fn camera_texture(&self) -> CameraTextureId {
            CameraTextureId(42)
        }

        fn clear(&mut self, color: ColorRgba) {
            self.calls.push(Call::Clear(color));
        }

        fn draw_background(&mut self, _frame: &dyn TrackingFrame) -> Result<(), RenderError> {
            if self.fail_background {
                return Err(failure("background"));
            }
            self.calls.push(Call::Background);
            Ok(())
        }

        fn draw_point_cloud(
            &mut self,
            cloud: &PointCloud,
            _view_proj: &Mat4,
        ) -> Result<usize, RenderError> {
            if self.fail_points {
                return Err(failure("points"));
            }
            self.calls.push(Call::Points(cloud.len()));
            Ok(cloud.len())
        }

        fn draw_planes(&mut self, planes: &[Plane], _view_proj: &Mat4) -> Result<usize, RenderError> {
            if self.fail_planes {
                return Err(failure("planes"));
            }
            self.calls.push(Call::Planes(planes.len()));
            Ok(planes.len())
        }

        fn draw_models(
            &mut self,
            _geometry: &Arc<ModelGeometry>,
            models: &[Mat4],
            _view_proj: &Mat4,
        ) -> Result<usize, RenderError> {
            if self.fail_models {
                return Err(failure("models"));
            }
            self.calls.push(Call::Models(models.to_vec()));
            Ok(models.len())
        }
    }

    struct Harness {
        script: Script,
        session: SharedSession,
        anchors: Arc<AnchorStore>,
        latest: Arc<LatestFrame>,
        renderer: FrameRenderer,
    }

    fn harness(frame: StaticFrame) -> Harness {
        let script = Script::new(frame);
        let mut manager = SessionManager::new(Box::new(ScriptedRuntime { script: script.clone() }));
        manager.ensure_installed().unwrap();
        manager.create().unwrap();
        manager.resume().unwrap();
        let session = manager.into_shared();

        let anchors = Arc::new(AnchorStore::default());
        let latest = Arc::new(LatestFrame::new());
        latest.set_viewport(Viewport::new(480, 960));

        let mut renderer = FrameRenderer::new(
            EngineConfig::default(),
            Arc::clone(&session),
            Arc::clone(&anchors),
            Arc::clone(&latest),
        );
        renderer.set_model(ModelCache::default().resolve("blue_mosque"));

        Harness { script, session, anchors, latest, renderer }
    }

    fn anchor_at(store: &AnchorStore, z: f32, state: TrackingState) {
        store.push(
            Pose::from_translation(Vec3::new(0.0, 0.0, z)),
            Arc::new(TrackingCell::new(state)),
        );
    }

    fn rendered(outcome: FrameOutcome) -> FrameStats {
        match outcome {
            FrameOutcome::Rendered(stats) => stats,
            other => panic!("expected a rendered frame, got {other:?}"),
        }
    }

    #[test]
    fn only_tracking_anchors_are_drawn() {
        let h = harness(StaticFrame::tracking());
        anchor_at(&h.anchors, -1.0, TrackingState::Tracking);
        anchor_at(&h.anchors, -2.0, TrackingState::Paused);
        anchor_at(&h.anchors, -3.0, TrackingState::Tracking);

        let mut layers = Recorder::default();
        let stats = rendered(h.renderer.draw_frame(&mut layers));

        assert_eq!(stats.models, 2);
        assert!(!stats.placeholder);
        let drawn = layers.calls.iter().find_map(|c| match c {
            Call::Models(m) => Some(m.clone()),
            _ => None,
        });
        let z: Vec<f32> = drawn.unwrap().iter().map(|m| m.translation().z).collect();
        assert_eq!(z, vec![-1.0, -3.0]);
    }

    #[test]
    fn empty_store_draws_one_placeholder() {
        let h = harness(StaticFrame::tracking());
        let mut layers = Recorder::default();
        let stats = rendered(h.renderer.draw_frame(&mut layers));

        assert_eq!(stats.models, 1);
        assert!(stats.placeholder);
        assert!(layers.calls.contains(&Call::Models(vec![Mat4::from_translation(Vec3::new(
            0.0, 0.0, -1.0
        ))])));
        assert!(h.anchors.is_empty());
    }

    #[test]
    fn passes_run_in_order_after_background() {
        let h = harness(StaticFrame::tracking());
        let mut layers = Recorder::default();
        h.renderer.draw_frame(&mut layers);

        assert_eq!(layers.calls[0], Call::Clear(ColorRgba::gray(0.1)));
        assert_eq!(layers.calls[1], Call::Background);
        assert_eq!(layers.calls[2], Call::Points(12));
        assert_eq!(layers.calls[3], Call::Planes(1));
        assert!(matches!(layers.calls[4], Call::Models(_)));
    }

    #[test]
    fn failing_pass_does_not_stop_the_others() {
        let h = harness(StaticFrame::tracking());
        let mut layers = Recorder { fail_planes: true, ..Recorder::default() };
        let stats = rendered(h.renderer.draw_frame(&mut layers));

        assert_eq!(stats.failed, vec![PassKind::Planes]);
        assert_eq!(stats.points, 12);
        assert_eq!(stats.models, 1);
    }

    #[test]
    fn every_pass_failing_still_renders() {
        let h = harness(StaticFrame::tracking());
        let mut layers = Recorder {
            fail_points: true,
            fail_planes: true,
            fail_models: true,
            ..Recorder::default()
        };
        let stats = rendered(h.renderer.draw_frame(&mut layers));
        assert_eq!(stats.failed, vec![PassKind::PointCloud, PassKind::Planes, PassKind::Models]);
    }

    #[test]
    fn point_cloud_released_when_draw_fails() {
        let h = harness(StaticFrame::tracking());
        let frame = h.script.current().unwrap();

        let mut layers = Recorder { fail_points: true, ..Recorder::default() };
        h.renderer.draw_frame(&mut layers);
        assert_eq!(frame.releases(), 1);

        let mut layers = Recorder::default();
        h.renderer.draw_frame(&mut layers);
        assert_eq!(frame.releases(), 2);
    }

    #[test]
    fn point_cloud_acquire_failure_is_isolated() {
        let mut frame = StaticFrame::tracking();
        frame.point_cloud_error = Some(SessionError::Backend("point cloud busy".into()));
        let h = harness(frame);

        let mut layers = Recorder::default();
        let stats = rendered(h.renderer.draw_frame(&mut layers));
        assert_eq!(stats.failed, vec![PassKind::PointCloud]);
        assert_eq!(stats.planes, 1);
    }

    #[test]
    fn no_session_clears_to_neutral() {
        let h = harness(StaticFrame::tracking());
        lock_session(&h.session).destroy();

        let mut layers = Recorder::default();
        assert_eq!(h.renderer.draw_frame(&mut layers), FrameOutcome::NoSession);
        assert_eq!(layers.calls, vec![Call::Clear(ColorRgba::gray(0.2))]);
    }

    #[test]
    fn paused_session_is_not_ticked() {
        let h = harness(StaticFrame::tracking());
        lock_session(&h.session).pause();

        let mut layers = Recorder::default();
        assert_eq!(h.renderer.draw_frame(&mut layers), FrameOutcome::SessionNotResumed);
        assert_eq!(layers.calls, vec![Call::Clear(ColorRgba::gray(0.1))]);
        assert!(h.script.textures.lock().unwrap().is_empty());
    }

    #[test]
    fn camera_texture_bound_before_update() {
        let h = harness(StaticFrame::tracking());
        h.renderer.draw_frame(&mut Recorder::default());
        assert_eq!(*h.script.textures.lock().unwrap(), vec![CameraTextureId(42)]);
    }

    #[test]
    fn camera_unavailable_tints_and_recovers() {
        let h = harness(StaticFrame::tracking());
        h.script.fail(SessionError::CameraUnavailable);

        let mut layers = Recorder::default();
        assert_eq!(h.renderer.draw_frame(&mut layers), FrameOutcome::CameraUnavailable);
        assert_eq!(layers.calls, vec![Call::Clear(ColorRgba::new(0.3, 0.0, 0.0, 1.0))]);

        h.script.set_frame(StaticFrame::tracking());
        assert!(h.renderer.draw_frame(&mut Recorder::default()).is_rendered());
    }

    #[test]
    fn unexpected_tick_error_uses_failure_tint() {
        let h = harness(StaticFrame::tracking());
        h.script.fail(SessionError::Backend("lost".into()));

        let mut layers = Recorder::default();
        assert_eq!(h.renderer.draw_frame(&mut layers), FrameOutcome::Failed);
        assert_eq!(layers.calls, vec![Call::Clear(ColorRgba::new(0.3, 0.3, 0.0, 1.0))]);
    }

    #[test]
    fn paused_camera_draws_nothing() {
        let h = harness(StaticFrame::with_state(TrackingState::Paused));
        let mut layers = Recorder::default();
        assert_eq!(h.renderer.draw_frame(&mut layers), FrameOutcome::TrackingPaused);
        assert_eq!(layers.calls, vec![Call::Clear(ColorRgba::gray(0.1))]);
    }

    #[test]
    fn stopped_camera_draws_background_only() {
        let h = harness(StaticFrame::with_state(TrackingState::Stopped));
        let mut layers = Recorder::default();
        assert_eq!(h.renderer.draw_frame(&mut layers), FrameOutcome::NotTracking);
        assert_eq!(layers.calls, vec![Call::Clear(ColorRgba::gray(0.1)), Call::Background]);
    }

    #[test]
    fn background_failure_fails_the_frame() {
        let h = harness(StaticFrame::tracking());
        let mut layers = Recorder { fail_background: true, ..Recorder::default() };
        assert_eq!(h.renderer.draw_frame(&mut layers), FrameOutcome::Failed);
        assert_eq!(layers.calls.last(), Some(&Call::Clear(ColorRgba::new(0.3, 0.3, 0.0, 1.0))));
    }

    #[test]
    fn failed_update_withdraws_the_published_frame() {
        let h = harness(StaticFrame::tracking());
        assert!(h.renderer.draw_frame(&mut Recorder::default()).is_rendered());
        assert!(h.latest.frame().is_some());

        h.script.fail(SessionError::CameraUnavailable);
        h.renderer.draw_frame(&mut Recorder::default());
        assert!(h.latest.frame().is_none());

        h.script.set_frame(StaticFrame::tracking());
        h.renderer.draw_frame(&mut Recorder::default());
        h.script.fail(SessionError::Backend("lost".into()));
        h.renderer.draw_frame(&mut Recorder::default());
        assert!(h.latest.frame().is_none());
    }
}
