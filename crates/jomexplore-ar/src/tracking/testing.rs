//! Scripted tracking backend shared by the orchestrator and surface tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::coords::{Pose, Vec3, Viewport};

use super::{
    AnchorTracking, Camera, CameraTextureId, HitResult, InstallStatus, Plane, PointCloud,
    SessionError, TrackingCell, TrackingFrame, TrackingRuntime, TrackingSession, TrackingState,
};

/// Frame with fixed content.
pub(crate) struct StaticFrame {
    pub camera: Camera,
    pub planes: Vec<Plane>,
    pub points: Vec<[f32; 4]>,
    pub point_cloud_error: Option<SessionError>,
    pub hits: Vec<HitResult>,
    pub released: Arc<AtomicUsize>,
}

impl StaticFrame {
    pub fn with_state(state: TrackingState) -> Self {
        Self {
            camera: Camera {
                pose: Pose::from_translation(Vec3::new(0.0, 1.5, 0.0)),
                tracking_state: state,
                fov_y: 1.0,
            },
            planes: vec![floor_plane()],
            points: vec![[0.0, 0.0, -1.0, 0.9]; 12],
            point_cloud_error: None,
            hits: Vec::new(),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn tracking() -> Self {
        Self::with_state(TrackingState::Tracking)
    }

    pub fn releases(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

pub(crate) fn floor_plane() -> Plane {
    Plane {
        id: 7,
        center_pose: Pose::from_translation(Vec3::new(0.0, 0.0, -2.0)),
        extent_x: 2.0,
        extent_z: 2.0,
        polygon: vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
        tracking_state: TrackingState::Tracking,
    }
}

impl TrackingFrame for StaticFrame {
    fn camera(&self) -> Camera {
        self.camera
    }

    fn planes(&self) -> Vec<Plane> {
        self.planes.clone()
    }

    fn acquire_point_cloud(&self) -> Result<PointCloud, SessionError> {
        if let Some(e) = &self.point_cloud_error {
            return Err(e.clone());
        }
        let released = Arc::clone(&self.released);
        Ok(PointCloud::new(Arc::from(self.points.clone()), move || {
            released.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn hit_test(&self, _x: f32, _y: f32) -> Vec<HitResult> {
        self.hits.clone()
    }

    fn create_anchor(&self, _hit: &HitResult) -> Result<AnchorTracking, SessionError> {
        Ok(Arc::new(TrackingCell::new(TrackingState::Tracking)))
    }

    fn display_geometry_changed(&self) -> bool {
        false
    }
}

/// What the next `update` returns. Shared between the test and the session.
#[derive(Clone)]
pub(crate) struct Script {
    next: Arc<Mutex<Result<Arc<StaticFrame>, SessionError>>>,
    pub textures: Arc<Mutex<Vec<CameraTextureId>>>,
    pub geometry: Arc<Mutex<Vec<Viewport>>>,
}

impl Script {
    pub fn new(frame: StaticFrame) -> Self {
        Self {
            next: Arc::new(Mutex::new(Ok(Arc::new(frame)))),
            textures: Arc::default(),
            geometry: Arc::default(),
        }
    }

    pub fn set_frame(&self, frame: StaticFrame) -> Arc<StaticFrame> {
        let frame = Arc::new(frame);
        *self.next.lock().unwrap() = Ok(Arc::clone(&frame));
        frame
    }

    pub fn fail(&self, e: SessionError) {
        *self.next.lock().unwrap() = Err(e);
    }

    pub fn current(&self) -> Option<Arc<StaticFrame>> {
        self.next.lock().unwrap().as_ref().ok().cloned()
    }
}

pub(crate) struct ScriptedRuntime {
    pub script: Script,
}

impl TrackingRuntime for ScriptedRuntime {
    fn request_install(&mut self, _user_prompt: bool) -> Result<InstallStatus, SessionError> {
        Ok(InstallStatus::Installed)
    }

    fn create_session(&mut self) -> Result<Box<dyn TrackingSession>, SessionError> {
        Ok(Box::new(ScriptedSession { script: self.script.clone() }))
    }
}

struct ScriptedSession {
    script: Script,
}

impl TrackingSession for ScriptedSession {
    fn resume(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn close(&mut self) {}

    fn set_display_geometry(&mut self, viewport: Viewport) {
        self.script.geometry.lock().unwrap().push(viewport);
    }

    fn set_camera_texture(&mut self, texture: CameraTextureId) {
        self.script.textures.lock().unwrap().push(texture);
    }

    fn update(&mut self) -> Result<Arc<dyn TrackingFrame>, SessionError> {
        let next = self.script.next.lock().unwrap().clone();
        next.map(|f| f as Arc<dyn TrackingFrame>)
    }
}
