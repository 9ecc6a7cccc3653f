//! Simulated tracking service.
//!
//! A camera sways above a fixed floor plane scattered with feature points. The
//! backdrop image stands in for the camera feed. Keyboard controls inject tracking
//! loss and camera glitches so every branch of the frame state machine can be seen.

use std::f32::consts::FRAC_PI_2;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use jomexplore_ar::coords::{Pose, Quat, Vec3, Viewport};
use jomexplore_ar::tracking::{
    AnchorTracking, Camera, CameraImage, CameraTextureId, FeaturePoint, HitResult, InstallStatus,
    Plane, PointCloud, SessionError, Trackable, TrackingCell, TrackingFrame, TrackingRuntime,
    TrackingSession, TrackingState,
};

const FOV_Y: f32 = 1.0;
const EYE_HEIGHT: f32 = 1.4;
const FLOOR_CENTER: Vec3 = Vec3::new(0.0, 0.0, -2.0);
const FLOOR_RADIUS: f32 = 1.5;
const POINT_COUNT: usize = 160;
/// Feature points closer than this to the tap ray count as hit.
const POINT_HIT_RADIUS: f32 = 0.04;

/// Toggles shared between the window's input handling and the session.
#[derive(Debug, Default)]
pub struct SimControls {
    tracking_lost: AtomicBool,
    glitch: AtomicBool,
    leases: AtomicUsize,
}

impl SimControls {
    /// Flips between tracking and lost tracking. Returns `true` when tracking is now lost.
    pub fn toggle_tracking(&self) -> bool {
        !self.tracking_lost.fetch_xor(true, Ordering::AcqRel)
    }

    /// Makes the next update fail as if the camera were briefly unavailable.
    pub fn glitch(&self) {
        self.glitch.store(true, Ordering::Release);
    }

    fn tracking_state(&self) -> TrackingState {
        if self.tracking_lost.load(Ordering::Acquire) {
            TrackingState::Paused
        } else {
            TrackingState::Tracking
        }
    }

    /// Point-cloud leases not yet released.
    pub fn outstanding_leases(&self) -> usize {
        self.leases.load(Ordering::Acquire)
    }
}

pub struct SimRuntime {
    controls: Arc<SimControls>,
    backdrop: CameraImage,
    sessions: usize,
}

impl SimRuntime {
    pub fn new(controls: Arc<SimControls>, backdrop: CameraImage) -> Self {
        Self {
            controls,
            backdrop,
            sessions: 0,
        }
    }
}

impl TrackingRuntime for SimRuntime {
    fn request_install(&mut self, _user_prompt: bool) -> Result<InstallStatus, SessionError> {
        Ok(InstallStatus::Installed)
    }

    fn create_session(&mut self) -> Result<Box<dyn TrackingSession>, SessionError> {
        self.sessions += 1;
        log::info!("simulated session #{} created", self.sessions);
        Ok(Box::new(SimSession::new(
            Arc::clone(&self.controls),
            self.backdrop.clone(),
        )))
    }
}

struct SimSession {
    controls: Arc<SimControls>,
    backdrop: CameraImage,
    points: Arc<[[f32; 4]]>,
    anchors: Arc<Mutex<Vec<AnchorTracking>>>,

    started: Instant,
    resumed: bool,
    display: Viewport,
    display_changed: bool,
    texture: Option<CameraTextureId>,
    image_pending: bool,
}

impl SimSession {
    fn new(controls: Arc<SimControls>, backdrop: CameraImage) -> Self {
        Self {
            controls,
            backdrop,
            points: scatter_points(POINT_COUNT),
            anchors: Arc::default(),
            started: Instant::now(),
            resumed: false,
            display: Viewport::default(),
            display_changed: true,
            texture: None,
            image_pending: true,
        }
    }
}

impl TrackingSession for SimSession {
    fn resume(&mut self) -> Result<(), SessionError> {
        self.resumed = true;
        self.image_pending = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.resumed = false;
    }

    fn close(&mut self) {
        self.resumed = false;
        self.anchors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .for_each(|a| a.set(TrackingState::Stopped));
        log::debug!("simulated session closed");
    }

    fn set_display_geometry(&mut self, viewport: Viewport) {
        if viewport != self.display {
            self.display = viewport;
            self.display_changed = true;
        }
    }

    fn set_camera_texture(&mut self, texture: CameraTextureId) {
        if self.texture != Some(texture) {
            self.texture = Some(texture);
            self.image_pending = true;
        }
    }

    fn update(&mut self) -> Result<Arc<dyn TrackingFrame>, SessionError> {
        if !self.resumed {
            return Err(SessionError::Backend("simulated session is not resumed".into()));
        }
        if self.controls.glitch.swap(false, Ordering::AcqRel) {
            return Err(SessionError::CameraUnavailable);
        }
        if self.controls.outstanding_leases() > 0 {
            log::warn!("{} point cloud lease(s) still held", self.controls.outstanding_leases());
        }

        let state = self.controls.tracking_state();
        for anchor in self.anchors.lock().unwrap_or_else(PoisonError::into_inner).iter() {
            anchor.set(state);
        }

        let t = self.started.elapsed().as_secs_f32();
        let frame = SimFrame {
            camera: Camera {
                pose: camera_pose(t),
                tracking_state: state,
                fov_y: FOV_Y,
            },
            floor: floor_plane(state),
            points: Arc::clone(&self.points),
            anchors: Arc::clone(&self.anchors),
            controls: Arc::clone(&self.controls),
            display: self.display,
            display_changed: std::mem::take(&mut self.display_changed),
            image_aspect: self.backdrop.width as f32 / self.backdrop.height.max(1) as f32,
            image: std::mem::take(&mut self.image_pending).then(|| self.backdrop.clone()),
        };
        Ok(Arc::new(frame))
    }
}

struct SimFrame {
    camera: Camera,
    floor: Plane,
    points: Arc<[[f32; 4]]>,
    anchors: Arc<Mutex<Vec<AnchorTracking>>>,
    controls: Arc<SimControls>,
    display: Viewport,
    display_changed: bool,
    image_aspect: f32,
    image: Option<CameraImage>,
}

impl SimFrame {
    /// World-space ray through normalized screen coordinates.
    fn ray(&self, x: f32, y: f32) -> (Vec3, Vec3) {
        let half = (self.camera.fov_y * 0.5).tan();
        let aspect = self.display.aspect();
        let local = Vec3::new((2.0 * x - 1.0) * half * aspect, (1.0 - 2.0 * y) * half, -1.0);
        let dir = self
            .camera
            .pose
            .rotation
            .rotate(local)
            .try_normalize()
            .unwrap_or(Vec3::new(0.0, 0.0, -1.0));
        (self.camera.pose.translation, dir)
    }
}

impl TrackingFrame for SimFrame {
    fn camera(&self) -> Camera {
        self.camera
    }

    fn planes(&self) -> Vec<Plane> {
        vec![self.floor.clone()]
    }

    fn acquire_point_cloud(&self) -> Result<PointCloud, SessionError> {
        let controls = Arc::clone(&self.controls);
        controls.leases.fetch_add(1, Ordering::AcqRel);
        Ok(PointCloud::new(Arc::clone(&self.points), move || {
            controls.leases.fetch_sub(1, Ordering::AcqRel);
        }))
    }

    fn hit_test(&self, x: f32, y: f32) -> Vec<HitResult> {
        if !self.camera.tracking_state.is_tracking() {
            return Vec::new();
        }
        let (origin, dir) = self.ray(x, y);
        let mut hits = Vec::new();

        // Floor: y = FLOOR_CENTER.y
        if dir.y.abs() > 1e-6 {
            let t = (FLOOR_CENTER.y - origin.y) / dir.y;
            if t > 0.0 {
                hits.push(HitResult {
                    pose: Pose::from_translation(origin + dir * t),
                    distance: t,
                    trackable: Trackable::Plane(self.floor.clone()),
                });
            }
        }

        for (i, p) in self.points.iter().enumerate() {
            let p = Vec3::new(p[0], p[1], p[2]);
            let t = (p - origin).dot(dir);
            if t <= 0.0 {
                continue;
            }
            if ((origin + dir * t) - p).length() <= POINT_HIT_RADIUS {
                hits.push(HitResult {
                    pose: Pose::from_translation(p),
                    distance: t,
                    trackable: Trackable::Point(FeaturePoint {
                        id: i as u64,
                        pose: Pose::from_translation(p),
                        tracking_state: TrackingState::Tracking,
                    }),
                });
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn create_anchor(&self, _hit: &HitResult) -> Result<AnchorTracking, SessionError> {
        let tracking = Arc::new(TrackingCell::new(self.camera.tracking_state));
        self.anchors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&tracking));
        Ok(tracking)
    }

    fn display_geometry_changed(&self) -> bool {
        self.display_changed
    }

    /// Center-crops the backdrop to the display aspect.
    fn transform_display_uv(&self, ndc: &[[f32; 2]; 4]) -> [[f32; 2]; 4] {
        let display = self.display.aspect();
        let (sx, sy) = if display < self.image_aspect {
            (display / self.image_aspect, 1.0)
        } else {
            (1.0, self.image_aspect / display)
        };
        ndc.map(|[x, y]| [0.5 + x * 0.5 * sx, 0.5 - y * 0.5 * sy])
    }

    fn camera_image(&self) -> Option<CameraImage> {
        self.image.clone()
    }
}

/// Standing camera, looking slightly down at the floor and slowly panning.
fn camera_pose(t: f32) -> Pose {
    let yaw = Quat::from_axis_angle(Vec3::UP, (t * 0.3).sin() * 0.25);
    let pitch = Quat::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), -0.45);
    let sway = Vec3::new((t * 0.5).sin() * 0.05, EYE_HEIGHT, 0.0);
    Pose::new(sway, (yaw * pitch).normalized())
}

fn floor_plane(state: TrackingState) -> Plane {
    // Octagon around the center, in plane-local xz.
    let polygon = (0..8)
        .map(|i| {
            let a = i as f32 * FRAC_PI_2 / 2.0;
            [a.cos() * FLOOR_RADIUS, a.sin() * FLOOR_RADIUS]
        })
        .collect();
    Plane {
        id: 1,
        center_pose: Pose::from_translation(FLOOR_CENTER),
        extent_x: FLOOR_RADIUS * 2.0,
        extent_z: FLOOR_RADIUS * 2.0,
        polygon,
        tracking_state: state,
    }
}

/// Deterministic scatter on and just above the floor.
fn scatter_points(n: usize) -> Arc<[[f32; 4]]> {
    let mut seed: u32 = 0x9e37_79b9;
    let mut next = move || {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        seed as f32 / u32::MAX as f32
    };
    (0..n)
        .map(|_| {
            let x = FLOOR_CENTER.x + (next() - 0.5) * 2.0 * FLOOR_RADIUS;
            let z = FLOOR_CENTER.z + (next() - 0.5) * 2.0 * FLOOR_RADIUS;
            let y = FLOOR_CENTER.y + next() * 0.3;
            [x, y, z, 0.5 + next() * 0.5]
        })
        .collect()
}
