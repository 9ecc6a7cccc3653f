use std::fmt;
use std::sync::Arc;

use super::{AnchorTracking, Camera, HitResult, Plane, SessionError};

/// Full-screen quad in NDC, triangle-strip order.
///
/// The background pass hands these corners to [`TrackingFrame::transform_display_uv`]
/// to get camera-image texture coordinates for the current display rotation.
pub const NDC_QUAD: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

/// CPU copy of the camera image, for backends that cannot write the bound
/// camera texture directly.
#[derive(Clone)]
pub struct CameraImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8, `width * height * 4` bytes.
    pub rgba: Arc<[u8]>,
}

impl fmt::Debug for CameraImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Leased point cloud.
///
/// The backend's release callback runs exactly once, when the lease drops. That
/// covers early returns and failed draws without any explicit release call.
pub struct PointCloud {
    points: Arc<[[f32; 4]]>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl PointCloud {
    /// `points` are `(x, y, z, confidence)` in world space.
    pub fn new(points: Arc<[[f32; 4]]>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            points,
            release: Some(Box::new(release)),
        }
    }

    /// A cloud with nothing to release.
    pub fn detached(points: Arc<[[f32; 4]]>) -> Self {
        Self { points, release: None }
    }

    #[inline]
    pub fn points(&self) -> &[[f32; 4]] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Drop for PointCloud {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for PointCloud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointCloud")
            .field("points", &self.points.len())
            .field("leased", &self.release.is_some())
            .finish()
    }
}

/// One tracking update. Valid until the next `TrackingSession::update`.
///
/// Shared with the UI thread for hit-testing, hence `Send + Sync`.
pub trait TrackingFrame: Send + Sync {
    fn camera(&self) -> Camera;

    /// Currently known planes, in the order the backend supplies them.
    fn planes(&self) -> Vec<Plane>;

    fn acquire_point_cloud(&self) -> Result<PointCloud, SessionError>;

    /// Ray test at normalized screen coordinates (`[0, 1]`, top-left origin),
    /// sorted by increasing distance.
    fn hit_test(&self, x: f32, y: f32) -> Vec<HitResult>;

    /// Registers an anchor at `hit` with the backend.
    fn create_anchor(&self, hit: &HitResult) -> Result<AnchorTracking, SessionError>;

    /// Whether display rotation or size changed since the previous frame.
    fn display_geometry_changed(&self) -> bool;

    /// Maps NDC corners to camera-image texture coordinates.
    fn transform_display_uv(&self, ndc: &[[f32; 2]; 4]) -> [[f32; 2]; 4] {
        ndc.map(|[x, y]| [(x + 1.0) * 0.5, (1.0 - y) * 0.5])
    }

    fn camera_image(&self) -> Option<CameraImage> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn lease_releases_once_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let cloud = PointCloud::new(Arc::from(vec![[0.0; 4]; 3]), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(cloud.len(), 3);
        drop(cloud);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    fn failing_draw(cloud: PointCloud) -> Result<usize, String> {
        if cloud.len() < 10 {
            return Err(format!("only {} points", cloud.len()));
        }
        Ok(cloud.len())
    }

    #[test]
    fn lease_releases_on_error_path() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = released.clone();
        let cloud = PointCloud::new(Arc::from(vec![[1.0; 4]]), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(failing_draw(cloud).is_err());
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
