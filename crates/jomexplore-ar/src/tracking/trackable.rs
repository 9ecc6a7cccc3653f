use crate::coords::{Pose, Vec3};

use super::TrackingState;

/// Detected planar surface.
///
/// `polygon` is the boundary in plane-local coordinates, as `(x, z)` pairs on the
/// plane's XZ plane (local +Y is the plane normal).
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub id: u64,
    pub center_pose: Pose,
    pub extent_x: f32,
    pub extent_z: f32,
    pub polygon: Vec<[f32; 2]>,
    pub tracking_state: TrackingState,
}

impl Plane {
    /// Whether `pose` projects inside this plane's boundary polygon.
    ///
    /// Only the pose position is considered. Falls back to the extent rectangle when
    /// the polygon is degenerate (fewer than 3 vertices).
    pub fn contains_pose(&self, pose: &Pose) -> bool {
        let local = self.center_pose.inverse().transform_point(pose.translation);
        if !local.is_finite() {
            return false;
        }

        if self.polygon.len() < 3 {
            return local.x.abs() <= self.extent_x * 0.5 && local.z.abs() <= self.extent_z * 0.5;
        }

        point_in_polygon(local.x, local.z, &self.polygon)
    }

    /// Boundary polygon transformed to world space.
    pub fn world_polygon(&self) -> Vec<Vec3> {
        self.polygon
            .iter()
            .map(|&[x, z]| self.center_pose.transform_point(Vec3::new(x, 0.0, z)))
            .collect()
    }
}

/// Even-odd ray cast along +X.
fn point_in_polygon(x: f32, z: f32, polygon: &[[f32; 2]]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let [xi, zi] = polygon[i];
        let [xj, zj] = polygon[j];
        if (zi > z) != (zj > z) {
            let x_cross = xi + (z - zi) * (xj - xi) / (zj - zi);
            if x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Tracked feature point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FeaturePoint {
    pub id: u64,
    pub pose: Pose,
    pub tracking_state: TrackingState,
}

/// The trackable a hit landed on.
#[derive(Debug, Clone, PartialEq)]
pub enum Trackable {
    Plane(Plane),
    Point(FeaturePoint),
}

impl Trackable {
    /// Whether a hit at `hit_pose` on this trackable may become an anchor.
    ///
    /// Planes accept hits inside their polygon; points accept every hit.
    pub fn accepts_hit(&self, hit_pose: &Pose) -> bool {
        match self {
            Trackable::Plane(plane) => plane.contains_pose(hit_pose),
            Trackable::Point(_) => true,
        }
    }
}

/// One intersection of a screen ray with a trackable.
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    pub pose: Pose,
    /// Distance from the camera, in meters.
    pub distance: f32,
    pub trackable: Trackable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Quat;

    fn square_plane(center: Pose) -> Plane {
        Plane {
            id: 1,
            center_pose: center,
            extent_x: 2.0,
            extent_z: 2.0,
            polygon: vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
            tracking_state: TrackingState::Tracking,
        }
    }

    // ── contains_pose ─────────────────────────────────────────────────────

    #[test]
    fn pose_inside_polygon_is_contained() {
        let plane = square_plane(Pose::from_translation(Vec3::new(0.0, -1.0, -2.0)));
        assert!(plane.contains_pose(&Pose::from_translation(Vec3::new(0.5, -1.0, -2.5))));
    }

    #[test]
    fn pose_outside_polygon_is_rejected() {
        let plane = square_plane(Pose::from_translation(Vec3::new(0.0, -1.0, -2.0)));
        assert!(!plane.contains_pose(&Pose::from_translation(Vec3::new(1.5, -1.0, -2.0))));
    }

    #[test]
    fn concave_notch_is_outside() {
        let mut plane = square_plane(Pose::IDENTITY);
        // U shape: the notch between x = -0.5 and 0.5 above z = 0 is open.
        plane.polygon = vec![
            [-1.0, -1.0],
            [1.0, -1.0],
            [1.0, 1.0],
            [0.5, 1.0],
            [0.5, 0.0],
            [-0.5, 0.0],
            [-0.5, 1.0],
            [-1.0, 1.0],
        ];
        assert!(!plane.contains_pose(&Pose::from_translation(Vec3::new(0.0, 0.0, 0.5))));
        assert!(plane.contains_pose(&Pose::from_translation(Vec3::new(0.75, 0.0, 0.5))));
    }

    #[test]
    fn rotated_plane_uses_local_coordinates() {
        let rot = Quat::from_axis_angle(Vec3::UP, std::f32::consts::FRAC_PI_4);
        let mut plane = square_plane(Pose::new(Vec3::ZERO, rot));
        plane.polygon = vec![[-2.0, -0.1], [2.0, -0.1], [2.0, 0.1], [-2.0, 0.1]];
        // Local +X rotated 45° about Y points along (+x, -z) in world.
        let on_axis = rot.rotate(Vec3::new(1.5, 0.0, 0.0));
        assert!(plane.contains_pose(&Pose::from_translation(on_axis)));
        assert!(!plane.contains_pose(&Pose::from_translation(Vec3::new(1.5, 0.0, 0.0))));
    }

    #[test]
    fn degenerate_polygon_falls_back_to_extent() {
        let mut plane = square_plane(Pose::IDENTITY);
        plane.polygon.clear();
        plane.extent_x = 1.0;
        plane.extent_z = 0.5;
        assert!(plane.contains_pose(&Pose::from_translation(Vec3::new(0.4, 0.0, 0.2))));
        assert!(!plane.contains_pose(&Pose::from_translation(Vec3::new(0.4, 0.0, 0.3))));
    }

    // ── trackable ─────────────────────────────────────────────────────────

    #[test]
    fn points_accept_any_hit() {
        let point = Trackable::Point(FeaturePoint {
            id: 7,
            pose: Pose::IDENTITY,
            tracking_state: TrackingState::Tracking,
        });
        assert!(point.accepts_hit(&Pose::from_translation(Vec3::new(100.0, 0.0, 0.0))));
    }
}
