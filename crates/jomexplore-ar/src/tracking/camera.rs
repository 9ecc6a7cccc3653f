use crate::coords::{Mat4, Pose};

use super::TrackingState;

/// Camera snapshot for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// Camera-to-world pose. The camera looks down its local -Z.
    pub pose: Pose,
    pub tracking_state: TrackingState,
    /// Vertical field of view in radians.
    pub fov_y: f32,
}

impl Camera {
    /// World-to-camera matrix.
    pub fn view_matrix(&self) -> Mat4 {
        self.pose.inverse().to_matrix()
    }

    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, near, far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec3;

    #[test]
    fn view_matrix_moves_camera_to_origin() {
        let cam = Camera {
            pose: Pose::from_translation(Vec3::new(0.0, 1.5, 2.0)),
            tracking_state: TrackingState::Tracking,
            fov_y: 1.0,
        };
        let p = cam.view_matrix().transform_point(Vec3::new(0.0, 1.5, 2.0));
        assert!(p.length() < 1e-6);
    }
}
