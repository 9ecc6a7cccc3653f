//! Contract with the external world-tracking service.
//!
//! The engine never implements tracking itself. A platform backend implements
//! [`TrackingRuntime`] / [`TrackingSession`] / [`TrackingFrame`] and the rest of the
//! crate drives it:
//! - `SessionManager` owns the session handle and its lifecycle
//! - `FrameRenderer` ticks it once per display refresh
//! - `AnchorStore` hit-tests the latest frame on taps

mod camera;
mod error;
mod frame;
mod service;
mod state;
mod trackable;

#[cfg(test)]
pub(crate) mod testing;

pub use camera::Camera;
pub use error::SessionError;
pub use frame::{CameraImage, PointCloud, TrackingFrame, NDC_QUAD};
pub use service::{CameraTextureId, InstallStatus, TrackingRuntime, TrackingSession};
pub use state::{AnchorTracking, TrackingCell, TrackingState};
pub use trackable::{FeaturePoint, HitResult, Plane, Trackable};
