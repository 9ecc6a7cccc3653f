use std::sync::Arc;

use crate::coords::Viewport;

use super::{SessionError, TrackingFrame};

/// Outcome of an install check.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InstallStatus {
    Installed,
    /// An install/update flow was started; the session cannot be created yet.
    Requested,
}

/// Opaque handle of the texture the backend streams camera images into.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CameraTextureId(pub u64);

/// Entry point of a tracking backend.
pub trait TrackingRuntime: Send {
    /// Checks that the tracking runtime is present, starting an install when it is not.
    ///
    /// `user_prompt` is `true` only for the first request of a process, so the user is
    /// asked at most once.
    fn request_install(&mut self, user_prompt: bool) -> Result<InstallStatus, SessionError>;

    fn create_session(&mut self) -> Result<Box<dyn TrackingSession>, SessionError>;
}

/// Backend session handle. Driven exclusively by `SessionManager`.
pub trait TrackingSession: Send {
    fn resume(&mut self) -> Result<(), SessionError>;

    /// Stops tracking and releases the camera.
    fn pause(&mut self);

    /// Releases every backend resource. The handle is not used afterwards.
    fn close(&mut self);

    fn set_display_geometry(&mut self, viewport: Viewport);

    fn set_camera_texture(&mut self, texture: CameraTextureId);

    /// Advances tracking by one frame. Must not block indefinitely.
    fn update(&mut self) -> Result<Arc<dyn TrackingFrame>, SessionError>;
}
