use thiserror::Error;

use crate::render::RenderError;
use crate::tracking::SessionError;

/// The fault-contained passes of a tracked frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PassKind {
    PointCloud,
    Planes,
    Models,
}

/// Failure of a single pass. Logged and recorded; never aborts the frame.
#[derive(Debug, Error)]
pub(crate) enum PassError {
    #[error(transparent)]
    Tracking(#[from] SessionError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// What got drawn on a frame that reached the tracked passes.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub points: usize,
    pub planes: usize,
    /// Model instances drawn, placeholder included.
    pub models: usize,
    /// The debug placeholder was drawn because no anchor exists.
    pub placeholder: bool,
    /// Passes that failed, in execution order.
    pub failed: Vec<PassKind>,
}

/// How a call to `on_draw_frame` ended.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    /// No session exists; cleared to the neutral tint.
    NoSession,
    /// A session exists but is not resumed; cleared to the paused tint.
    SessionNotResumed,
    /// The tracking update could not reach the camera; retried next frame.
    CameraUnavailable,
    /// The camera reports `Paused`.
    TrackingPaused,
    /// Background drawn, but the camera is not tracking so no 3D content was.
    NotTracking,
    /// A failure outside the isolated passes; cleared to the failure tint.
    Failed,
    /// The surface has not been created yet; nothing drawn.
    SurfaceNotReady,
    Rendered(FrameStats),
}

impl FrameOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, FrameOutcome::Rendered(_))
    }
}
