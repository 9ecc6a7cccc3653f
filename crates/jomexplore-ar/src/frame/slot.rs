use std::sync::{Arc, Mutex, PoisonError};

use crate::coords::Viewport;
use crate::tracking::TrackingFrame;

#[derive(Default)]
struct Inner {
    frame: Option<Arc<dyn TrackingFrame>>,
    viewport: Viewport,
}

/// Most recent tracking frame and display geometry, shared with the input thread.
///
/// The render thread publishes each frame right after the update; taps hit-test
/// against whatever was published last.
#[derive(Default)]
pub struct LatestFrame {
    inner: Mutex<Inner>,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, frame: Arc<dyn TrackingFrame>) {
        self.lock().frame = Some(frame);
    }

    /// Forgets the published frame (session gone or paused).
    pub fn clear(&self) {
        self.lock().frame = None;
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.lock().viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.lock().viewport
    }

    pub fn frame(&self) -> Option<Arc<dyn TrackingFrame>> {
        self.lock().frame.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for LatestFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("LatestFrame")
            .field("frame", &inner.frame.is_some())
            .field("viewport", &inner.viewport)
            .finish()
    }
}
