use std::sync::Arc;

use crate::anchors::{Anchor, AnchorStore};
use crate::frame::LatestFrame;

/// Turns screen taps into anchors. Cheap to clone; safe to use from the input thread.
#[derive(Debug, Clone)]
pub struct TapHandler {
    anchors: Arc<AnchorStore>,
    latest: Arc<LatestFrame>,
}

impl TapHandler {
    pub(crate) fn new(anchors: Arc<AnchorStore>, latest: Arc<LatestFrame>) -> Self {
        Self { anchors, latest }
    }

    /// Hit-tests the most recent frame at `(x, y)` in physical pixels.
    ///
    /// Returns the new anchor, or `None` when nothing qualified, no frame has been
    /// drawn yet, or the backend refused the anchor.
    pub fn on_tap(&self, x: f32, y: f32) -> Option<Anchor> {
        let viewport = self.latest.viewport();
        let Some((nx, ny)) = viewport.normalize(x, y) else {
            log::debug!("tap at ({x}, {y}) ignored: surface size {viewport:?}");
            return None;
        };
        let Some(frame) = self.latest.frame() else {
            log::debug!("tap at ({x}, {y}) ignored: no tracking frame yet");
            return None;
        };

        match self.anchors.place_anchor(frame.as_ref(), nx, ny) {
            Ok(anchor) => anchor,
            Err(e) => {
                log::warn!("anchor creation failed: {e}");
                None
            }
        }
    }
}
