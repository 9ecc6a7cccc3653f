use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use crate::coords::{Mat4, Pose};
use crate::tracking::{AnchorTracking, SessionError, TrackingFrame, TrackingState};

/// Spatial anchor placed by a tap.
///
/// Pose and index never change after creation. The tracking state is owned by the
/// tracking backend and may change at any time.
#[derive(Debug, Clone)]
pub struct Anchor {
    index: u64,
    pose: Pose,
    tracking: AnchorTracking,
}

impl Anchor {
    /// Insertion index, starting at 0 and never reused.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    #[inline]
    pub fn tracking_state(&self) -> TrackingState {
        self.tracking.get()
    }

    #[inline]
    pub fn model_matrix(&self) -> Mat4 {
        self.pose.to_matrix()
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct AnchorStoreConfig {
    /// Maximum number of anchors kept. When full, the oldest anchor is evicted.
    /// `None` keeps every anchor. `Some(0)` is clamped to one: the anchor just
    /// placed always survives its own insertion.
    pub max_anchors: Option<usize>,
}

#[derive(Debug, Default)]
struct Inner {
    anchors: VecDeque<Anchor>,
    next_index: u64,
}

/// Anchors placed so far, in insertion order.
///
/// One writer (taps on the UI thread) and one reader (the render thread) may run
/// concurrently; an append is never observed half-done by a scan.
#[derive(Debug, Default)]
pub struct AnchorStore {
    config: AnchorStoreConfig,
    inner: RwLock<Inner>,
}

impl AnchorStore {
    pub fn new(config: AnchorStoreConfig) -> Self {
        Self {
            config,
            inner: RwLock::default(),
        }
    }

    /// Hit-tests `frame` at normalized screen coordinates and anchors the first
    /// qualifying hit.
    ///
    /// A hit qualifies when it lies on a plane and inside that plane's polygon, or when
    /// it lies on a feature point. Returns `Ok(None)` when nothing qualifies.
    pub fn place_anchor(
        &self,
        frame: &dyn TrackingFrame,
        x: f32,
        y: f32,
    ) -> Result<Option<Anchor>, SessionError> {
        let hits = frame.hit_test(x, y);
        let Some(hit) = hits.iter().find(|h| h.trackable.accepts_hit(&h.pose)) else {
            log::debug!("tap at ({x:.3}, {y:.3}): no qualifying hit among {}", hits.len());
            return Ok(None);
        };

        let tracking = frame.create_anchor(hit)?;
        Ok(Some(self.push(hit.pose, tracking)))
    }

    /// Appends an anchor and returns it.
    pub fn push(&self, pose: Pose, tracking: AnchorTracking) -> Anchor {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let anchor = Anchor {
            index: inner.next_index,
            pose,
            tracking,
        };
        inner.next_index += 1;

        if let Some(max) = self.config.max_anchors {
            while inner.anchors.len() >= max.max(1) {
                if let Some(evicted) = inner.anchors.pop_front() {
                    log::debug!("anchor {} evicted (capacity {max})", evicted.index);
                }
            }
        }

        inner.anchors.push_back(anchor.clone());
        log::info!("anchor {} placed at {:?}", anchor.index, anchor.pose.translation);
        anchor
    }

    /// Snapshot of all anchors in insertion order.
    pub fn anchors(&self) -> Vec<Anchor> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.anchors.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every anchor. Indices keep counting from where they were.
    pub fn clear(&self) {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).anchors.clear();
    }
}
