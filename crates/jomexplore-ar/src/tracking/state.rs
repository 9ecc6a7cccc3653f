use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Tracking state reported for the camera and for every trackable / anchor.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TrackingState {
    Tracking = 0,
    Paused = 1,
    Stopped = 2,
}

impl TrackingState {
    #[inline]
    pub fn is_tracking(self) -> bool {
        self == TrackingState::Tracking
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => TrackingState::Tracking,
            1 => TrackingState::Paused,
            _ => TrackingState::Stopped,
        }
    }
}

/// Tracking state shared between an anchor and the tracking backend.
///
/// The backend keeps a clone of the `Arc` and updates it as tracking evolves;
/// the engine only reads it while drawing.
#[derive(Debug)]
pub struct TrackingCell {
    state: AtomicU8,
}

impl TrackingCell {
    pub fn new(state: TrackingState) -> Self {
        Self { state: AtomicU8::new(state as u8) }
    }

    #[inline]
    pub fn get(&self) -> TrackingState {
        TrackingState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: TrackingState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

/// Handle through which the backend updates an anchor's tracking state.
pub type AnchorTracking = Arc<TrackingCell>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_round_trips_every_state() {
        let cell = TrackingCell::new(TrackingState::Tracking);
        for s in [TrackingState::Paused, TrackingState::Stopped, TrackingState::Tracking] {
            cell.set(s);
            assert_eq!(cell.get(), s);
        }
    }
}
