//! Per-refresh frame orchestration.
//!
//! [`FrameRenderer`] runs the draw state machine against any [`SceneLayers`]
//! implementation and reports a [`FrameOutcome`].

mod config;
mod layers;
mod outcome;
mod renderer;
mod slot;

pub use config::{ClearTints, EngineConfig, LayerStyle};
pub use layers::SceneLayers;
pub use outcome::{FrameOutcome, FrameStats, PassKind};
pub use renderer::FrameRenderer;
pub use slot::LatestFrame;
