//! jomexplore AR engine.
//!
//! Session lifecycle, multi-pass AR rendering and anchor placement on top of an
//! external world-tracking service:
//! - [`tracking`]: the contract a tracking backend implements
//! - [`session`]: lifecycle of the tracking session
//! - [`frame`]: per-refresh draw state machine
//! - [`render`]: wgpu layer renderers
//! - [`anchors`], [`model`]: placed anchors and the geometry drawn at them
//! - [`surface`]: the surface callbacks a host drives
//! - [`device`], [`window`], [`core`]: the desktop GPU/window runtime

pub mod anchors;
pub mod coords;
pub mod core;
pub mod device;
pub mod frame;
pub mod logging;
pub mod model;
pub mod render;
pub mod session;
pub mod surface;
pub mod tracking;
pub mod window;
