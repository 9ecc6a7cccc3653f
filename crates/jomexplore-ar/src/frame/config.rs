use crate::anchors::AnchorStoreConfig;
use crate::coords::{ColorRgba, Vec3};
use crate::model::MIN_ASSET_BYTES;

/// Clear colors used by the frame state machine.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearTints {
    /// Behind the camera image on a rendered frame.
    pub surface: ColorRgba,
    /// No session exists.
    pub no_session: ColorRgba,
    /// The session exists but is not resumed, or the camera reports `Paused`.
    pub paused: ColorRgba,
    /// The tracking update could not reach the camera.
    pub camera_error: ColorRgba,
    /// Any other failure outside the isolated passes.
    pub failure: ColorRgba,
}

impl Default for ClearTints {
    fn default() -> Self {
        Self {
            surface: ColorRgba::gray(0.1),
            no_session: ColorRgba::gray(0.2),
            paused: ColorRgba::gray(0.1),
            camera_error: ColorRgba::new(0.3, 0.0, 0.0, 1.0),
            failure: ColorRgba::new(0.3, 0.3, 0.0, 1.0),
        }
    }
}

/// Fixed styling of the point and plane layers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStyle {
    /// Side of each point square, in physical pixels.
    pub point_size: f32,
    pub point_color: ColorRgba,
    pub plane_tint: ColorRgba,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            point_size: 5.0,
            point_color: ColorRgba::new(1.0, 1.0, 0.0, 1.0),
            plane_tint: ColorRgba::new(1.0, 1.0, 1.0, 100.0 / 255.0),
        }
    }
}

/// Engine-wide settings, fixed for the lifetime of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub tints: ClearTints,
    pub style: LayerStyle,

    /// Projection clip planes, in meters.
    pub near: f32,
    pub far: f32,

    /// World translation of the debug model drawn while no anchor exists.
    pub placeholder_offset: Vec3,

    /// Assets at or below this size are treated as absent.
    pub min_asset_bytes: u64,

    pub anchors: AnchorStoreConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tints: ClearTints::default(),
            style: LayerStyle::default(),
            near: 0.1,
            far: 100.0,
            placeholder_offset: Vec3::new(0.0, 0.0, -1.0),
            min_asset_bytes: MIN_ASSET_BYTES,
            anchors: AnchorStoreConfig::default(),
        }
    }
}
