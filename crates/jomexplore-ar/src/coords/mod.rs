//! Math and geometry value types shared by the tracking contract and the renderers.
//!
//! World space:
//! - meters, right-handed
//! - +Y up, -Z forward (camera looks down -Z)
//!
//! Matrices are column-major and match the WGSL uniform layout.

mod color;
mod mat4;
mod pose;
mod vec3;
mod viewport;

pub use color::ColorRgba;
pub use mat4::Mat4;
pub use pose::{Pose, Quat};
pub use vec3::Vec3;
pub use viewport::Viewport;
