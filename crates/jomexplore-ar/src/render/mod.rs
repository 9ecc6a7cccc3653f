//! GPU rendering subsystem.
//!
//! One renderer per layer of the AR scene (camera background, feature points,
//! planes, anchored models). Each renderer owns its GPU resources; they are built in
//! `create` when the surface appears and dropped with it.
//!
//! Convention:
//! - geometry is in world meters, projected with the camera's `view_proj`
//! - the background quad is in NDC and ignores depth
//! - every layer after the clear loads the existing color and depth

mod background;
mod common;
mod ctx;
mod error;
mod layers;
mod model;
mod plane;
mod point_cloud;

pub use background::BackgroundRenderer;
pub use ctx::{RenderCtx, RenderTarget};
pub use error::RenderError;
pub use layers::{BoundLayers, GpuLayers};
pub use model::ModelRenderer;
pub use plane::PlaneRenderer;
pub use point_cloud::PointCloudRenderer;
