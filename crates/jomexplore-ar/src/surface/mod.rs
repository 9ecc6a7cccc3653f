//! Surface callbacks tying the session, frame renderer and anchors together.

mod ar_surface;
mod tap;

pub use ar_surface::ArSurface;
pub use tap::TapHandler;
