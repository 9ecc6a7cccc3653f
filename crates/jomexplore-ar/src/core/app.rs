use anyhow::Result;
use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::coords::Viewport;
use crate::device::Gpu;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Host contract driven by [`crate::window::Runtime`].
///
/// Callbacks mirror a mobile surface lifecycle: the surface is created once a GPU
/// context exists, resized with the window, and drawn once per refresh. Taps arrive
/// in physical pixels with a top-left origin.
pub trait App {
    /// The GPU context for the window exists. An error aborts the runtime.
    fn on_surface_created(&mut self, gpu: &Gpu<'_>) -> Result<()>;

    fn on_surface_changed(&mut self, size: Viewport) {
        let _ = size;
    }

    fn on_tap(&mut self, x: f32, y: f32) {
        let _ = (x, y);
    }

    /// Called for every window event before the runtime handles it.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// The application became visible (also sent once after the surface is created).
    fn on_resumed(&mut self) {}

    /// The application is about to lose visibility.
    fn on_suspended(&mut self) {}

    /// The event loop is shutting down.
    fn on_exiting(&mut self) {}
}
