use std::sync::Arc;

use anyhow::{Context, Result};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use jomexplore_ar::coords::Viewport;
use jomexplore_ar::core::{App, AppControl, FrameCtx};
use jomexplore_ar::device::Gpu;
use jomexplore_ar::frame::FrameOutcome;
use jomexplore_ar::model::ModelCategory;
use jomexplore_ar::session::{lock_session, SharedSession};
use jomexplore_ar::surface::ArSurface;
use jomexplore_ar::tracking::InstallStatus;

use crate::sim::SimControls;

/// Model ids the `M` key cycles through.
const MODEL_CYCLE: [&str; 4] = ["blue_mosque", "batu_caves", "merdeka_square", "kampung"];

/// Desktop host: maps window lifecycle onto the session and the AR surface.
pub struct ViewerApp {
    surface: ArSurface,
    session: SharedSession,
    controls: Arc<SimControls>,

    title: String,
}

impl ViewerApp {
    pub fn new(surface: ArSurface, controls: Arc<SimControls>) -> Self {
        let session = Arc::clone(surface.session());
        Self {
            surface,
            session,
            controls,
            title: String::new(),
        }
    }

    fn start_session(&mut self) {
        let mut session = lock_session(&self.session);
        let started = session.ensure_installed().and_then(|status| match status {
            InstallStatus::Installed => session.create().and_then(|()| session.resume()),
            InstallStatus::Requested => Ok(()),
        });
        if let Err(e) = started {
            log::warn!("{} ({e})", e.user_message());
        }
    }

    fn cycle_model(&mut self) {
        let next = MODEL_CYCLE
            .iter()
            .position(|id| *id == self.surface.model_id())
            .map_or(0, |i| (i + 1) % MODEL_CYCLE.len());
        let geometry = self.surface.set_model(MODEL_CYCLE[next]);
        log::info!(
            "model: {} ({} vertices, {:?})",
            geometry.category().display_name(),
            geometry.vertex_count(),
            geometry.source(),
        );
    }

    fn on_key(&mut self, key: KeyCode) -> AppControl {
        match key {
            KeyCode::Space => {
                let lost = self.controls.toggle_tracking();
                log::info!("simulated tracking {}", if lost { "lost" } else { "restored" });
            }
            KeyCode::KeyC => {
                log::info!("simulating a camera glitch");
                self.controls.glitch();
            }
            KeyCode::KeyM => self.cycle_model(),
            KeyCode::KeyX => {
                log::info!("clearing {} anchor(s)", self.surface.anchors().len());
                self.surface.anchors().clear();
            }
            KeyCode::Escape => return AppControl::Exit,
            _ => {}
        }
        AppControl::Continue
    }

    fn title(&self, outcome: &FrameOutcome) -> String {
        let model = ModelCategory::resolve(self.surface.model_id()).display_name();
        let status = status_text(outcome, self.surface.anchors().len());
        format!("jomexplore · {model} · {status}")
    }
}

/// Short status for the window title. `anchors` counts placed anchors only, so the
/// placeholder drawn on an empty store never shows up as one.
fn status_text(outcome: &FrameOutcome, anchors: usize) -> String {
    match outcome {
        FrameOutcome::NoSession => "no session".to_owned(),
        FrameOutcome::SessionNotResumed => "paused".to_owned(),
        FrameOutcome::CameraUnavailable => "camera unavailable".to_owned(),
        FrameOutcome::TrackingPaused => "tracking paused".to_owned(),
        FrameOutcome::NotTracking => "not tracking".to_owned(),
        FrameOutcome::Failed => "render failure".to_owned(),
        FrameOutcome::SurfaceNotReady => "starting".to_owned(),
        FrameOutcome::Rendered(_) => format!("{anchors} anchor(s)"),
    }
}

impl App for ViewerApp {
    fn on_surface_created(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let info = gpu.adapter_info();
        log::info!("adapter: {} ({:?})", info.name, info.backend);
        self.surface
            .on_surface_created(&gpu.render_ctx())
            .context("failed to build AR layers")
    }

    fn on_surface_changed(&mut self, size: Viewport) {
        self.surface.on_surface_changed(size.width, size.height);
    }

    fn on_tap(&mut self, x: f32, y: f32) {
        match self.surface.on_tap(x, y) {
            Some(anchor) => log::info!(
                "anchor #{} placed at {:?}",
                anchor.index(),
                anchor.pose().translation.to_array()
            ),
            None => log::debug!("tap at ({x:.0}, {y:.0}) hit nothing"),
        }
    }

    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.on_key(*key),
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let surface = &mut self.surface;
        let mut outcome = None;
        let control = ctx.render(|rctx, target| {
            outcome = Some(surface.on_draw_frame(rctx, target));
        });

        if let Some(outcome) = outcome {
            let title = self.title(&outcome);
            if title != self.title {
                log::debug!("frame outcome: {outcome:?}");
                ctx.runtime.set_title(title.clone());
                self.title = title;
            }
        }
        control
    }

    fn on_resumed(&mut self) {
        self.start_session();
    }

    fn on_suspended(&mut self) {
        lock_session(&self.session).pause();
    }

    fn on_exiting(&mut self) {
        self.surface.on_surface_destroyed();
        lock_session(&self.session).destroy();
        if self.controls.outstanding_leases() > 0 {
            log::warn!("{} point cloud lease(s) leaked", self.controls.outstanding_leases());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jomexplore_ar::frame::FrameStats;

    #[test]
    fn placeholder_is_not_counted_as_an_anchor() {
        let stats = FrameStats { models: 1, placeholder: true, ..FrameStats::default() };
        assert_eq!(status_text(&FrameOutcome::Rendered(stats), 0), "0 anchor(s)");
    }

    #[test]
    fn status_names_the_early_exits() {
        assert_eq!(status_text(&FrameOutcome::CameraUnavailable, 3), "camera unavailable");
        assert_eq!(status_text(&FrameOutcome::SessionNotResumed, 3), "paused");
    }
}
