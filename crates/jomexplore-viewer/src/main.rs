//! Desktop viewer for the jomexplore AR engine.
//!
//! Runs the engine against a simulated tracking service. Click (or touch) to place
//! anchors on the floor or on feature points.
//!
//! Keys:
//! - `Space` toggles simulated tracking loss
//! - `C` fails the next tracking update
//! - `M` cycles heritage models
//! - `X` clears every anchor
//! - `Esc` quits

mod app;
mod backdrop;
mod sim;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use jomexplore_ar::anchors::AnchorStoreConfig;
use jomexplore_ar::device::GpuInit;
use jomexplore_ar::frame::EngineConfig;
use jomexplore_ar::logging::{init_logging, LoggingConfig};
use jomexplore_ar::model::{AssetSource, DirAssetSource, NoAssets};
use jomexplore_ar::session::SessionManager;
use jomexplore_ar::surface::ArSurface;
use jomexplore_ar::window::{Runtime, RuntimeConfig};

use app::ViewerApp;
use sim::{SimControls, SimRuntime};

/// Backdrop images are downscaled to fit this many pixels per side, well inside
/// the default 8192 texel texture limit.
const BACKDROP_MAX: u32 = 2048;

#[derive(Parser, Debug)]
#[command(version, about = "Desktop viewer for the jomexplore AR engine")]
struct Args {
    /// Model id to place at anchors, e.g. "blue_mosque" or "batu_caves".
    #[arg(long)]
    model: Option<String>,

    /// Directory holding `ar_assets/*.glb`. Without it every model is procedural.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Image shown as the camera feed. A generated pattern is used otherwise.
    #[arg(long)]
    backdrop: Option<PathBuf>,

    /// Log filter in `env_logger` syntax. Overrides `RUST_LOG`.
    #[arg(long)]
    log: Option<String>,

    /// Keep at most this many anchors, evicting the oldest.
    #[arg(long)]
    max_anchors: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..Default::default()
    });

    let backdrop = match &args.backdrop {
        Some(path) => backdrop::load_oriented(path, BACKDROP_MAX, BACKDROP_MAX)?,
        None => backdrop::pattern(720, 1280),
    };
    log::info!("camera feed: {}x{}", backdrop.width, backdrop.height);

    let assets: Box<dyn AssetSource> = match args.assets {
        Some(root) => Box::new(DirAssetSource::new(root)),
        None => Box::new(NoAssets),
    };

    let controls = Arc::new(SimControls::default());
    let session =
        SessionManager::new(Box::new(SimRuntime::new(Arc::clone(&controls), backdrop)))
            .into_shared();

    let config = EngineConfig {
        anchors: AnchorStoreConfig {
            max_anchors: args.max_anchors,
        },
        ..Default::default()
    };
    let surface = ArSurface::new(session, assets, config, args.model.as_deref());

    Runtime::run(
        RuntimeConfig::default(),
        GpuInit::default(),
        ViewerApp::new(surface, controls),
    )
}
