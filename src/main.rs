//! `volume-raycaster [--config <FILE>] [VOLUME]`
//!
//! Opens a window and ray casts a raw 256³ `u8` volume. Without a volume file a synthetic sphere
//! is shown.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use volume_raycaster::{init_logging, App, Config, RenderError, ShaderSources, Volume};

/// Radius of the fallback sphere, in voxels.
const SPHERE_RADIUS: f32 = 96.0;

/// Ray casts a raw 256³ `u8` volume in a window.
#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct Args {
    /// JSON settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Raw volume file; a synthetic sphere is shown without one
    #[arg(value_name = "VOLUME")]
    volume: Option<PathBuf>,
}

fn run(args: Args) -> Result<(), RenderError> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    init_logging(&config.logging);

    let shader_sources = match &config.shader_dir {
        Some(dir) => ShaderSources::from_dir(dir)?,
        None => ShaderSources::default(),
    };

    let volume = match args.volume.as_ref().or(config.volume_path.as_ref()) {
        Some(path) => {
            log::info!("Loading volume from {}", path.display());
            Volume::load(path)?
        }
        None => {
            log::info!("No volume given, rendering a sphere");
            Volume::sphere(SPHERE_RADIUS, 255)
        }
    };

    let event_loop = winit::event_loop::EventLoop::builder().build()?;
    let mut app = App::new(config.window, config.renderer, shader_sources, volume);
    let result = event_loop.run_app(&mut app);

    match app.take_error() {
        Some(error) => Err(error),
        None => Ok(result?),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // The logger may not be up yet if the configuration failed to load.
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
