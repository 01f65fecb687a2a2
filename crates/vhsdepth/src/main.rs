use std::path::PathBuf;

use clap::Parser;
use vhsdepth::{
    default_estimators, init_logging, CompositorLayout, DirectoryShaders, EmbeddedShaders,
    Options, ShaderSource, ViewMode,
};

#[derive(Parser)]
#[command(name = "vhsdepth")]
#[command(about = "Animated VHS contour and point-splat views of a depth-estimated image")]
#[command(version)]
struct Cli {
    /// Image to load
    image: PathBuf,

    /// Initial view mode: effect, depth, splat or source
    #[arg(short, long)]
    mode: Option<ViewMode>,

    /// JSON options file (parameters, layout, surface bounds)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of WGSL overrides (`<pass>.vert.wgsl` / `<pass>.frag.wgsl`)
    #[arg(long)]
    shaders: Option<PathBuf>,

    /// Use the single-pass effect program instead of the three-pass chain
    #[arg(long)]
    single_pass: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides the default `info` level.
    init_logging();

    let cli = Cli::parse();

    let mut options = match &cli.config {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    if let Some(mode) = cli.mode {
        options.initial_view_mode = mode;
    }
    if cli.single_pass {
        options.compositor_layout = CompositorLayout::SinglePass;
    }

    let shaders: Box<dyn ShaderSource> = match cli.shaders {
        Some(dir) => Box::new(DirectoryShaders::new(dir)),
        None => Box::new(EmbeddedShaders),
    };

    let mut estimators = default_estimators();
    vhsdepth::run(&cli.image, options, shaders, &mut estimators)?;
    Ok(())
}
