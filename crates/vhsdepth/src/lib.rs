//! vhsdepth: animated VHS contour and point-splat views of a still image.
//!
//! A depth map is estimated for the image, then rendered either as a 2D
//! multi-pass effect (iso-depth contours, glow, tape distortion, vignette) or as
//! an interactive 3D point cloud under an orbit camera.
//!
//! # Quick Start
//!
//! ```no_run
//! use vhsdepth::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!     let mut estimators = default_estimators();
//!     run(
//!         std::path::Path::new("photo.jpg"),
//!         Options::default(),
//!         Box::new(EmbeddedShaders),
//!         &mut estimators,
//!     )
//! }
//! ```

mod app;
pub mod estimator;
pub mod headless;
pub mod image_source;
pub mod init;
pub mod loader;
pub mod shader_dir;

// Re-export core types
pub use vhsdepth_core::{
    fit_surface_size, AcquiredImage, CompositorLayout, DepthEstimator, DepthMap, EffectParameters,
    EstimationError, EstimatorContext, FramePacer, FrameTick, FrameToken, ImageSource,
    OrbitCamera, OrbitControls, Options, ParamId, PointerButton, PointerEvent, Progress,
    ProgressStage, Result, Scheduler, SourceImage, VhsDepthError, ViewMode,
};

// Re-export render types
pub use vhsdepth_render::{
    DepthEffectRenderer, EmbeddedShaders, PassName, ProgramSource, RenderEngine, RenderError,
    ShaderError, ShaderSource,
};

pub use app::{run_app, App};
pub use estimator::LuminanceDepthEstimator;
pub use headless::{render_to_image, HeadlessRenderer};
pub use image_source::FileImageSource;
pub use init::{default_estimators, init_logging, run};
pub use loader::{prepare_image, PreparedImage, Status};
pub use shader_dir::DirectoryShaders;
